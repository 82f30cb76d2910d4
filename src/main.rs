// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! # Cadence demo player.
//!
//! A terminal front end for a [`PlayerSession`]. It is a pure view-state
//! consumer: key presses become intents, and the screen is drawn from the
//! latest view state only.
//!
//! ## Architecture
//!
//! The application follows a strict setup-run-teardown pattern to ensure the
//! terminal state is preserved even in the event of an error. Key presses are
//! read on a dedicated thread and forwarded to the async event loop over a
//! channel. Logging goes to a file since the terminal belongs to the UI.

mod events;
mod render;
mod theme;

use std::{
    fs::OpenOptions,
    io::{self},
    path::Path,
    sync::{Arc, Mutex},
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use crossterm::{
    event::{self},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cadence::{
    actions::intents::Intent,
    config::{self, AppConfig, EngineKind, SessionConfig},
    model::{SongId, catalog::DemoCatalog},
    player::{engine::EngineFactory, simulated::EngineRig},
    session::PlayerSession,
    state::ViewState,
    util,
};

use crate::{events::AppEvent, theme::Theme};

const TOAST_TIMEOUT: Duration = Duration::from_secs(4);

/// Application state.
struct App {
    pub theme: Theme,
    pub session: PlayerSession,
    pub view: ViewState,
    pub selected: usize,
    pub suspended: bool,
    pub screen_on: bool,
    toast: Option<(String, Instant)>,
}

impl App {
    fn new(session: PlayerSession) -> Self {
        let view = session.view_state();
        Self {
            theme: Theme::default(),
            session,
            view,
            selected: 0,
            suspended: false,
            screen_on: false,
            toast: None,
        }
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.view.playlist.len() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.view.playlist.len().saturating_sub(1));
    }

    pub fn selected_song_id(&self) -> Option<SongId> {
        self.view.playlist.get(self.selected).map(|item| item.id)
    }

    pub fn show_toast(&mut self, message: String) {
        self.toast = Some((message, Instant::now()));
    }

    pub fn expire_toast(&mut self) {
        if self
            .toast
            .as_ref()
            .is_some_and(|(_, shown)| shown.elapsed() >= TOAST_TIMEOUT)
        {
            self.toast = None;
        }
    }

    pub fn toast(&self) -> Option<&str> {
        self.toast.as_ref().map(|(message, _)| message.as_str())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load_config();
    init_tracing_to_file(Path::new(&config.log_file))?;
    info!(?config, "Starting");

    let catalog = Arc::new(DemoCatalog::new(&config.media_dir));
    let session = PlayerSession::spawn(
        catalog,
        engine_factory(&config)?,
        SessionConfig::from(&config),
    )
    .context("Failed to start player session")?;

    session.process_input(Intent::Create)?;
    session.process_input(Intent::Start)?;

    let mut app = App::new(session);

    let mut terminal = setup_terminal(&app)?;
    let res = run(&mut terminal, &mut app).await;
    restore_terminal(&mut terminal);

    app.session.shutdown().await;
    info!("Stopped");

    res.context("Application error occurred")
}

fn init_tracing_to_file(log_path: &Path) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}

fn engine_factory(config: &AppConfig) -> Result<EngineFactory> {
    match config.engine {
        EngineKind::Simulated => Ok(EngineRig::realtime().factory()),
        #[cfg(feature = "mpv")]
        EngineKind::Mpv => Ok(cadence::player::mpv::MpvEngine::factory()),
        #[cfg(not(feature = "mpv"))]
        EngineKind::Mpv => anyhow::bail!("This build does not include the mpv engine"),
    }
}

/// Prepares the terminal: background colour, raw mode and the alternate
/// screen.
fn setup_terminal(app: &App) -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    // Set the background of the entire terminal window, without this we'd get
    // a thin black outline
    if let Some(hex) = Theme::to_hex(app.theme.background_colour)
        && let Err(e) = util::term::set_terminal_bg(&hex)
    {
        warn!(error = %e, "Failed to set terminal background");
    }

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;

    Ok(terminal)
}

/// Restores the terminal to its original state, best-effort.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) {
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    util::term::reset_terminal_bg().ok();
    terminal.show_cursor().ok();
}

/// Starts the input thread and enters the main event loop.
async fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    // Spawn a thread to translate raw key events to application events.
    thread::spawn(move || {
        loop {
            if let Ok(event::Event::Key(key)) = event::read()
                && event_tx.send(AppEvent::Key(key)).is_err()
            {
                break;
            }
        }
    });

    events::process_events(terminal, app, event_rx).await
}
