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

//! The demo's event loop.
//!
//! The loop waits on four sources: key presses from the input thread, new
//! view states and side effects from the player session, and a periodic tick
//! that expires transient messages. The screen is redrawn after each one.

mod key_handlers;

use std::{io::Stdout, time::Duration};

use anyhow::{Context, Result};
use crossterm::event::KeyEvent;
use ratatui::{Terminal, prelude::CrosstermBackend};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info};

use cadence::actions::effects::SideEffect;

use crate::{App, events::key_handlers::Flow, render::draw};

const TICK_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug)]
pub(crate) enum AppEvent {
    Key(KeyEvent),
}

pub(crate) async fn process_events(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    mut event_rx: UnboundedReceiver<AppEvent>,
) -> Result<()> {
    let mut view_states = app.session.view_states();
    let side_effects = app.session.side_effects();
    let mut tick = tokio::time::interval(TICK_INTERVAL);

    loop {
        terminal
            .draw(|f| draw(f, app))
            .context("Failed to draw frame")?;

        tokio::select! {
            event = event_rx.recv() => match event {
                Some(AppEvent::Key(key)) => {
                    if key_handlers::process_key_event(app, key)? == Flow::Quit {
                        info!("Quit requested");
                        break;
                    }
                }
                None => break,
            },
            changed = view_states.changed() => {
                if changed.is_err() {
                    info!("Player session ended");
                    break;
                }
                app.view = view_states.borrow_and_update().clone();
                app.clamp_selection();
            },
            Some(effect) = side_effects.next() => handle_side_effect(app, effect),
            _ = tick.tick() => app.expire_toast(),
        }
    }

    Ok(())
}

fn handle_side_effect(app: &mut App, effect: SideEffect) {
    debug!(?effect, "Handling side effect");

    match effect {
        SideEffect::ShowError(message) => app.show_toast(message),
        // A terminal has no screen saver to hold off.
        SideEffect::KeepScreenOn(on) => app.screen_on = on,
    }
}
