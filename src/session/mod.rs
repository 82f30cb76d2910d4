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

//! Player sessions.
//!
//! A [`PlayerSession`] turns a stream of [`Intent`]s into a stream of
//! [`ViewState`]s plus a side channel of [`SideEffect`]s.
//!
//! # Architecture
//!
//! Everything happens on one pipeline task which exclusively owns the
//! playlist cursor, the current view state and the handle onto the media
//! session worker. The task selects over:
//!
//! 1. **Intents** sent through [`PlayerSession::process_input`], dispatched
//!    in arrival order to their handler.
//! 2. **Player events** raised by the controller callbacks (started, paused or
//!    stopped, completed) together with position ticks.
//! 3. **Emissions** of handlers running on a lane.
//!
//! Handlers that only touch the cursor or the view run inline. Handlers that
//! talk to the engine are queued on the transport [`SequentialLane`]. Start
//! and song changes go through its [`RestartableLane`], so a song change
//! supersedes a load still in flight and only the newest request lands.
//! Whatever their source, partial changes are folded one at a time on the
//! pipeline task, so view states are totally ordered.
//!
//! A failing handler is logged and skipped. A fatal error (an empty catalog)
//! ends the pipeline, which closes the view state stream.

mod handlers;

use std::sync::Arc;

use futures::FutureExt;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    actions::{
        changes::{PartialStateChange, SongChange},
        effects::{self, SideEffect, SideEffects},
        intents::Intent,
    },
    config::SessionConfig,
    error::{Result, SessionError},
    model::{Song, catalog::CatalogSource, cursor::PlaylistCursor},
    player::{SessionCallbacks, engine::EngineFactory, worker::PlayerHandle},
    state::ViewState,
    tasks::{Emission, Origin, PositionTicker, RestartableLane, SequentialLane, Tick},
};

/// Notifications reaching the pipeline from outside the intent stream.
#[derive(Debug)]
enum PlayerEvent {
    Started,
    PausedOrStopped,
    Completed,
    Tick(Tick),
}

pub struct PlayerSession {
    intent_tx: mpsc::UnboundedSender<Intent>,
    state_rx: watch::Receiver<ViewState>,
    side_effects: SideEffects,
    cancel: CancellationToken,
    pipeline: Option<JoinHandle<()>>,
}

impl PlayerSession {
    /// Starts a session: spawns the media session worker and the pipeline.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        catalog: Arc<dyn CatalogSource>,
        factory: EngineFactory,
        config: SessionConfig,
    ) -> Result<Self> {
        let (intent_tx, intent_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (effect_tx, effect_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ViewState::default());

        let player = PlayerHandle::spawn(
            factory,
            player_callbacks(&event_tx),
            config.completion_tolerance,
        )?;

        let cancel = CancellationToken::new();
        let (emission_tx, emission_rx) = mpsc::unbounded_channel();

        let transport = SequentialLane::spawn(emission_tx, cancel.child_token());
        let pipeline = Pipeline {
            songs: transport.restartable(),
            transport,
            ticker: PositionTicker::new(config.tick_interval, cancel.child_token()),
            config,
            cursor: PlaylistCursor::new(catalog),
            player,
            state_tx,
            effect_tx,
            event_tx,
        };

        let handle = tokio::spawn(pipeline.run(intent_rx, event_rx, emission_rx, cancel.clone()));
        info!("Player session started");

        Ok(Self {
            intent_tx,
            state_rx,
            side_effects: SideEffects::new(effect_rx),
            cancel,
            pipeline: Some(handle),
        })
    }

    /// Queues an intent. Intents are handled in the order they are queued.
    pub fn process_input(&self, intent: Intent) -> Result<()> {
        self.intent_tx
            .send(intent)
            .map_err(|_| SessionError::SessionClosed)
    }

    /// The latest view state.
    pub fn view_state(&self) -> ViewState {
        self.state_rx.borrow().clone()
    }

    /// A receiver observing every published view state. It reports the
    /// stream as closed once the pipeline has ended.
    pub fn view_states(&self) -> watch::Receiver<ViewState> {
        self.state_rx.clone()
    }

    /// The view states as a stream, starting with the current one.
    pub fn view_state_stream(&self) -> WatchStream<ViewState> {
        WatchStream::new(self.state_rx.clone())
    }

    pub fn side_effects(&self) -> SideEffects {
        self.side_effects.clone()
    }

    /// Ends the session and waits until the engine has been released.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(pipeline) = self.pipeline.take()
            && let Err(e) = pipeline.await
        {
            warn!(error = %e, "Player session pipeline ended abnormally");
        }
    }
}

impl Drop for PlayerSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn player_callbacks(event_tx: &mpsc::UnboundedSender<PlayerEvent>) -> SessionCallbacks {
    let started = event_tx.clone();
    let paused_or_stopped = event_tx.clone();
    let completed = event_tx.clone();

    SessionCallbacks {
        on_started: Box::new(move || {
            let _ = started.send(PlayerEvent::Started);
        }),
        on_paused_or_stopped: Box::new(move || {
            let _ = paused_or_stopped.send(PlayerEvent::PausedOrStopped);
        }),
        on_completed: Box::new(move || {
            let _ = completed.send(PlayerEvent::Completed);
        }),
    }
}

struct Pipeline {
    config: SessionConfig,
    cursor: PlaylistCursor,
    player: PlayerHandle,
    state_tx: watch::Sender<ViewState>,
    effect_tx: mpsc::UnboundedSender<SideEffect>,
    event_tx: mpsc::UnboundedSender<PlayerEvent>,
    transport: SequentialLane<PartialStateChange>,
    songs: RestartableLane<PartialStateChange>,
    ticker: PositionTicker,
}

impl Pipeline {
    async fn run(
        mut self,
        mut intent_rx: mpsc::UnboundedReceiver<Intent>,
        mut event_rx: mpsc::UnboundedReceiver<PlayerEvent>,
        mut emission_rx: mpsc::UnboundedReceiver<Emission<PartialStateChange>>,
        cancel: CancellationToken,
    ) {
        loop {
            let outcome = tokio::select! {
                _ = cancel.cancelled() => break,
                intent = intent_rx.recv() => match intent {
                    Some(intent) => self.dispatch(intent),
                    None => break,
                },
                Some(event) = event_rx.recv() => self.on_player_event(event),
                Some(emission) = emission_rx.recv() => self.on_emission(emission),
            };

            if let Err(e) = outcome {
                if e.is_fatal() {
                    error!(error = %e, "Player session failed");
                    break;
                }
                error!(error = %e, "Intent handling failed");
            }
        }

        intent_rx.close();
        self.teardown().await;
    }

    fn dispatch(&mut self, intent: Intent) -> Result<()> {
        debug!(intent = intent.name(), "Dispatching intent");

        match intent {
            Intent::Create => {
                let change = handlers::handle_create(&mut self.cursor)?;
                self.apply(change);
            }
            Intent::Start => {
                let (was_playing, elapsed) = {
                    let state = self.state_tx.borrow();
                    (state.playing, state.elapsed_time)
                };
                let song = self.cursor.current_song().cloned();
                let job = handlers::handle_start(self.player.clone(), song, was_playing, elapsed);
                self.songs.restart("start", job.boxed());
            }
            Intent::Stop => {
                let job = handlers::handle_stop(self.player.clone());
                self.transport.submit("stop", job.boxed());
            }
            Intent::Play => {
                let job = handlers::handle_play(self.player.clone());
                self.transport.submit("play", job.boxed());
            }
            Intent::Pause => {
                let job = handlers::handle_pause(self.player.clone());
                self.transport.submit("pause", job.boxed());
            }
            Intent::NextSong => {
                let song = self.cursor.next_song().cloned();
                self.play_new_song(song);
            }
            Intent::PreviousSong => {
                let song = self.cursor.previous_song().cloned();
                self.play_new_song(song);
            }
            Intent::SeekForward => {
                let job = handlers::handle_seek_by(self.player.clone(), self.config.seek_step_ms);
                self.transport.submit("seek_forward", job.boxed());
            }
            Intent::SeekBackward => {
                let job = handlers::handle_seek_by(self.player.clone(), -self.config.seek_step_ms);
                self.transport.submit("seek_backward", job.boxed());
            }
            Intent::SeekTo(position) => {
                let job = handlers::handle_seek_to(self.player.clone(), position);
                self.transport.submit("seek_to", job.boxed());
            }
            Intent::JumpToSongId(id) => {
                if self.state_tx.borrow().current_song_id() == Some(id) {
                    debug!(song_id = id, "Already showing song, jump ignored");
                    return Ok(());
                }
                let song = self.cursor.jump_to_song_id(id).cloned();
                self.play_new_song(song);
            }
            Intent::PositionTick(position) => {
                self.apply(handlers::handle_position_tick(position));
            }
        }

        Ok(())
    }

    /// Shows `song` straight away, then loads and starts it in the background.
    fn play_new_song(&mut self, song: Option<Song>) {
        let Some(song) = song else {
            debug!("No song to change to");
            return;
        };

        self.ticker.stop();
        self.apply(PartialStateChange::NewSong(SongChange::interim(song.clone())));

        let job = handlers::handle_new_song(self.player.clone(), song);
        self.songs.restart("new_song", job.boxed());
    }

    fn on_player_event(&mut self, event: PlayerEvent) -> Result<()> {
        match event {
            PlayerEvent::Started => {
                let event_tx = self.event_tx.clone();
                self.ticker.start(self.player.clone(), move |tick| {
                    event_tx.send(PlayerEvent::Tick(tick)).is_ok()
                });
            }
            PlayerEvent::PausedOrStopped => self.ticker.stop(),
            PlayerEvent::Completed => {
                info!("Song completed, moving on");
                let song = self.cursor.next_song().cloned();
                self.play_new_song(song);
            }
            PlayerEvent::Tick(tick) => {
                if self.ticker.is_current(&tick) {
                    return self.dispatch(Intent::PositionTick(tick.position));
                }
            }
        }

        Ok(())
    }

    fn on_emission(&mut self, emission: Emission<PartialStateChange>) -> Result<()> {
        if let Origin::Restartable(generation) = emission.origin
            && !self.songs.is_current(generation)
        {
            debug!(label = emission.label, generation, "Dropping stale emission");
            return Ok(());
        }

        for change in emission.result? {
            self.apply(change);
        }

        Ok(())
    }

    /// Derives side effects from `change` and folds it into the view state.
    fn apply(&mut self, change: PartialStateChange) {
        if let Some(effect) = effects::effect_of(&change) {
            self.emit(effect);
        }

        let (previous, next) = {
            let current = self.state_tx.borrow();
            (current.clone(), current.reduce(&change))
        };

        if self.config.keep_screen_on
            && let Some(effect) = effects::keep_screen_on(&previous, &next)
        {
            self.emit(effect);
        }

        debug!(?change, "Folded partial state change");
        self.state_tx.send_replace(next);
    }

    fn emit(&self, effect: SideEffect) {
        debug!(?effect, "Side effect");
        if self.effect_tx.send(effect).is_err() {
            debug!("Side effect dropped, no listener");
        }
    }

    async fn teardown(mut self) {
        self.ticker.stop();
        self.songs.cancel();
        self.transport.cancel();

        if let Err(e) = self.player.release().await {
            debug!(error = %e, "Media session already gone");
        }
        info!("Player session stopped");
    }
}
