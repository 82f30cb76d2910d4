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

//! Media session worker thread.
//!
//! The engine calls behind the controller block (loading a song can take a
//! while), so the controller lives on a dedicated background thread and the
//! session talks to it through [`PlayerHandle`].
//!
//! # Architecture
//!
//! The worker follows a dual-channel pattern:
//! 1. **Command Channel**: receives [`PlayerCommand`]s, each carrying a
//!    one-shot reply channel the awaiting caller listens on.
//! 2. **Callbacks**: the controller's transition hooks, which the session
//!    wires to its own event channel.
//!
//! Between commands the worker polls the engine for events such as song
//! completion. The worker exits, releasing the engine, once every handle has
//! been dropped.

use std::{
    sync::mpsc::{self, Receiver, RecvTimeoutError, Sender},
    thread,
    time::Duration,
};

use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::{
    error::{Result, SessionError},
    model::Song,
    player::{MediaSessionController, SessionCallbacks, engine::EngineFactory},
};

const ENGINE_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug)]
pub(crate) enum PlayerCommand {
    Load(Option<Song>, oneshot::Sender<bool>),
    Start(oneshot::Sender<bool>),
    Pause(oneshot::Sender<bool>),
    Stop(oneshot::Sender<bool>),
    SeekTo(i64, oneshot::Sender<Duration>),
    SeekBy(i64, oneshot::Sender<Duration>),
    SeekToAndStart(i64, oneshot::Sender<bool>),
    Duration(oneshot::Sender<Duration>),
    Position(oneshot::Sender<Duration>),
    IsPlaying(oneshot::Sender<bool>),
    Release(oneshot::Sender<()>),
}

/// Asynchronous proxy onto a [`MediaSessionController`] owned by the worker
/// thread.
///
/// Every method resolves once the worker has executed the call, or fails with
/// [`SessionError::PlayerUnavailable`] if the worker is gone.
#[derive(Clone, Debug)]
pub struct PlayerHandle {
    command_tx: Sender<PlayerCommand>,
}

impl PlayerHandle {
    /// Spawns the worker thread. The controller, and every engine it creates,
    /// is built and used on that thread only.
    pub fn spawn(
        factory: EngineFactory,
        callbacks: SessionCallbacks,
        completion_tolerance: f64,
    ) -> Result<Self> {
        let (command_tx, command_rx) = mpsc::channel::<PlayerCommand>();

        thread::Builder::new()
            .name("media-session".to_string())
            .spawn(move || {
                let mut controller = MediaSessionController::new(factory, completion_tolerance);
                controller.init(callbacks);
                media_session_worker(controller, command_rx);
            })
            .map_err(|_| SessionError::PlayerUnavailable)?;

        Ok(Self { command_tx })
    }

    pub async fn load_new_song(&self, song: Option<Song>) -> Result<bool> {
        self.request(|reply| PlayerCommand::Load(song, reply)).await
    }

    pub async fn start(&self) -> Result<bool> {
        self.request(PlayerCommand::Start).await
    }

    pub async fn pause(&self) -> Result<bool> {
        self.request(PlayerCommand::Pause).await
    }

    pub async fn stop(&self) -> Result<bool> {
        self.request(PlayerCommand::Stop).await
    }

    pub async fn seek_to(&self, target_ms: i64) -> Result<Duration> {
        self.request(|reply| PlayerCommand::SeekTo(target_ms, reply))
            .await
    }

    pub async fn seek_by(&self, delta_ms: i64) -> Result<Duration> {
        self.request(|reply| PlayerCommand::SeekBy(delta_ms, reply))
            .await
    }

    pub async fn seek_to_and_start(&self, target_ms: i64) -> Result<bool> {
        self.request(|reply| PlayerCommand::SeekToAndStart(target_ms, reply))
            .await
    }

    pub async fn duration(&self) -> Result<Duration> {
        self.request(PlayerCommand::Duration).await
    }

    pub async fn current_position(&self) -> Result<Duration> {
        self.request(PlayerCommand::Position).await
    }

    pub async fn is_playing(&self) -> Result<bool> {
        self.request(PlayerCommand::IsPlaying).await
    }

    pub async fn release(&self) -> Result<()> {
        self.request(PlayerCommand::Release).await
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> PlayerCommand,
    ) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .map_err(|_| SessionError::PlayerUnavailable)?;

        reply_rx.await.map_err(|_| SessionError::PlayerUnavailable)
    }
}

/// The worker loop, alternating between commands and engine events until the
/// command channel closes.
fn media_session_worker(mut controller: MediaSessionController, command_rx: Receiver<PlayerCommand>) {
    info!("Media session worker started");

    loop {
        match command_rx.recv_timeout(ENGINE_POLL_INTERVAL) {
            Ok(command) => {
                process_command(&mut controller, command);
                while let Ok(command) = command_rx.try_recv() {
                    process_command(&mut controller, command);
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        controller.pump_engine_events();
    }

    controller.release();
    info!("Media session worker stopped");
}

// A dropped reply receiver means the caller was cancelled, the result is
// simply discarded.
fn process_command(controller: &mut MediaSessionController, command: PlayerCommand) {
    debug!(?command, "Media session command");

    match command {
        PlayerCommand::Load(song, reply) => {
            let _ = reply.send(controller.load_new_song(song.as_ref()));
        }
        PlayerCommand::Start(reply) => {
            let _ = reply.send(controller.start());
        }
        PlayerCommand::Pause(reply) => {
            let _ = reply.send(controller.pause());
        }
        PlayerCommand::Stop(reply) => {
            let _ = reply.send(controller.stop());
        }
        PlayerCommand::SeekTo(target_ms, reply) => {
            let _ = reply.send(controller.seek_to(target_ms));
        }
        PlayerCommand::SeekBy(delta_ms, reply) => {
            let _ = reply.send(controller.seek_by(delta_ms));
        }
        PlayerCommand::SeekToAndStart(target_ms, reply) => {
            let _ = reply.send(controller.seek_to_and_start(target_ms));
        }
        PlayerCommand::Duration(reply) => {
            let _ = reply.send(controller.duration());
        }
        PlayerCommand::Position(reply) => {
            let _ = reply.send(controller.current_position());
        }
        PlayerCommand::IsPlaying(reply) => {
            let _ = reply.send(controller.is_playing());
        }
        PlayerCommand::Release(reply) => {
            controller.release();
            let _ = reply.send(());
        }
    }
}
