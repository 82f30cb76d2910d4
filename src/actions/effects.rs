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

//! One-shot instructions for the UI.
//!
//! Side effects travel beside the view state, never inside it, and each one
//! is delivered at most once.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};

use crate::{actions::changes::PartialStateChange, state::ViewState};

pub const ERROR_LOADING_MESSAGE: &str = "Error loading song. Try next song.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    ShowError(String),
    /// Keep the display awake while something is playing.
    KeepScreenOn(bool),
}

/// Side effect implied by a change on its own.
pub fn effect_of(change: &PartialStateChange) -> Option<SideEffect> {
    change
        .song_change()
        .filter(|change| change.error_loading)
        .map(|_| SideEffect::ShowError(ERROR_LOADING_MESSAGE.to_string()))
}

/// Side effect implied by a fold step, only when the playing flag flipped.
pub fn keep_screen_on(previous: &ViewState, next: &ViewState) -> Option<SideEffect> {
    (previous.playing != next.playing).then_some(SideEffect::KeepScreenOn(next.playing))
}

/// Receiving end of a session's side effects.
///
/// Clones share one queue: effects emitted while nobody is listening wait in
/// the queue, and each effect goes to exactly one listener. A session only
/// queues an effect for a failed load or a flip of the playing flag, so an
/// idle listener falls behind by at most one entry per user action.
#[derive(Clone)]
pub struct SideEffects {
    rx: Arc<Mutex<mpsc::UnboundedReceiver<SideEffect>>>,
}

impl SideEffects {
    pub(crate) fn new(rx: mpsc::UnboundedReceiver<SideEffect>) -> Self {
        Self {
            rx: Arc::new(Mutex::new(rx)),
        }
    }

    /// Waits for the next effect. Returns `None` once the session has ended
    /// and every queued effect has been taken.
    pub async fn next(&self) -> Option<SideEffect> {
        self.rx.lock().await.recv().await
    }

    /// Takes a queued effect without waiting.
    pub fn try_next(&self) -> Option<SideEffect> {
        self.rx.try_lock().ok()?.try_recv().ok()
    }
}
