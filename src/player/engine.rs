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

//! Media engine contract.
//!
//! An engine is the stateful platform primitive that decodes and plays a
//! single audio source. It is created, driven and dropped on the media session
//! worker thread only, so implementations do not need to be `Send`.

use std::{path::{Path, PathBuf}, time::Duration};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The call is not valid in the engine's current state.
    #[error("Invalid engine state for {0}")]
    InvalidState(&'static str),

    /// The audio source could not be found or opened.
    #[error("Cannot resolve audio source: {0}")]
    SourceUnavailable(PathBuf),

    /// The source was found but the engine failed to prepare it.
    #[error("Failed to prepare audio source: {0}")]
    Prepare(String),

    /// Any other backend failure.
    #[error("Engine backend failure: {0}")]
    Backend(String),
}

/// Asynchronous notifications raised by an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    /// Playback reached the end of the source, with the position and duration
    /// the engine reported when it raised the signal.
    Completed { position: Duration, duration: Duration },
}

pub trait MediaEngine {
    /// Returns the engine to its idle state, dropping any loaded source.
    fn reset(&mut self) -> Result<(), EngineError>;

    fn set_source(&mut self, source: &Path) -> Result<(), EngineError>;

    /// Blocks until the source is ready to start.
    fn prepare(&mut self) -> Result<(), EngineError>;

    fn start(&mut self) -> Result<(), EngineError>;

    fn pause(&mut self) -> Result<(), EngineError>;

    fn stop(&mut self) -> Result<(), EngineError>;

    fn seek_to(&mut self, position: Duration) -> Result<(), EngineError>;

    fn duration(&self) -> Result<Duration, EngineError>;

    fn position(&self) -> Result<Duration, EngineError>;

    fn is_playing(&self) -> Result<bool, EngineError>;

    /// Returns the next pending engine event, if any, without blocking.
    fn poll_event(&mut self) -> Option<EngineEvent>;

    /// Frees the underlying platform resources. The engine is dropped right
    /// after this call.
    fn release(&mut self);
}

/// Builds a fresh engine instance, invoked on the worker thread.
pub type EngineFactory =
    Box<dyn FnMut() -> Result<Box<dyn MediaEngine>, EngineError> + Send + 'static>;
