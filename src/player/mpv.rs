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

//! MPV-backed media engine.
//!
//! This module adapts `libmpv` to the [`MediaEngine`] contract. MPV loads files
//! asynchronously, so [`MediaEngine::prepare`] waits for the file-loaded event
//! (or an end-file error) before returning. Position and duration are tracked
//! through MPV property observation, which is also what gets reported when
//! the end of file is reached.

use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use mpv::Format;
use tracing::debug;

use crate::player::engine::{EngineError, EngineEvent, EngineFactory, MediaEngine};

const PREPARE_TIMEOUT: Duration = Duration::from_secs(5);
const PREPARE_WAIT_SECONDS: f64 = 0.05;

pub struct MpvEngine {
    handler: mpv::MpvHandler,
    source: Option<PathBuf>,
    prepared: bool,
    paused: bool,
    position: Duration,
    duration: Duration,
}

impl MpvEngine {
    pub fn new() -> Result<Self, EngineError> {
        let mut builder = mpv::MpvHandlerBuilder::new().map_err(backend)?;
        builder.set_option("vo", "null").map_err(backend)?;
        let mut handler = builder.build().map_err(backend)?;

        handler
            .observe_property::<f64>("time-pos", 0)
            .map_err(backend)?;
        handler
            .observe_property::<f64>("duration", 0)
            .map_err(backend)?;

        Ok(Self {
            handler,
            source: None,
            prepared: false,
            paused: true,
            position: Duration::ZERO,
            duration: Duration::ZERO,
        })
    }

    /// A factory building a fresh MPV context per engine.
    pub fn factory() -> EngineFactory {
        Box::new(|| Ok(Box::new(MpvEngine::new()?) as Box<dyn MediaEngine>))
    }

    fn require_prepared(&self, operation: &'static str) -> Result<(), EngineError> {
        if self.prepared {
            Ok(())
        } else {
            Err(EngineError::InvalidState(operation))
        }
    }

    fn set_paused(&mut self, paused: bool) -> Result<(), EngineError> {
        self.handler.set_property("pause", paused).map_err(backend)?;
        self.paused = paused;
        Ok(())
    }
}

impl MediaEngine for MpvEngine {
    fn reset(&mut self) -> Result<(), EngineError> {
        if self.source.is_some() {
            self.handler.command(&["stop"]).map_err(backend)?;
        }
        self.source = None;
        self.prepared = false;
        self.paused = true;
        self.position = Duration::ZERO;
        self.duration = Duration::ZERO;
        Ok(())
    }

    fn set_source(&mut self, source: &Path) -> Result<(), EngineError> {
        if self.source.is_some() {
            return Err(EngineError::InvalidState("set_source"));
        }
        if !source.is_file() {
            return Err(EngineError::SourceUnavailable(source.to_path_buf()));
        }

        self.source = Some(source.to_path_buf());
        Ok(())
    }

    fn prepare(&mut self) -> Result<(), EngineError> {
        let Some(source) = self.source.clone() else {
            return Err(EngineError::InvalidState("prepare"));
        };
        let filename = source
            .to_str()
            .ok_or_else(|| EngineError::SourceUnavailable(source.clone()))?;

        self.set_paused(true)?;
        self.handler
            .command(&["loadfile", filename, "replace"])
            .map_err(backend)?;

        let deadline = Instant::now() + PREPARE_TIMEOUT;
        while Instant::now() < deadline {
            match self.handler.wait_event(PREPARE_WAIT_SECONDS) {
                Some(mpv::Event::FileLoaded) => {
                    self.prepared = true;
                    if let Ok(duration) = self.handler.get_property::<f64>("duration") {
                        self.duration = Duration::from_secs_f64(duration.max(0.0));
                    }
                    return Ok(());
                }
                Some(mpv::Event::EndFile(result)) => {
                    return Err(EngineError::Prepare(format!("{:?}", result)));
                }
                _ => {}
            }
        }

        Err(EngineError::Prepare(format!(
            "Timed out loading {}",
            source.display()
        )))
    }

    fn start(&mut self) -> Result<(), EngineError> {
        self.require_prepared("start")?;
        self.set_paused(false)
    }

    fn pause(&mut self) -> Result<(), EngineError> {
        self.require_prepared("pause")?;
        self.set_paused(true)
    }

    fn stop(&mut self) -> Result<(), EngineError> {
        self.require_prepared("stop")?;
        self.set_paused(true)?;
        self.handler
            .command(&["seek", "0", "absolute"])
            .map_err(backend)?;
        self.position = Duration::ZERO;
        Ok(())
    }

    fn seek_to(&mut self, position: Duration) -> Result<(), EngineError> {
        self.require_prepared("seek_to")?;
        let seconds = format!("{:.3}", position.as_secs_f64());
        self.handler
            .command(&["seek", &seconds, "absolute"])
            .map_err(backend)?;
        self.position = position;
        Ok(())
    }

    fn duration(&self) -> Result<Duration, EngineError> {
        self.require_prepared("duration")?;
        Ok(self.duration)
    }

    fn position(&self) -> Result<Duration, EngineError> {
        self.require_prepared("position")?;
        Ok(self.position)
    }

    fn is_playing(&self) -> Result<bool, EngineError> {
        Ok(self.prepared && !self.paused)
    }

    fn poll_event(&mut self) -> Option<EngineEvent> {
        while let Some(event) = self.handler.wait_event(0.0) {
            match event {
                mpv::Event::PropertyChange { name, change, .. } => match (name, change) {
                    ("time-pos", Format::Double(seconds)) if seconds >= 0.0 => {
                        self.position = Duration::from_secs_f64(seconds);
                    }
                    ("duration", Format::Double(seconds)) if seconds >= 0.0 => {
                        self.duration = Duration::from_secs_f64(seconds);
                    }
                    _ => {}
                },
                mpv::Event::EndFile(Ok(mpv::EndFileReason::MPV_END_FILE_REASON_EOF)) => {
                    debug!("MPV reached end of file");
                    self.paused = true;
                    return Some(EngineEvent::Completed {
                        position: self.position,
                        duration: self.duration,
                    });
                }
                _ => {}
            }
        }

        None
    }

    fn release(&mut self) {
        let _ = self.handler.command(&["stop"]);
        self.source = None;
        self.prepared = false;
    }
}

fn backend(e: mpv::Error) -> EngineError {
    EngineError::Backend(format!("{:?}", e))
}
