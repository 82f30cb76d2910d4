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

//! Media session control.
//!
//! This module provides [`MediaSessionController`], a uniform contract over a
//! stateful [`MediaEngine`]. The controller never lets an engine failure
//! escape: every engine error is logged and converted to a safe default
//! return value, so callers only ever see booleans and positions.
//!
//! The controller is synchronous and owned by a single thread, see
//! [`worker::PlayerHandle`] for the asynchronous proxy used by the session.

pub mod engine;
#[cfg(feature = "mpv")]
pub mod mpv;
pub mod simulated;
pub mod worker;

use std::{path::Path, time::Duration};

use tracing::{debug, info, warn};

use crate::{
    model::Song,
    player::engine::{EngineError, EngineEvent, EngineFactory, MediaEngine},
};

/// Duration reported when no song is loaded. Never zero so that ratios and
/// seek bar math stay defined.
pub const MIN_DURATION: Duration = Duration::from_millis(1);

/// Default tolerance for accepting a completion signal, as a fraction of the
/// song duration.
pub const DEFAULT_COMPLETION_TOLERANCE: f64 = 0.05;

type Callback = Box<dyn FnMut() + Send + 'static>;

/// Hooks invoked by the controller on playback transitions.
pub struct SessionCallbacks {
    pub on_started: Callback,
    pub on_paused_or_stopped: Callback,
    pub on_completed: Callback,
}

impl Default for SessionCallbacks {
    fn default() -> Self {
        Self {
            on_started: Box::new(|| {}),
            on_paused_or_stopped: Box::new(|| {}),
            on_completed: Box::new(|| {}),
        }
    }
}

pub struct MediaSessionController {
    factory: EngineFactory,
    engine: Option<Box<dyn MediaEngine>>,
    loaded: bool,
    last_position: Duration,
    completion_tolerance: f64,
    callbacks: SessionCallbacks,
}

impl MediaSessionController {
    /// Creates a controller that builds engines on demand with `factory`.
    pub fn new(factory: EngineFactory, completion_tolerance: f64) -> Self {
        Self {
            factory,
            engine: None,
            loaded: false,
            last_position: Duration::ZERO,
            completion_tolerance,
            callbacks: SessionCallbacks::default(),
        }
    }

    /// Registers the transition hooks, replacing any previous ones.
    pub fn init(&mut self, callbacks: SessionCallbacks) {
        self.callbacks = callbacks;
    }

    /// Tears down whatever is playing and loads `song`.
    ///
    /// Returns `false` if there is no song, the source cannot be resolved or
    /// the engine fails to prepare it. The engine stays usable for the next
    /// attempt either way.
    pub fn load_new_song(&mut self, song: Option<&Song>) -> bool {
        (self.callbacks.on_paused_or_stopped)();

        self.loaded = false;
        self.last_position = Duration::ZERO;

        let Some(song) = song else {
            warn!("Asked to load a song but none was given");
            return false;
        };

        let Some(engine) = self.engine_or_create() else {
            return false;
        };

        match prepare_source(engine, &song.audio_file) {
            Ok(()) => {
                info!(song_id = song.id, title = %song.title, "Loaded song");
                self.loaded = true;
                true
            }
            Err(e) => {
                warn!(song_id = song.id, error = %e, "Failed to load song");
                false
            }
        }
    }

    pub fn start(&mut self) -> bool {
        let started = self.transition("start", |engine| engine.start());
        if started {
            (self.callbacks.on_started)();
        }
        started
    }

    pub fn pause(&mut self) -> bool {
        let paused = self.transition("pause", |engine| engine.pause());
        if paused {
            (self.callbacks.on_paused_or_stopped)();
        }
        paused
    }

    pub fn stop(&mut self) -> bool {
        let stopped = self.transition("stop", |engine| engine.stop());
        if stopped {
            (self.callbacks.on_paused_or_stopped)();
        }
        stopped
    }

    /// Duration of the loaded song, or [`MIN_DURATION`] when there is none.
    pub fn duration(&self) -> Duration {
        let Some(engine) = self.loaded_engine() else {
            return MIN_DURATION;
        };

        match engine.duration() {
            Ok(duration) => duration.max(MIN_DURATION),
            Err(e) => {
                warn!(error = %e, "Failed to read duration");
                MIN_DURATION
            }
        }
    }

    pub fn current_position(&self) -> Duration {
        let Some(engine) = self.loaded_engine() else {
            return Duration::ZERO;
        };

        engine.position().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read position");
            self.last_position
        })
    }

    pub fn is_playing(&self) -> bool {
        self.loaded_engine().is_some_and(|engine| {
            engine.is_playing().unwrap_or_else(|e| {
                warn!(error = %e, "Failed to read playing state");
                false
            })
        })
    }

    /// Seeks to `target_ms` and returns the resulting position.
    ///
    /// A target outside `[0, duration]` seeks to the start instead. If the
    /// engine rejects the seek the last known position is returned.
    pub fn seek_to(&mut self, target_ms: i64) -> Duration {
        if !self.loaded {
            debug!(target_ms, "Seek ignored, no song loaded");
            return self.last_position;
        }

        let duration = self.duration();
        let target = u64::try_from(target_ms)
            .map(Duration::from_millis)
            .ok()
            .filter(|target| *target <= duration)
            .unwrap_or(Duration::ZERO);

        let result = match self.loaded_engine_mut() {
            Some(engine) => engine.seek_to(target),
            None => Err(EngineError::InvalidState("seek_to")),
        };

        match result {
            Ok(()) => {
                self.last_position = target;
                target
            }
            Err(e) => {
                warn!(error = %e, ?target, "Seek failed");
                self.current_position()
            }
        }
    }

    /// Seeks relative to the current position, staying within the song.
    pub fn seek_by(&mut self, delta_ms: i64) -> Duration {
        let current = millis(self.current_position());
        let duration = millis(self.duration());

        let target = if delta_ms < 0 {
            current.saturating_add(delta_ms).max(0)
        } else {
            current.saturating_add(delta_ms).min(duration)
        };

        self.seek_to(target)
    }

    pub fn seek_to_and_start(&mut self, target_ms: i64) -> bool {
        self.seek_to(target_ms);
        self.start()
    }

    /// Stops playback and frees the engine. Until the next
    /// [`load_new_song`](Self::load_new_song) the controller behaves as if
    /// nothing was ever loaded.
    pub fn release(&mut self) {
        (self.callbacks.on_paused_or_stopped)();

        if let Some(mut engine) = self.engine.take() {
            engine.release();
            info!("Released media engine");
        }

        self.loaded = false;
        self.last_position = Duration::ZERO;
    }

    /// Drains pending engine events and forwards the ones that matter.
    pub fn pump_engine_events(&mut self) {
        let mut events = Vec::new();
        if let Some(engine) = self.engine.as_deref_mut() {
            while let Some(event) = engine.poll_event() {
                events.push(event);
            }
        }

        for event in events {
            match event {
                EngineEvent::Completed { position, duration } => {
                    self.handle_completed(position, duration)
                }
            }
        }
    }

    // Engines can raise spurious completion signals while being reset, only
    // signals reported close enough to the end of the song are forwarded.
    fn handle_completed(&mut self, position: Duration, duration: Duration) {
        let tolerance = duration.mul_f64(self.completion_tolerance);

        if position.abs_diff(duration) <= tolerance {
            debug!(?position, ?duration, "Song completed");
            (self.callbacks.on_completed)();
        } else {
            debug!(?position, ?duration, "Ignoring spurious completion signal");
        }
    }

    fn transition(
        &mut self,
        name: &'static str,
        op: impl FnOnce(&mut dyn MediaEngine) -> Result<(), EngineError>,
    ) -> bool {
        let Some(engine) = self.loaded_engine_mut() else {
            debug!(operation = name, "Ignored, no song loaded");
            return false;
        };

        match op(engine) {
            Ok(()) => true,
            Err(e) => {
                warn!(operation = name, error = %e, "Engine rejected transition");
                false
            }
        }
    }

    fn engine_or_create(&mut self) -> Option<&mut (dyn MediaEngine + 'static)> {
        if self.engine.is_none() {
            match (self.factory)() {
                Ok(engine) => self.engine = Some(engine),
                Err(e) => {
                    warn!(error = %e, "Failed to create media engine");
                    return None;
                }
            }
        }

        self.engine.as_deref_mut()
    }

    fn loaded_engine(&self) -> Option<&dyn MediaEngine> {
        if self.loaded {
            self.engine.as_deref()
        } else {
            None
        }
    }

    fn loaded_engine_mut(&mut self) -> Option<&mut (dyn MediaEngine + 'static)> {
        if self.loaded {
            self.engine.as_deref_mut()
        } else {
            None
        }
    }
}

fn prepare_source(engine: &mut dyn MediaEngine, source: &Path) -> Result<(), EngineError> {
    engine.reset()?;
    engine.set_source(source)?;
    engine.prepare()
}

fn millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use std::{
        path::PathBuf,
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use super::*;
    use crate::player::simulated::EngineRig;

    #[derive(Default)]
    struct Counters {
        started: AtomicUsize,
        paused_or_stopped: AtomicUsize,
        completed: AtomicUsize,
    }

    fn song(file: &str) -> Song {
        Song {
            id: 7,
            title: "Seven".to_string(),
            artist_name: "Artist".to_string(),
            year: 2007,
            album_art: "art/7.png".to_string(),
            audio_file: PathBuf::from(file),
        }
    }

    fn controller(rig: &EngineRig) -> (MediaSessionController, Arc<Counters>) {
        let counters = Arc::new(Counters::default());
        let mut controller =
            MediaSessionController::new(rig.factory(), DEFAULT_COMPLETION_TOLERANCE);

        let started = Arc::clone(&counters);
        let paused = Arc::clone(&counters);
        let completed = Arc::clone(&counters);
        controller.init(SessionCallbacks {
            on_started: Box::new(move || {
                started.started.fetch_add(1, Ordering::SeqCst);
            }),
            on_paused_or_stopped: Box::new(move || {
                paused.paused_or_stopped.fetch_add(1, Ordering::SeqCst);
            }),
            on_completed: Box::new(move || {
                completed.completed.fetch_add(1, Ordering::SeqCst);
            }),
        });

        (controller, counters)
    }

    fn loaded(rig: &EngineRig, seconds: u64) -> (MediaSessionController, Arc<Counters>) {
        rig.set_duration("song.mp3", Duration::from_secs(seconds));
        let (mut controller, counters) = controller(rig);
        assert!(controller.load_new_song(Some(&song("song.mp3"))));
        (controller, counters)
    }

    #[test]
    fn unloaded_controller_uses_safe_defaults() {
        let rig = EngineRig::new();
        let (mut controller, _) = controller(&rig);

        assert_eq!(controller.duration(), MIN_DURATION);
        assert_eq!(controller.current_position(), Duration::ZERO);
        assert!(!controller.is_playing());
        assert!(!controller.start());
        assert!(!controller.pause());
        assert!(!controller.stop());
        assert_eq!(controller.seek_to(1_000), Duration::ZERO);
    }

    #[test]
    fn load_without_song_fails() {
        let rig = EngineRig::new();
        let (mut controller, counters) = controller(&rig);

        assert!(!controller.load_new_song(None));
        assert_eq!(counters.paused_or_stopped.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn load_tears_down_before_loading() {
        let rig = EngineRig::new();
        let (mut controller, counters) = loaded(&rig, 60);
        assert!(controller.start());

        assert!(controller.load_new_song(Some(&song("other.mp3"))));

        assert_eq!(counters.paused_or_stopped.load(Ordering::SeqCst), 2);
        assert!(!controller.is_playing());
        assert_eq!(rig.source(), Some(PathBuf::from("other.mp3")));
    }

    #[test]
    fn failed_load_leaves_engine_usable() {
        let rig = EngineRig::new();
        rig.fail_source("broken.mp3");
        let (mut controller, _) = controller(&rig);

        assert!(!controller.load_new_song(Some(&song("broken.mp3"))));
        assert!(!controller.start());
        assert_eq!(controller.duration(), MIN_DURATION);

        assert!(controller.load_new_song(Some(&song("fine.mp3"))));
        assert!(controller.start());
        assert_eq!(rig.calls().created, 1);
    }

    #[test]
    fn failed_prepare_is_reported() {
        let rig = EngineRig::new();
        rig.fail_prepare(true);
        let (mut controller, _) = controller(&rig);

        assert!(!controller.load_new_song(Some(&song("song.mp3"))));

        rig.fail_prepare(false);
        assert!(controller.load_new_song(Some(&song("song.mp3"))));
    }

    #[test]
    fn start_and_pause_fire_callbacks() {
        let rig = EngineRig::new();
        let (mut controller, counters) = loaded(&rig, 60);

        assert!(controller.start());
        assert!(controller.is_playing());
        assert_eq!(counters.started.load(Ordering::SeqCst), 1);

        assert!(controller.pause());
        assert!(!controller.is_playing());
        assert_eq!(counters.paused_or_stopped.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn rejected_transition_returns_false() {
        let rig = EngineRig::new();
        let (mut controller, counters) = loaded(&rig, 60);

        // Pausing a prepared but never started engine is an invalid state.
        assert!(!controller.pause());
        assert_eq!(counters.paused_or_stopped.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn seek_to_clamps_out_of_range_targets() {
        let rig = EngineRig::new();
        let (mut controller, _) = loaded(&rig, 60);

        assert_eq!(controller.seek_to(-1), Duration::ZERO);
        assert_eq!(controller.seek_to(60_001), Duration::ZERO);
        assert_eq!(controller.seek_to(60_000), Duration::from_secs(60));
        assert_eq!(controller.seek_to(12_345), Duration::from_millis(12_345));
        assert_eq!(controller.current_position(), Duration::from_millis(12_345));
    }

    #[test]
    fn seek_by_stays_within_song() {
        let rig = EngineRig::new();
        let (mut controller, _) = loaded(&rig, 60);

        controller.seek_to(3_000);
        assert_eq!(controller.seek_by(-5_000), Duration::ZERO);

        controller.seek_to(58_000);
        assert_eq!(controller.seek_by(5_000), Duration::from_secs(60));

        controller.seek_to(10_000);
        assert_eq!(controller.seek_by(5_000), Duration::from_secs(15));
        assert_eq!(controller.seek_by(-5_000), Duration::from_secs(10));

        for delta in [i64::MIN, -1, 0, 1, i64::MAX] {
            let position = controller.seek_by(delta);
            assert!(position <= Duration::from_secs(60));
        }
    }

    #[test]
    fn seek_to_and_start_resumes() {
        let rig = EngineRig::new();
        let (mut controller, _) = loaded(&rig, 60);

        assert!(controller.seek_to_and_start(20_000));
        assert!(rig.is_playing());
        assert_eq!(rig.calls().seeks, vec![Duration::from_secs(20)]);
    }

    #[test]
    fn release_discards_engine() {
        let rig = EngineRig::new();
        let (mut controller, counters) = loaded(&rig, 60);
        controller.start();

        controller.release();

        assert_eq!(counters.paused_or_stopped.load(Ordering::SeqCst), 2);
        assert_eq!(rig.calls().releases, 1);
        assert!(!controller.is_playing());
        assert_eq!(controller.duration(), MIN_DURATION);
        assert!(!controller.start());

        assert!(controller.load_new_song(Some(&song("song.mp3"))));
        assert_eq!(rig.calls().created, 2);
    }

    #[test]
    fn completion_near_end_is_forwarded() {
        let rig = EngineRig::new();
        let (mut controller, counters) = loaded(&rig, 100);
        controller.start();

        rig.signal_completion_at(Duration::from_secs(96));
        controller.pump_engine_events();
        assert_eq!(counters.completed.load(Ordering::SeqCst), 1);

        rig.complete();
        controller.pump_engine_events();
        assert_eq!(counters.completed.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn spurious_completion_is_ignored() {
        let rig = EngineRig::new();
        let (mut controller, counters) = loaded(&rig, 100);

        rig.signal_completion_at(Duration::ZERO);
        rig.signal_completion_at(Duration::from_secs(94));
        controller.pump_engine_events();

        assert_eq!(counters.completed.load(Ordering::SeqCst), 0);
    }
}
