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

//! Simulated media engine.
//!
//! A silent engine that follows the same state rules as a platform player
//! (idle, initialized, prepared, started, paused, stopped, completed). It is
//! used to run the demo without libmpv and to drive the session in tests.
//!
//! Every engine built by a rig's factory shares the rig's state, so a test
//! can inject failures, move the playback clock and inspect the calls the
//! controller made, even across release and re-creation of the engine.

use std::{
    collections::{HashMap, HashSet, VecDeque},
    path::{Path, PathBuf},
    sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

use crate::player::engine::{EngineError, EngineEvent, EngineFactory, MediaEngine};

const DEFAULT_DURATION: Duration = Duration::from_secs(180);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Initialized,
    Prepared,
    Started,
    Paused,
    Stopped,
    Completed,
}

/// Counters for the engine calls that reached a simulated engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineCalls {
    pub created: usize,
    pub set_sources: usize,
    pub prepares: usize,
    pub starts: usize,
    pub pauses: usize,
    pub stops: usize,
    pub seeks: Vec<Duration>,
    pub releases: usize,
}

struct SimulatedState {
    phase: Phase,
    source: Option<PathBuf>,
    position: Duration,
    started_at: Option<Instant>,
    realtime: bool,
    durations: HashMap<PathBuf, Duration>,
    failing_sources: HashSet<PathBuf>,
    fail_prepare: bool,
    held_prepare: Option<PrepareGate>,
    events: VecDeque<EngineEvent>,
    calls: EngineCalls,
}

impl SimulatedState {
    fn new(realtime: bool) -> Self {
        Self {
            phase: Phase::Idle,
            source: None,
            position: Duration::ZERO,
            started_at: None,
            realtime,
            durations: HashMap::new(),
            failing_sources: HashSet::new(),
            fail_prepare: false,
            held_prepare: None,
            events: VecDeque::new(),
            calls: EngineCalls::default(),
        }
    }

    fn duration(&self) -> Duration {
        self.source
            .as_ref()
            .and_then(|source| self.durations.get(source))
            .copied()
            .unwrap_or(DEFAULT_DURATION)
    }

    fn position(&self) -> Duration {
        let elapsed = self
            .started_at
            .map(|started_at| started_at.elapsed())
            .unwrap_or_default();

        (self.position + elapsed).min(self.duration())
    }

    // Folds the running clock into `position` before leaving the started phase.
    fn settle_clock(&mut self) {
        self.position = self.position();
        self.started_at = None;
    }

    fn set_phase(&mut self, phase: Phase) {
        self.settle_clock();
        if phase == Phase::Started && self.realtime {
            self.started_at = Some(Instant::now());
        }
        self.phase = phase;
    }

    fn complete(&mut self, position: Duration) {
        let duration = self.duration();
        self.set_phase(Phase::Completed);
        self.position = duration;
        self.events
            .push_back(EngineEvent::Completed { position, duration });
    }

    fn require(&self, operation: &'static str, allowed: &[Phase]) -> Result<(), EngineError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(EngineError::InvalidState(operation))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateState {
    Armed,
    Waiting,
    Open,
}

/// Holds one `prepare` call until opened. Dropping any handle opens it.
#[derive(Clone)]
pub struct PrepareGate {
    inner: Arc<(Mutex<GateState>, Condvar)>,
}

impl PrepareGate {
    fn new() -> Self {
        Self {
            inner: Arc::new((Mutex::new(GateState::Armed), Condvar::new())),
        }
    }

    /// Whether a `prepare` call is blocked on this gate.
    pub fn is_waiting(&self) -> bool {
        *self.state() == GateState::Waiting
    }

    pub fn open(&self) {
        *self.state() = GateState::Open;
        self.inner.1.notify_all();
    }

    fn wait(&self) {
        let mut state = self.state();
        if *state == GateState::Armed {
            *state = GateState::Waiting;
        }
        while *state != GateState::Open {
            state = self
                .inner
                .1
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn state(&self) -> MutexGuard<'_, GateState> {
        self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for PrepareGate {
    fn drop(&mut self) {
        self.open();
    }
}

/// Handle onto the state shared by every engine a factory creates.
#[derive(Clone)]
pub struct EngineRig {
    state: Arc<Mutex<SimulatedState>>,
}

impl Default for EngineRig {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineRig {
    /// A rig whose playback clock only moves when told to.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SimulatedState::new(false))),
        }
    }

    /// A rig whose playback clock follows wall time while started.
    pub fn realtime() -> Self {
        Self {
            state: Arc::new(Mutex::new(SimulatedState::new(true))),
        }
    }

    /// Returns a factory building engines bound to this rig.
    pub fn factory(&self) -> EngineFactory {
        let state = Arc::clone(&self.state);

        Box::new(move || {
            let engine = SimulatedEngine {
                state: Arc::clone(&state),
            };
            {
                let mut state = engine.lock();
                state.calls.created += 1;
                state.set_phase(Phase::Idle);
                state.source = None;
                state.position = Duration::ZERO;
            }
            Ok(Box::new(engine) as Box<dyn MediaEngine>)
        })
    }

    pub fn set_duration(&self, source: impl Into<PathBuf>, duration: Duration) {
        self.lock().durations.insert(source.into(), duration);
    }

    /// Makes `set_source` fail for the given file.
    pub fn fail_source(&self, source: impl Into<PathBuf>) {
        self.lock().failing_sources.insert(source.into());
    }

    /// Makes every `prepare` fail while set.
    pub fn fail_prepare(&self, fail: bool) {
        self.lock().fail_prepare = fail;
    }

    /// Makes the next `prepare` block until the returned gate is opened.
    pub fn hold_next_prepare(&self) -> PrepareGate {
        let gate = PrepareGate::new();
        self.lock().held_prepare = Some(gate.clone());
        gate
    }

    /// Moves the playback clock forward, clamped to the source duration.
    pub fn advance(&self, by: Duration) {
        let mut state = self.lock();
        let duration = state.duration();
        state.position = (state.position + by).min(duration);
    }

    /// Plays the current source to its end and raises the completion signal.
    pub fn complete(&self) {
        let mut state = self.lock();
        let duration = state.duration();
        state.complete(duration);
    }

    /// Raises a completion signal reporting an arbitrary position, the way a
    /// misbehaving engine does while it is being reset.
    pub fn signal_completion_at(&self, position: Duration) {
        let mut state = self.lock();
        let duration = state.duration();
        state
            .events
            .push_back(EngineEvent::Completed { position, duration });
    }

    pub fn calls(&self) -> EngineCalls {
        self.lock().calls.clone()
    }

    pub fn source(&self) -> Option<PathBuf> {
        self.lock().source.clone()
    }

    pub fn position(&self) -> Duration {
        self.lock().position()
    }

    pub fn is_playing(&self) -> bool {
        self.lock().phase == Phase::Started
    }

    fn lock(&self) -> MutexGuard<'_, SimulatedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A silent engine instance, see the module documentation.
pub struct SimulatedEngine {
    state: Arc<Mutex<SimulatedState>>,
}

impl SimulatedEngine {
    fn lock(&self) -> MutexGuard<'_, SimulatedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MediaEngine for SimulatedEngine {
    fn reset(&mut self) -> Result<(), EngineError> {
        let mut state = self.lock();
        state.set_phase(Phase::Idle);
        state.source = None;
        state.position = Duration::ZERO;
        Ok(())
    }

    fn set_source(&mut self, source: &Path) -> Result<(), EngineError> {
        let mut state = self.lock();
        state.require("set_source", &[Phase::Idle])?;
        state.calls.set_sources += 1;

        if state.failing_sources.contains(source) {
            return Err(EngineError::SourceUnavailable(source.to_path_buf()));
        }

        state.source = Some(source.to_path_buf());
        state.set_phase(Phase::Initialized);
        Ok(())
    }

    fn prepare(&mut self) -> Result<(), EngineError> {
        let held = self.lock().held_prepare.take();
        if let Some(gate) = held {
            gate.wait();
        }

        let mut state = self.lock();
        state.require("prepare", &[Phase::Initialized, Phase::Stopped])?;
        state.calls.prepares += 1;

        if state.fail_prepare {
            return Err(EngineError::Prepare("simulated prepare failure".to_string()));
        }

        state.position = Duration::ZERO;
        state.set_phase(Phase::Prepared);
        Ok(())
    }

    fn start(&mut self) -> Result<(), EngineError> {
        let mut state = self.lock();
        state.require(
            "start",
            &[Phase::Prepared, Phase::Started, Phase::Paused, Phase::Completed],
        )?;
        state.calls.starts += 1;

        if state.phase == Phase::Completed {
            state.position = Duration::ZERO;
        }
        state.set_phase(Phase::Started);
        Ok(())
    }

    fn pause(&mut self) -> Result<(), EngineError> {
        let mut state = self.lock();
        state.require("pause", &[Phase::Started, Phase::Paused])?;
        state.calls.pauses += 1;
        state.set_phase(Phase::Paused);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), EngineError> {
        let mut state = self.lock();
        state.require(
            "stop",
            &[
                Phase::Prepared,
                Phase::Started,
                Phase::Paused,
                Phase::Stopped,
                Phase::Completed,
            ],
        )?;
        state.calls.stops += 1;
        state.set_phase(Phase::Stopped);
        Ok(())
    }

    fn seek_to(&mut self, position: Duration) -> Result<(), EngineError> {
        let mut state = self.lock();
        state.require(
            "seek_to",
            &[Phase::Prepared, Phase::Started, Phase::Paused, Phase::Completed],
        )?;
        state.calls.seeks.push(position);

        let phase = state.phase;
        state.settle_clock();
        state.position = position.min(state.duration());
        state.set_phase(phase);
        Ok(())
    }

    fn duration(&self) -> Result<Duration, EngineError> {
        let state = self.lock();
        state.require(
            "duration",
            &[
                Phase::Prepared,
                Phase::Started,
                Phase::Paused,
                Phase::Stopped,
                Phase::Completed,
            ],
        )?;
        Ok(state.duration())
    }

    fn position(&self) -> Result<Duration, EngineError> {
        let state = self.lock();
        if state.phase == Phase::Idle {
            return Err(EngineError::InvalidState("position"));
        }
        Ok(state.position())
    }

    fn is_playing(&self) -> Result<bool, EngineError> {
        Ok(self.lock().phase == Phase::Started)
    }

    fn poll_event(&mut self) -> Option<EngineEvent> {
        let mut state = self.lock();

        if state.realtime && state.phase == Phase::Started && state.position() >= state.duration()
        {
            let position = state.position();
            state.complete(position);
        }

        state.events.pop_front()
    }

    fn release(&mut self) {
        let mut state = self.lock();
        state.calls.releases += 1;
        state.set_phase(Phase::Idle);
        state.source = None;
        state.position = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(rig: &EngineRig) -> Box<dyn MediaEngine> {
        let mut factory = rig.factory();
        factory().unwrap()
    }

    #[test]
    fn follows_prepare_start_pause_cycle() {
        let rig = EngineRig::new();
        let mut engine = engine(&rig);

        engine.set_source(Path::new("a.mp3")).unwrap();
        engine.prepare().unwrap();
        engine.start().unwrap();
        assert!(engine.is_playing().unwrap());

        engine.pause().unwrap();
        assert!(!engine.is_playing().unwrap());
        assert_eq!(engine.duration().unwrap(), DEFAULT_DURATION);
    }

    #[test]
    fn rejects_calls_in_wrong_state() {
        let rig = EngineRig::new();
        let mut engine = engine(&rig);

        assert!(matches!(engine.start(), Err(EngineError::InvalidState("start"))));
        assert!(matches!(engine.duration(), Err(EngineError::InvalidState(_))));
        assert!(matches!(engine.pause(), Err(EngineError::InvalidState(_))));
    }

    #[test]
    fn injected_failures() {
        let rig = EngineRig::new();
        rig.fail_source("missing.mp3");
        let mut engine = engine(&rig);

        assert!(matches!(
            engine.set_source(Path::new("missing.mp3")),
            Err(EngineError::SourceUnavailable(_))
        ));

        rig.fail_prepare(true);
        engine.set_source(Path::new("present.mp3")).unwrap();
        assert!(matches!(engine.prepare(), Err(EngineError::Prepare(_))));
    }

    #[test]
    fn held_prepare_waits_for_the_gate() {
        let rig = EngineRig::new();
        let gate = rig.hold_next_prepare();
        let mut engine = SimulatedEngine {
            state: Arc::clone(&rig.state),
        };
        engine.set_source(Path::new("a.mp3")).unwrap();

        let preparing = std::thread::spawn(move || engine.prepare());
        while !gate.is_waiting() {
            std::thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(rig.calls().prepares, 0);

        gate.open();
        preparing.join().unwrap().unwrap();
        assert_eq!(rig.calls().prepares, 1);
    }

    #[test]
    fn manual_clock_and_completion() {
        let rig = EngineRig::new();
        rig.set_duration("a.mp3", Duration::from_secs(10));
        let mut engine = engine(&rig);
        engine.set_source(Path::new("a.mp3")).unwrap();
        engine.prepare().unwrap();
        engine.start().unwrap();

        rig.advance(Duration::from_secs(4));
        assert_eq!(engine.position().unwrap(), Duration::from_secs(4));

        rig.advance(Duration::from_secs(60));
        assert_eq!(engine.position().unwrap(), Duration::from_secs(10));

        rig.complete();
        assert_eq!(
            engine.poll_event(),
            Some(EngineEvent::Completed {
                position: Duration::from_secs(10),
                duration: Duration::from_secs(10),
            })
        );
        assert_eq!(engine.poll_event(), None);
    }
}
