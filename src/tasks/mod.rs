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

//! Asynchronous handler execution.
//!
//! Handlers that talk to the media session are run as jobs on a lane, so the
//! session keeps consuming intents while a song loads. There is one engine,
//! so every job goes through one queue and runs in submission order:
//!
//! * [`SequentialLane`] owns the queue and runs plain jobs to completion.
//! * [`RestartableLane`] feeds the same queue but keeps only its most recent
//!   job alive; restarting cancels the previous one whether it is still
//!   queued or already running. Each job is tagged with a generation so that
//!   results produced just before a cancellation can still be recognised as
//!   stale by the receiver.
//!
//! Both report results as [`Emission`]s on a channel shared with the session,
//! which folds them in the order they arrive.
//!
//! [`PositionTicker`] is the periodic playback clock.

use std::time::Duration;

use futures::future::BoxFuture;
use tokio::{
    sync::mpsc,
    time::{Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::{error::Result, player::worker::PlayerHandle};

/// A unit of handler work, resolving to the values it produced.
pub type Job<T> = BoxFuture<'static, Result<Vec<T>>>;

/// Where an emission came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Sequential,
    Restartable(u64),
}

/// The result of one job.
#[derive(Debug)]
pub struct Emission<T> {
    pub origin: Origin,
    pub label: &'static str,
    pub result: Result<Vec<T>>,
}

struct Queued<T> {
    label: &'static str,
    origin: Origin,
    cancel: Option<CancellationToken>,
    job: Job<T>,
}

/// Runs jobs one after the other on a single task.
pub struct SequentialLane<T> {
    job_tx: mpsc::UnboundedSender<Queued<T>>,
    cancel: CancellationToken,
}

impl<T: Send + 'static> SequentialLane<T> {
    /// Spawns the lane task. Must be called from within a tokio runtime.
    pub fn spawn(emission_tx: mpsc::UnboundedSender<Emission<T>>, cancel: CancellationToken) -> Self {
        let (job_tx, mut job_rx) = mpsc::unbounded_channel::<Queued<T>>();
        let lane_cancel = cancel.clone();

        tokio::spawn(async move {
            loop {
                let queued = tokio::select! {
                    _ = lane_cancel.cancelled() => break,
                    queued = job_rx.recv() => match queued {
                        Some(queued) => queued,
                        None => break,
                    },
                };

                let Queued {
                    label,
                    origin,
                    cancel,
                    job,
                } = queued;
                let job_cancel = cancel.unwrap_or_else(CancellationToken::new);

                let result = tokio::select! {
                    biased;
                    _ = lane_cancel.cancelled() => break,
                    _ = job_cancel.cancelled() => None,
                    result = job => Some(result),
                };

                let Some(result) = result else {
                    debug!(label, ?origin, "Job cancelled");
                    continue;
                };

                if emission_tx.send(Emission { origin, label, result }).is_err() {
                    break;
                }
            }
            debug!("Sequential lane stopped");
        });

        Self { job_tx, cancel }
    }

    /// Queues a job behind any already submitted.
    pub fn submit(&self, label: &'static str, job: Job<T>) {
        enqueue(
            &self.job_tx,
            Queued {
                label,
                origin: Origin::Sequential,
                cancel: None,
                job,
            },
        );
    }

    /// A restartable lane feeding this lane's queue.
    pub fn restartable(&self) -> RestartableLane<T> {
        RestartableLane {
            job_tx: self.job_tx.clone(),
            parent: self.cancel.child_token(),
            latest: 0,
            active: None,
        }
    }

    /// Stops the lane, abandoning the running job and anything queued.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

fn enqueue<T>(job_tx: &mpsc::UnboundedSender<Queued<T>>, queued: Queued<T>) {
    let label = queued.label;
    if job_tx.send(queued).is_err() {
        debug!(label, "Lane closed, job discarded");
    }
}

/// Keeps at most one job alive on a [`SequentialLane`], newest wins.
pub struct RestartableLane<T> {
    job_tx: mpsc::UnboundedSender<Queued<T>>,
    parent: CancellationToken,
    latest: u64,
    active: Option<CancellationToken>,
}

impl<T: Send + 'static> RestartableLane<T> {
    /// Cancels the job in flight, if any, and queues `job` in its place.
    ///
    /// Returns the generation the job's emission will carry.
    pub fn restart(&mut self, label: &'static str, job: Job<T>) -> u64 {
        self.cancel();

        self.latest = self.latest.wrapping_add(1);
        let generation = self.latest;
        let token = self.parent.child_token();
        self.active = Some(token.clone());

        enqueue(
            &self.job_tx,
            Queued {
                label,
                origin: Origin::Restartable(generation),
                cancel: Some(token),
                job,
            },
        );

        generation
    }

    /// Whether `generation` belongs to the most recently started job.
    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.latest
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.active.take() {
            token.cancel();
        }
    }
}

/// Periodically samples the playback position while a song is playing.
///
/// At most one ticking task exists at a time. Every sample carries the
/// generation of the task that produced it so late samples from a stopped
/// ticker can be discarded.
pub struct PositionTicker {
    interval: Duration,
    parent: CancellationToken,
    latest: u64,
    active: Option<CancellationToken>,
}

/// A sample taken by the [`PositionTicker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub generation: u64,
    pub position: Duration,
}

impl PositionTicker {
    pub fn new(interval: Duration, parent: CancellationToken) -> Self {
        Self {
            interval,
            parent,
            latest: 0,
            active: None,
        }
    }

    /// Starts ticking, replacing any running ticker. The first sample is
    /// taken one interval from now.
    pub fn start<F>(&mut self, player: PlayerHandle, mut on_tick: F)
    where
        F: FnMut(Tick) -> bool + Send + 'static,
    {
        self.stop();

        self.latest = self.latest.wrapping_add(1);
        let generation = self.latest;
        let token = self.parent.child_token();
        self.active = Some(token.clone());

        let mut interval =
            tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {}
                }

                let position = tokio::select! {
                    _ = token.cancelled() => break,
                    position = player.current_position() => position,
                };

                let Ok(position) = position else {
                    break;
                };

                trace!(generation, ?position, "Position tick");
                if !on_tick(Tick { generation, position }) {
                    break;
                }
            }
            debug!(generation, "Position ticker stopped");
        });
    }

    pub fn stop(&mut self) {
        if let Some(token) = self.active.take() {
            token.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Whether `tick` came from the ticker that is running now.
    pub fn is_current(&self, tick: &Tick) -> bool {
        self.active.is_some() && tick.generation == self.latest
    }
}
