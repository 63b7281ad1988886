//! Pausable clocks whose displayed value is recomputed from stored components.
//!
//! A clock never stores a continuously updated counter. It keeps the duration banked by previous
//! runs plus the instant the current run began, so projecting it at any `now` is exact no matter how
//! long nobody looked at it.

use std::time::Duration;

use crate::state::time_source::Timestamp;

/// Stopwatch-style clock counting up while running.
///
/// `started_at` is present exactly when the clock runs; the running flag is derived from it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Clock {
    accumulated: Duration,
    started_at: Option<Timestamp>,
}

impl Clock {
    /// Rebuild a clock from its stored components.
    ///
    /// A running flag without a start instant is read as stopped, and a start instant without the
    /// running flag is dropped.
    pub fn from_parts(accumulated: Duration, running: bool, started_at: Option<Timestamp>) -> Self {
        Self {
            accumulated,
            started_at: started_at.filter(|_| running),
        }
    }

    /// Whether time is currently accruing.
    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Duration banked before the current run.
    pub fn accumulated(&self) -> Duration {
        self.accumulated
    }

    /// Start of the current run, if any.
    pub fn started_at(&self) -> Option<Timestamp> {
        self.started_at
    }

    /// Begin a run at `now`; a running clock keeps its original start.
    pub fn start(&mut self, now: Timestamp) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }

    /// End the current run, banking its length; a stopped clock is left untouched.
    pub fn stop(&mut self, now: Timestamp) {
        if let Some(started_at) = self.started_at.take() {
            self.accumulated += now.saturating_since(started_at);
        }
    }

    /// Start a stopped clock or stop a running one.
    pub fn toggle(&mut self, now: Timestamp) {
        if self.is_running() {
            self.stop(now);
        } else {
            self.start(now);
        }
    }

    /// Zero the clock and stop it.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Elapsed time as displayed at `now`.
    pub fn project(&self, now: Timestamp) -> Duration {
        match self.started_at {
            Some(started_at) => self.accumulated + now.saturating_since(started_at),
            None => self.accumulated,
        }
    }
}

/// Countdown timer counting down from a target duration.
///
/// Pausing folds the elapsed run into the target, so the underlying run clock never banks time and
/// the stored form is just the target plus an optional start instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Countdown {
    target: Duration,
    run: Clock,
}

impl Countdown {
    /// Rebuild a countdown from its stored components.
    pub fn from_parts(target: Duration, running: bool, started_at: Option<Timestamp>) -> Self {
        Self {
            target,
            run: Clock::from_parts(Duration::ZERO, running, started_at),
        }
    }

    /// Whether the countdown is currently running.
    pub fn is_running(&self) -> bool {
        self.run.is_running()
    }

    /// Duration the current run counts down from.
    pub fn target(&self) -> Duration {
        self.target
    }

    /// Start of the current run, if any.
    pub fn started_at(&self) -> Option<Timestamp> {
        self.run.started_at()
    }

    /// Replace the target without touching the running state.
    pub fn set_target(&mut self, target: Duration) {
        self.target = target;
    }

    /// Replace the target; a running countdown restarts its run at `now` so the new target counts
    /// down in full from this instant.
    pub fn retarget(&mut self, target: Duration, now: Timestamp) {
        self.target = target;
        if self.run.is_running() {
            self.run.reset();
            self.run.start(now);
        }
    }

    /// Begin counting down at `now`; a running countdown keeps its original start.
    pub fn start(&mut self, now: Timestamp) {
        self.run.start(now);
    }

    /// Stop at `now`, keeping the remaining time as the new target.
    pub fn pause(&mut self, now: Timestamp) {
        if self.run.is_running() {
            self.target = self.remaining(now);
            self.run.reset();
        }
    }

    /// Time spent counting down during the current run.
    pub fn elapsed(&self, now: Timestamp) -> Duration {
        self.run.project(now)
    }

    /// Remaining time at `now`, never below zero.
    pub fn remaining(&self, now: Timestamp) -> Duration {
        self.target.saturating_sub(self.elapsed(now))
    }
}
