//! Read-side derivation of displayable values from a stored [`DisplayState`].
//!
//! The renderer and the status query both go through [`DisplayView::project`], so two observers
//! asking about the same stored state and the same instant see identical numbers.

use std::time::Duration;

use crate::state::{
    clock::{Clock, Countdown},
    display::{DisplayState, Mode, Team},
    time_source::Timestamp,
};

/// Projected value of a count-up clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockView {
    /// Whether the clock runs.
    pub running: bool,
    /// Elapsed time at the poll instant.
    pub elapsed: Duration,
    /// Duration banked before the current run.
    pub accumulated: Duration,
    /// Start of the current run.
    pub started_at: Option<Timestamp>,
}

impl ClockView {
    /// Project `clock` at `now`.
    pub fn project(clock: &Clock, now: Timestamp) -> Self {
        Self {
            running: clock.is_running(),
            elapsed: clock.project(now),
            accumulated: clock.accumulated(),
            started_at: clock.started_at(),
        }
    }

    /// Elapsed time formatted as `HH:MM:SS.cc`.
    pub fn formatted(&self) -> String {
        format_elapsed(self.elapsed)
    }
}

/// Projected value of the countdown timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerView {
    /// Whether the countdown runs.
    pub running: bool,
    /// Duration the current run counts down from.
    pub target: Duration,
    /// Remaining time at the poll instant, never below zero.
    pub remaining: Duration,
    /// Start of the current run.
    pub started_at: Option<Timestamp>,
}

impl TimerView {
    /// Project `timer` at `now`.
    pub fn project(timer: &Countdown, now: Timestamp) -> Self {
        Self {
            running: timer.is_running(),
            target: timer.target(),
            remaining: timer.remaining(now),
            started_at: timer.started_at(),
        }
    }

    /// Remaining time as fractional seconds.
    pub fn remaining_seconds(&self) -> f64 {
        self.remaining.as_secs_f64()
    }

    /// Whether the countdown has run out.
    pub fn expired(&self) -> bool {
        self.remaining.is_zero()
    }

    /// Remaining time formatted as `MM:SS.cc`.
    pub fn formatted(&self) -> String {
        format_remaining(self.remaining)
    }
}

/// Everything a consumer needs to draw the screen at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayView {
    /// Poll instant the view was computed for.
    pub now: Timestamp,
    /// Active view.
    pub mode: Mode,
    /// Message payload.
    pub message: String,
    /// Teams in display order.
    pub teams: Vec<Team>,
    /// Main stopwatch.
    pub stopwatch: ClockView,
    /// Game clock.
    pub game_clock: ClockView,
    /// Countdown timer.
    pub timer: TimerView,
}

impl DisplayView {
    /// Derive the view of `state` at `now`.
    pub fn project(state: &DisplayState, now: Timestamp) -> Self {
        Self {
            now,
            mode: state.mode,
            message: state.message.clone(),
            teams: state.teams.clone(),
            stopwatch: ClockView::project(&state.stopwatch, now),
            game_clock: ClockView::project(&state.game_clock, now),
            timer: TimerView::project(&state.timer, now),
        }
    }
}

/// Format a count-up duration as `HH:MM:SS.cc`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_secs = elapsed.as_secs();
    let centis = elapsed.subsec_millis() / 10;
    format!(
        "{:02}:{:02}:{:02}.{:02}",
        total_secs / 3600,
        (total_secs % 3600) / 60,
        total_secs % 60,
        centis
    )
}

/// Format a countdown duration as `MM:SS.cc`; minutes are not wrapped into hours.
pub fn format_remaining(remaining: Duration) -> String {
    let total_secs = remaining.as_secs();
    let centis = remaining.subsec_millis() / 10;
    format!("{:02}:{:02}.{:02}", total_secs / 60, total_secs % 60, centis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::mutation::{Mutation, TimerUpdate};

    fn at(millis: i64) -> Timestamp {
        Timestamp::from_millis(millis)
    }

    #[test]
    fn view_reflects_all_three_clocks() {
        let mut state = DisplayState::default();
        state.apply(Mutation::ToggleStopwatch, at(0));
        state.apply(Mutation::ToggleGameClock, at(2_000));
        state.apply(
            Mutation::UpdateTimer(TimerUpdate {
                duration: Some(Duration::from_secs(10)),
                running: Some(true),
            }),
            at(0),
        );

        let view = DisplayView::project(&state, at(5_000));
        assert_eq!(view.stopwatch.elapsed, Duration::from_secs(5));
        assert!(view.stopwatch.running);
        assert_eq!(view.game_clock.elapsed, Duration::from_secs(3));
        assert_eq!(view.timer.remaining, Duration::from_secs(5));
        assert_eq!(view.timer.remaining_seconds(), 5.0);

        let late = DisplayView::project(&state, at(15_000));
        assert_eq!(late.timer.remaining, Duration::ZERO);
        assert!(late.timer.expired());
    }

    #[test]
    fn same_state_and_instant_give_same_view() {
        let mut state = DisplayState::default();
        state.apply(Mutation::ToggleStopwatch, at(1_000));
        assert_eq!(
            DisplayView::project(&state, at(7_777)),
            DisplayView::project(&state.clone(), at(7_777))
        );
    }

    #[test]
    fn elapsed_format_matches_screen_layout() {
        assert_eq!(format_elapsed(Duration::ZERO), "00:00:00.00");
        assert_eq!(
            format_elapsed(Duration::from_millis(3_723_456)),
            "01:02:03.45"
        );
    }

    #[test]
    fn remaining_format_keeps_large_minutes() {
        assert_eq!(format_remaining(Duration::from_millis(65_990)), "01:05.99");
        assert_eq!(format_remaining(Duration::from_secs(7_200)), "120:00.00");
    }
}
