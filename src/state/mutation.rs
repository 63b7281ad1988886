//! Pure state transformations behind every control-surface operation.
//!
//! The service layer wraps each [`Mutation`] in a load → apply → save transaction; nothing in here
//! touches storage or reads the wall clock.

use std::time::Duration;

use crate::state::{
    display::{DisplayState, MAX_TEAMS, Mode, Team},
    time_source::Timestamp,
};

/// Timer change requested by the controller; at least one field is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerUpdate {
    /// New countdown duration.
    pub duration: Option<Duration>,
    /// Requested running state.
    pub running: Option<bool>,
}

/// One operation of the control surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Start the stopwatch if stopped, stop it otherwise.
    ToggleStopwatch,
    /// Zero and stop the stopwatch.
    ResetStopwatch,
    /// Start the game clock if stopped, stop it otherwise.
    ToggleGameClock,
    /// Zero and stop the game clock.
    ResetGameClock,
    /// Drive the countdown timer.
    UpdateTimer(TimerUpdate),
    /// Switch the active view, optionally replacing the message.
    SetMode {
        /// View to show.
        mode: Mode,
        /// New message payload, kept as is when absent.
        message: Option<String>,
    },
    /// Replace the teams and show the scoreboard.
    UpdateScoreboard(Vec<Team>),
}

impl DisplayState {
    /// Apply `mutation` as of `now`.
    pub fn apply(&mut self, mutation: Mutation, now: Timestamp) {
        match mutation {
            Mutation::ToggleStopwatch => self.stopwatch.toggle(now),
            Mutation::ResetStopwatch => self.stopwatch.reset(),
            Mutation::ToggleGameClock => self.game_clock.toggle(now),
            Mutation::ResetGameClock => self.game_clock.reset(),
            Mutation::UpdateTimer(update) => self.update_timer(update, now),
            Mutation::SetMode { mode, message } => {
                self.mode = mode;
                if let Some(message) = message {
                    self.message = message;
                }
            }
            Mutation::UpdateScoreboard(mut teams) => {
                teams.truncate(MAX_TEAMS);
                self.teams = teams;
                self.mode = Mode::TeamScoreboard;
            }
        }
    }

    fn update_timer(&mut self, update: TimerUpdate, now: Timestamp) {
        let timer = &mut self.timer;
        match update.running {
            Some(true) if !timer.is_running() => {
                if let Some(duration) = update.duration {
                    timer.set_target(duration);
                }
                timer.start(now);
            }
            Some(false) => {
                timer.pause(now);
                if let Some(duration) = update.duration {
                    timer.set_target(duration);
                }
            }
            // Already running, or no running flag: only the duration may change.
            Some(true) | None => {
                if let Some(duration) = update.duration {
                    timer.retarget(duration, now);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::display::Rgb;

    fn at(millis: i64) -> Timestamp {
        Timestamp::from_millis(millis)
    }

    fn secs(value: u64) -> Duration {
        Duration::from_secs(value)
    }

    fn timer(duration: Option<u64>, running: Option<bool>) -> Mutation {
        Mutation::UpdateTimer(TimerUpdate {
            duration: duration.map(secs),
            running,
        })
    }

    #[test]
    fn timer_pause_and_resume_scenario() {
        let mut state = DisplayState::default();
        state.apply(timer(Some(30), Some(true)), at(0));
        assert!(state.timer.is_running());

        state.apply(timer(None, Some(false)), at(10_000));
        assert!(!state.timer.is_running());
        assert_eq!(state.timer.target(), secs(20));

        state.apply(timer(None, Some(true)), at(12_000));
        assert_eq!(state.timer.remaining(at(12_000)), secs(20));
        assert_eq!(state.timer.remaining(at(31_999)), Duration::from_millis(1));
        assert_eq!(state.timer.remaining(at(32_000)), Duration::ZERO);
    }

    #[test]
    fn timer_start_while_running_is_idempotent() {
        let mut state = DisplayState::default();
        state.apply(timer(Some(60), Some(true)), at(0));
        state.apply(timer(None, Some(true)), at(20_000));
        assert_eq!(state.timer.started_at(), Some(at(0)));
        assert_eq!(state.timer.remaining(at(20_000)), secs(40));
    }

    #[test]
    fn timer_stop_with_duration_overrides_remaining() {
        let mut state = DisplayState::default();
        state.apply(timer(Some(60), Some(true)), at(0));
        state.apply(timer(Some(5), Some(false)), at(20_000));
        assert!(!state.timer.is_running());
        assert_eq!(state.timer.target(), secs(5));
    }

    #[test]
    fn timer_duration_only_while_idle_stays_idle() {
        let mut state = DisplayState::default();
        state.apply(timer(Some(90), None), at(3_000));
        assert!(!state.timer.is_running());
        assert_eq!(state.timer.remaining(at(100_000)), secs(90));
    }

    #[test]
    fn timer_duration_only_while_running_restarts_from_request() {
        let mut state = DisplayState::default();
        state.apply(timer(Some(60), Some(true)), at(0));
        state.apply(timer(Some(120), None), at(45_000));
        assert!(state.timer.is_running());
        assert_eq!(state.timer.started_at(), Some(at(45_000)));
        assert_eq!(state.timer.remaining(at(45_000)), secs(120));
    }

    #[test]
    fn timer_stop_while_idle_keeps_target() {
        let mut state = DisplayState::default();
        state.apply(timer(Some(15), None), at(0));
        state.apply(timer(None, Some(false)), at(9_000));
        assert_eq!(state.timer.target(), secs(15));
    }

    #[test]
    fn clocks_are_independent() {
        let mut state = DisplayState::default();
        state.apply(Mutation::ToggleStopwatch, at(0));
        state.apply(Mutation::ToggleGameClock, at(1_000));
        state.apply(Mutation::ToggleStopwatch, at(4_000));

        assert_eq!(state.stopwatch.project(at(10_000)), secs(4));
        assert_eq!(state.game_clock.project(at(10_000)), secs(9));

        state.apply(Mutation::ResetGameClock, at(10_000));
        assert_eq!(state.game_clock.project(at(20_000)), Duration::ZERO);
        assert_eq!(state.stopwatch.project(at(20_000)), secs(4));

        state.apply(Mutation::ResetStopwatch, at(20_000));
        assert_eq!(state.stopwatch.project(at(20_000)), Duration::ZERO);
    }

    #[test]
    fn set_mode_keeps_message_unless_given() {
        let mut state = DisplayState::default();
        state.apply(
            Mutation::SetMode {
                mode: Mode::Message,
                message: Some("Pause bis 14:00".into()),
            },
            at(0),
        );
        state.apply(
            Mutation::SetMode {
                mode: Mode::Stopwatch,
                message: None,
            },
            at(0),
        );
        assert_eq!(state.mode, Mode::Stopwatch);
        assert_eq!(state.message, "Pause bis 14:00");
    }

    #[test]
    fn scoreboard_update_forces_scoreboard_mode() {
        let mut state = DisplayState::default();
        let teams = vec![
            Team::new("Rot", 3, Rgb::new(255, 0, 0)),
            Team::new("Blau", -1, Rgb::new(0, 0, 255)),
        ];
        state.apply(Mutation::UpdateScoreboard(teams.clone()), at(0));
        assert_eq!(state.mode, Mode::TeamScoreboard);
        assert_eq!(state.teams, teams);
    }
}
