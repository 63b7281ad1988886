use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::state::{
    clock::{Clock, Countdown},
    display::{DisplayState, MAX_TEAMS, Mode, Rgb, Team},
    time_source::Timestamp,
};

/// On-disk layout of the shared display state.
///
/// Field names and units are shared with every process reading the file: stopwatch and game clock
/// instants are epoch milliseconds, the timer uses fractional epoch seconds. Missing clock fields
/// read as stopped and zeroed; a missing message or team list is filled from the store's defaults
/// by [`StateDocument::into_state`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StateDocument {
    /// Active view.
    pub mode: Mode,
    /// Payload of the message view.
    pub message: Option<String>,
    /// Teams in display order.
    pub teams: Option<Vec<TeamEntity>>,
    /// Whether the stopwatch runs.
    #[serde(alias = "clock_running")]
    pub stopwatch_running: bool,
    /// Stopwatch time banked before the current run, in milliseconds.
    pub elapsed_ms: u64,
    /// Start of the current stopwatch run, epoch milliseconds.
    pub last_start_ts: Option<i64>,
    /// Whether the game clock runs.
    pub game_clock_running: bool,
    /// Game clock time banked before the current run, in milliseconds.
    pub game_elapsed_ms: u64,
    /// Start of the current game clock run, epoch milliseconds.
    pub game_last_start_ts: Option<i64>,
    /// Whether the countdown runs.
    pub timer_running: bool,
    /// Countdown target in seconds.
    pub timer_duration: f64,
    /// Start of the current countdown run, epoch seconds.
    pub timer_start_ts: Option<f64>,
}

/// Team record as stored in the document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamEntity {
    /// Display name.
    pub name: String,
    /// Current score.
    #[serde(default)]
    pub score: i32,
    /// Card color as `[r, g, b]`.
    pub color: [u8; 3],
}

impl Default for StateDocument {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            message: None,
            teams: None,
            stopwatch_running: false,
            elapsed_ms: 0,
            last_start_ts: None,
            game_clock_running: false,
            game_elapsed_ms: 0,
            game_last_start_ts: None,
            timer_running: false,
            timer_duration: 0.0,
            timer_start_ts: None,
        }
    }
}

impl From<Team> for TeamEntity {
    fn from(value: Team) -> Self {
        Self {
            name: value.name,
            score: value.score,
            color: value.color.into(),
        }
    }
}

impl From<TeamEntity> for Team {
    fn from(value: TeamEntity) -> Self {
        Self {
            name: value.name,
            score: value.score,
            color: Rgb::from(value.color),
        }
    }
}

impl From<DisplayState> for StateDocument {
    fn from(value: DisplayState) -> Self {
        Self {
            mode: value.mode,
            message: Some(value.message),
            teams: Some(value.teams.into_iter().map(Into::into).collect()),
            stopwatch_running: value.stopwatch.is_running(),
            elapsed_ms: duration_to_millis(value.stopwatch.accumulated()),
            last_start_ts: value.stopwatch.started_at().map(Timestamp::as_millis),
            game_clock_running: value.game_clock.is_running(),
            game_elapsed_ms: duration_to_millis(value.game_clock.accumulated()),
            game_last_start_ts: value.game_clock.started_at().map(Timestamp::as_millis),
            timer_running: value.timer.is_running(),
            timer_duration: value.timer.target().as_secs_f64(),
            timer_start_ts: value.timer.started_at().map(Timestamp::as_secs_f64),
        }
    }
}

impl StateDocument {
    /// Rebuild the domain state, taking the message and teams from `defaults` when the document
    /// does not carry them.
    pub fn into_state(self, defaults: &DisplayState) -> DisplayState {
        let mut teams: Vec<Team> = match self.teams {
            Some(teams) => teams.into_iter().map(Into::into).collect(),
            None => defaults.teams.clone(),
        };
        teams.truncate(MAX_TEAMS);

        DisplayState {
            mode: self.mode,
            message: self.message.unwrap_or_else(|| defaults.message.clone()),
            teams,
            stopwatch: Clock::from_parts(
                Duration::from_millis(self.elapsed_ms),
                self.stopwatch_running,
                self.last_start_ts.map(Timestamp::from_millis),
            ),
            game_clock: Clock::from_parts(
                Duration::from_millis(self.game_elapsed_ms),
                self.game_clock_running,
                self.game_last_start_ts.map(Timestamp::from_millis),
            ),
            timer: Countdown::from_parts(
                seconds_to_duration(self.timer_duration),
                self.timer_running,
                self.timer_start_ts.and_then(Timestamp::from_secs_f64),
            ),
        }
    }
}

impl From<StateDocument> for DisplayState {
    fn from(value: StateDocument) -> Self {
        value.into_state(&DisplayState::default())
    }
}

fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Seconds to a millisecond-rounded duration; negative or non-finite input reads as zero.
fn seconds_to_duration(secs: f64) -> Duration {
    if !secs.is_finite() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::from_millis((secs * 1000.0).round() as u64)
}
