use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dto::format_timestamp,
    state::{
        display::{Mode, Team},
        projection::{ClockView, DisplayView, TimerView},
    },
};

/// Projected state of a count-up clock.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClockStatus {
    /// Whether the clock counts.
    pub running: bool,
    /// Elapsed time at the poll instant.
    pub elapsed_ms: u64,
    /// Time banked before the current run.
    pub accumulated_ms: u64,
    /// Start of the current run, epoch milliseconds.
    pub started_at_ms: Option<i64>,
    /// Elapsed time as `HH:MM:SS.cc`.
    pub display: String,
}

impl From<&ClockView> for ClockStatus {
    fn from(view: &ClockView) -> Self {
        Self {
            running: view.running,
            elapsed_ms: saturating_millis(view.elapsed.as_millis()),
            accumulated_ms: saturating_millis(view.accumulated.as_millis()),
            started_at_ms: view.started_at.map(|ts| ts.as_millis()),
            display: view.formatted(),
        }
    }
}

/// Projected state of the countdown timer.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TimerStatus {
    /// Whether the countdown runs.
    pub running: bool,
    /// Duration the current run counts down from.
    pub duration_ms: u64,
    /// Remaining time at the poll instant, never negative.
    pub remaining_ms: u64,
    /// Remaining time in seconds, never negative.
    pub remaining_seconds: f64,
    /// Whether the countdown reached zero.
    pub expired: bool,
    /// Start of the current run, epoch milliseconds.
    pub started_at_ms: Option<i64>,
    /// Remaining time as `MM:SS.cc`.
    pub display: String,
}

impl From<&TimerView> for TimerStatus {
    fn from(view: &TimerView) -> Self {
        Self {
            running: view.running,
            duration_ms: saturating_millis(view.target.as_millis()),
            remaining_ms: saturating_millis(view.remaining.as_millis()),
            remaining_seconds: view.remaining_seconds(),
            expired: view.expired(),
            started_at_ms: view.started_at.map(|ts| ts.as_millis()),
            display: view.formatted(),
        }
    }
}

/// Team as shown on the scoreboard.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamSummary {
    /// Display name.
    pub name: String,
    /// Current score.
    pub score: i32,
    /// Card color as `[r, g, b]`.
    #[schema(value_type = Vec<u8>)]
    pub color: [u8; 3],
}

impl From<&Team> for TeamSummary {
    fn from(team: &Team) -> Self {
        Self {
            name: team.name.clone(),
            score: team.score,
            color: team.color.into(),
        }
    }
}

/// Everything the screen shows at `now_ms`, as returned by `/status` and pushed on `/sse/display`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatusResponse {
    /// Poll instant the values were computed for, epoch milliseconds.
    pub now_ms: i64,
    /// Poll instant as RFC 3339.
    pub generated_at: String,
    /// Active view.
    pub mode: Mode,
    /// Payload of the message view.
    pub message: String,
    /// Teams in display order.
    pub teams: Vec<TeamSummary>,
    /// Stopwatch view.
    pub stopwatch: ClockStatus,
    /// Game clock shown under the scoreboard.
    pub game_clock: ClockStatus,
    /// Countdown view.
    pub timer: TimerStatus,
}

impl From<&DisplayView> for StatusResponse {
    fn from(view: &DisplayView) -> Self {
        Self {
            now_ms: view.now.as_millis(),
            generated_at: format_timestamp(view.now),
            mode: view.mode,
            message: view.message.clone(),
            teams: view.teams.iter().map(TeamSummary::from).collect(),
            stopwatch: ClockStatus::from(&view.stopwatch),
            game_clock: ClockStatus::from(&view.game_clock),
            timer: TimerStatus::from(&view.timer),
        }
    }
}

fn saturating_millis(millis: u128) -> u64 {
    u64::try_from(millis).unwrap_or(u64::MAX)
}
