use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::clock::{Clock, Countdown};

/// Maximum number of teams shown on the scoreboard.
pub const MAX_TEAMS: usize = 2;

/// View the screen is currently showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Large wall clock with the date.
    #[default]
    Index,
    /// Stopwatch counting up.
    Stopwatch,
    /// Countdown timer.
    Timer,
    /// Free-text message.
    Message,
    /// Two team cards with their scores and the game clock.
    #[serde(alias = "scores_and_teams")]
    TeamScoreboard,
}

/// RGB color of a team card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Build a color from its three channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(value: Rgb) -> Self {
        [value.r, value.g, value.b]
    }
}

/// Team shown on the scoreboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    /// Display name.
    pub name: String,
    /// Current score, may go negative.
    pub score: i32,
    /// Card color.
    pub color: Rgb,
}

impl Team {
    /// Convenience constructor.
    pub fn new(name: impl Into<String>, score: i32, color: Rgb) -> Self {
        Self {
            name: name.into(),
            score,
            color,
        }
    }
}

/// Everything the screen needs to draw, shared between the control surface and the renderer
/// through the state store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayState {
    /// Active view.
    pub mode: Mode,
    /// Payload of the message view.
    pub message: String,
    /// At most [`MAX_TEAMS`] teams, in display order.
    pub teams: Vec<Team>,
    /// Main stopwatch.
    pub stopwatch: Clock,
    /// Game clock shown next to the scoreboard.
    pub game_clock: Clock,
    /// Countdown timer.
    pub timer: Countdown,
}

impl DisplayState {
    /// Fresh state with the given message and teams, every clock stopped at zero.
    pub fn with_payload(message: impl Into<String>, teams: Vec<Team>) -> Self {
        let mut teams = teams;
        teams.truncate(MAX_TEAMS);
        Self {
            mode: Mode::Index,
            message: message.into(),
            teams,
            stopwatch: Clock::default(),
            game_clock: Clock::default(),
            timer: Countdown::default(),
        }
    }
}

impl Default for DisplayState {
    fn default() -> Self {
        Self::with_payload(DEFAULT_MESSAGE, default_teams())
    }
}

/// Message shown until the controller sets one.
pub const DEFAULT_MESSAGE: &str = "Nachricht";

/// Teams shown until the controller sends a scoreboard.
pub fn default_teams() -> Vec<Team> {
    vec![
        Team::new("Team 1", 0, Rgb::new(91, 124, 255)),
        Team::new("Team 2", 0, Rgb::new(214, 76, 76)),
    ]
}
