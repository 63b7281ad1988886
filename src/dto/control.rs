//! Request payloads accepted by the control surface.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::{
    dto::validation::{validate_message, validate_team_name},
    error::ServiceError,
    state::{
        display::{Mode, Rgb, Team},
        mutation::TimerUpdate,
    },
};

/// Drive the countdown timer. At least one field must be present.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct TimerUpdateRequest {
    /// Countdown duration in seconds.
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub duration: Option<f64>,
    /// `true` starts (or keeps running), `false` pauses and keeps the remaining time.
    #[serde(default)]
    pub running: Option<bool>,
}

impl TryFrom<TimerUpdateRequest> for TimerUpdate {
    type Error = ServiceError;

    fn try_from(value: TimerUpdateRequest) -> Result<Self, Self::Error> {
        if value.duration.is_none() && value.running.is_none() {
            return Err(ServiceError::InvalidInput(
                "timer update needs `duration` and/or `running`".into(),
            ));
        }

        let duration = value
            .duration
            .map(|secs| {
                Duration::try_from_secs_f64(secs)
                    .map(round_to_millis)
                    .map_err(|_| {
                        ServiceError::InvalidInput(format!("invalid timer duration `{secs}`"))
                    })
            })
            .transpose()?;

        Ok(TimerUpdate {
            duration,
            running: value.running,
        })
    }
}

fn round_to_millis(duration: Duration) -> Duration {
    let micros = duration.as_micros();
    let millis = (micros + 500) / 1000;
    Duration::from_millis(u64::try_from(millis).unwrap_or(u64::MAX))
}

/// Team entry of a scoreboard update.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamInput {
    /// Name shown on the card; not blank, no control characters.
    pub name: String,
    /// Score shown next to the name.
    #[serde(default)]
    pub score: i32,
    /// Card color as `[r, g, b]`.
    #[schema(value_type = Vec<u8>, example = json!([91, 124, 255]))]
    pub color: [u8; 3],
}

impl Validate for TeamInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_team_name(&self.name) {
            errors.add("name", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl From<TeamInput> for Team {
    fn from(value: TeamInput) -> Self {
        Team::new(value.name, value.score, Rgb::from(value.color))
    }
}

/// Replace the teams (at most two) and switch the screen to the scoreboard.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ScoreboardUpdateRequest {
    /// Teams in display order.
    #[validate(length(max = 2), nested)]
    pub teams: Vec<TeamInput>,
}

/// Switch the active view.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ModeRequest {
    /// View to show.
    pub mode: Mode,
    /// Replaces the message payload when present. At most 500 characters; `\n` is the only
    /// control character allowed.
    #[serde(default)]
    pub message: Option<String>,
}

impl Validate for ModeRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(Err(e)) = self.message.as_deref().map(validate_message) {
            errors.add("message", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
