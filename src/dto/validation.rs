//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest team name that still fits on a scoreboard card.
pub const MAX_TEAM_NAME_CHARS: usize = 64;

/// Longest message the message view accepts.
pub const MAX_MESSAGE_CHARS: usize = 500;

/// Validates that a message fits the message view and carries no control characters other than
/// line breaks.
///
/// # Examples
///
/// ```ignore
/// validate_message("Gleich geht's los") // Ok
/// validate_message("Zeile 1\nZeile 2")  // Ok - line break
/// validate_message("\u{1b}[2J")         // Err - escape sequence
/// ```
pub fn validate_message(message: &str) -> Result<(), ValidationError> {
    let chars = message.chars().count();
    if chars > MAX_MESSAGE_CHARS {
        let mut err = ValidationError::new("message_length");
        err.message = Some(
            format!("Message must be at most {MAX_MESSAGE_CHARS} characters (got {chars})").into(),
        );
        return Err(err);
    }

    if message.chars().any(|c| c.is_control() && c != '\n') {
        let mut err = ValidationError::new("message_format");
        err.message = Some("Message must not contain control characters other than \\n".into());
        return Err(err);
    }

    Ok(())
}

/// Validates that a team name is not blank and fits on a scoreboard card.
///
/// # Examples
///
/// ```ignore
/// validate_team_name("Team 1")   // Ok
/// validate_team_name("   ")      // Err - blank
/// validate_team_name("Tab\there") // Err - control character
/// ```
pub fn validate_team_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("team_name_blank");
        err.message = Some("Team name must not be blank".into());
        return Err(err);
    }

    let chars = name.chars().count();
    if chars > MAX_TEAM_NAME_CHARS {
        let mut err = ValidationError::new("team_name_length");
        err.message = Some(
            format!("Team name must be at most {MAX_TEAM_NAME_CHARS} characters (got {chars})")
                .into(),
        );
        return Err(err);
    }

    if name.chars().any(char::is_control) {
        let mut err = ValidationError::new("team_name_format");
        err.message = Some("Team name must not contain control characters".into());
        return Err(err);
    }

    Ok(())
}
