use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use validator::Validate;

use crate::{
    dto::{
        control::{ModeRequest, ScoreboardUpdateRequest, TimerUpdateRequest},
        status::ClockStatus,
    },
    error::AppError,
    services::control_service,
    state::SharedState,
};

/// Mutation endpoints driven by the control surface.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/control/stopwatch/toggle", post(toggle_stopwatch))
        .route("/control/stopwatch/reset", post(reset_stopwatch))
        .route("/control/game-clock/toggle", post(toggle_game_clock))
        .route("/control/game-clock/reset", post(reset_game_clock))
        .route("/control/timer", post(update_timer))
        .route("/control/scoreboard", post(update_scoreboard))
        .route("/control/mode", post(set_mode))
}

/// Start the stopwatch when stopped, stop it when running.
#[utoipa::path(
    post,
    path = "/control/stopwatch/toggle",
    tag = "control",
    responses(
        (status = 200, description = "Stopwatch after the toggle", body = ClockStatus),
        (status = 503, description = "State store unavailable")
    )
)]
pub async fn toggle_stopwatch(
    State(state): State<SharedState>,
) -> Result<Json<ClockStatus>, AppError> {
    Ok(Json(control_service::toggle_stopwatch(&state).await?))
}

/// Zero and stop the stopwatch.
#[utoipa::path(
    post,
    path = "/control/stopwatch/reset",
    tag = "control",
    responses(
        (status = 200, description = "Stopwatch after the reset", body = ClockStatus),
        (status = 503, description = "State store unavailable")
    )
)]
pub async fn reset_stopwatch(
    State(state): State<SharedState>,
) -> Result<Json<ClockStatus>, AppError> {
    Ok(Json(control_service::reset_stopwatch(&state).await?))
}

/// Start the game clock when stopped, stop it when running.
#[utoipa::path(
    post,
    path = "/control/game-clock/toggle",
    tag = "control",
    responses(
        (status = 204, description = "Game clock toggled"),
        (status = 503, description = "State store unavailable")
    )
)]
pub async fn toggle_game_clock(State(state): State<SharedState>) -> Result<StatusCode, AppError> {
    control_service::toggle_game_clock(&state).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Zero and stop the game clock.
#[utoipa::path(
    post,
    path = "/control/game-clock/reset",
    tag = "control",
    responses(
        (status = 204, description = "Game clock reset"),
        (status = 503, description = "State store unavailable")
    )
)]
pub async fn reset_game_clock(State(state): State<SharedState>) -> Result<StatusCode, AppError> {
    control_service::reset_game_clock(&state).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Set the countdown duration and/or start or pause it.
#[utoipa::path(
    post,
    path = "/control/timer",
    tag = "control",
    request_body = TimerUpdateRequest,
    responses(
        (status = 204, description = "Timer updated"),
        (status = 400, description = "Neither `duration` nor `running` given, or negative duration"),
        (status = 503, description = "State store unavailable")
    )
)]
pub async fn update_timer(
    State(state): State<SharedState>,
    Json(payload): Json<TimerUpdateRequest>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;
    control_service::update_timer(&state, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Replace the teams and switch the screen to the scoreboard.
#[utoipa::path(
    post,
    path = "/control/scoreboard",
    tag = "control",
    request_body = ScoreboardUpdateRequest,
    responses(
        (status = 204, description = "Scoreboard updated"),
        (status = 400, description = "More than two teams or invalid team name"),
        (status = 503, description = "State store unavailable")
    )
)]
pub async fn update_scoreboard(
    State(state): State<SharedState>,
    Json(payload): Json<ScoreboardUpdateRequest>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;
    control_service::update_scoreboard(&state, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Switch the active view, optionally replacing the message.
#[utoipa::path(
    post,
    path = "/control/mode",
    tag = "control",
    request_body = ModeRequest,
    responses(
        (status = 204, description = "Mode changed"),
        (status = 400, description = "Message too long or contains control characters"),
        (status = 503, description = "State store unavailable")
    )
)]
pub async fn set_mode(
    State(state): State<SharedState>,
    Json(payload): Json<ModeRequest>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;
    control_service::set_mode(&state, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}
