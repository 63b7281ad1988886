use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::status::StatusResponse, error::AppError, services::status_service, state::SharedState,
};

#[utoipa::path(
    get,
    path = "/status",
    tag = "display",
    responses(
        (status = 200, description = "Display state projected onto the current instant", body = StatusResponse),
        (status = 503, description = "State store unavailable")
    )
)]
/// Poll the display state. Never writes.
pub async fn status(State(state): State<SharedState>) -> Result<Json<StatusResponse>, AppError> {
    Ok(Json(status_service::status(&state).await?))
}

/// Configure the polling route.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/status", get(status))
}
