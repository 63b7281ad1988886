use crate::{
    dto::status::StatusResponse,
    error::ServiceError,
    state::{SharedState, projection::DisplayView},
};

/// Project the persisted state onto the current instant.
pub async fn current_view(state: &SharedState) -> Result<DisplayView, ServiceError> {
    let (display, now) = state.load().await?;
    Ok(DisplayView::project(&display, now))
}

/// Snapshot served by `GET /status`.
pub async fn status(state: &SharedState) -> Result<StatusResponse, ServiceError> {
    Ok(StatusResponse::from(&current_view(state).await?))
}
