use std::convert::Infallible;

use axum::{Router, extract::State, response::sse::Sse, routing::get};
use futures::Stream;

use crate::{error::AppError, services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/sse/display",
    tag = "sse",
    responses(
        (status = 200, description = "Display SSE stream, starting with a `display.updated` snapshot", content_type = "text/event-stream", body = String),
        (status = 503, description = "State store unavailable")
    )
)]
/// Stream a fresh projection to renderers whenever the display state changes.
pub async fn display_stream(
    State(state): State<SharedState>,
) -> Result<Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>>, AppError> {
    let (initial, receiver) = sse_service::subscribe_display(&state).await?;
    Ok(sse_service::to_sse_stream(initial, receiver))
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/display", get(display_stream))
}
