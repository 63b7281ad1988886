use axum::Router;

use crate::state::SharedState;

/// Mutation endpoints.
pub mod control;
/// Swagger UI and the OpenAPI document.
pub mod docs;
/// Health check endpoint.
pub mod health;
/// Display event stream.
pub mod sse;
/// Status polling endpoint.
pub mod status;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    health::router()
        .merge(status::router())
        .merge(sse::router())
        .merge(control::router())
        .merge(docs::router())
        .with_state(state)
}
