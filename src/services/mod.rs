/// Clock, timer, scoreboard and mode mutations.
pub mod control_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Read-only projection of the display state.
pub mod status_service;
