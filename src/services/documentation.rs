use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the scoreboard backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::status::status,
        crate::routes::sse::display_stream,
        crate::routes::control::toggle_stopwatch,
        crate::routes::control::reset_stopwatch,
        crate::routes::control::toggle_game_clock,
        crate::routes::control::reset_game_clock,
        crate::routes::control::update_timer,
        crate::routes::control::update_scoreboard,
        crate::routes::control::set_mode,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::status::StatusResponse,
            crate::dto::status::ClockStatus,
            crate::dto::status::TimerStatus,
            crate::dto::status::TeamSummary,
            crate::dto::control::TimerUpdateRequest,
            crate::dto::control::ScoreboardUpdateRequest,
            crate::dto::control::TeamInput,
            crate::dto::control::ModeRequest,
            crate::dto::sse::SystemStatus,
            crate::state::display::Mode,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "display", description = "Projected display state for renderers"),
        (name = "control", description = "Mutations issued by the control surface"),
        (name = "sse", description = "Server-sent events streams"),
    )
)]
pub struct ApiDoc;
