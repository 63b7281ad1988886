use serde::Serialize;
use utoipa::ToSchema;

/// Reachability of the state store as last observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// The last store access succeeded.
    Ok,
    /// The last store access failed; mutations and polls answer `503`.
    Degraded,
}

/// Health payload returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Store reachability after this check.
    pub status: HealthStatus,
}

impl HealthResponse {
    /// The state store is reachable.
    pub fn ok() -> Self {
        Self {
            status: HealthStatus::Ok,
        }
    }

    /// The state store could not be reached.
    pub fn degraded() -> Self {
        Self {
            status: HealthStatus::Degraded,
        }
    }
}
