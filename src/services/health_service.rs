use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Probe the state store, refresh the degraded flag and report the outcome.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.store().health_check().await {
        Ok(()) => {
            state.update_degraded(false);
        }
        Err(err) => {
            warn!(error = %err, "state store health check failed");
            state.update_degraded(true);
        }
    }

    if state.is_degraded() {
        HealthResponse::degraded()
    } else {
        HealthResponse::ok()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        dao::state_store::testing::FlakyStateStore,
        dto::health::HealthStatus,
        state::{
            AppState,
            time_source::{ManualTimeSource, Timestamp},
        },
    };

    #[tokio::test]
    async fn health_follows_store_reachability() {
        let store = FlakyStateStore::failing();
        let time = ManualTimeSource::new(Timestamp::from_millis(0));
        let state = AppState::new(Arc::new(store.clone()), Arc::new(time));

        assert_eq!(health_status(&state).await.status, HealthStatus::Degraded);
        assert!(state.is_degraded());

        store.set_failing(false);
        assert_eq!(health_status(&state).await.status, HealthStatus::Ok);
        assert!(!state.is_degraded());
    }
}
