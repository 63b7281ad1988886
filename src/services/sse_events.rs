use serde::Serialize;
use tracing::{info, warn};

use crate::{
    dto::{
        sse::{ServerEvent, SystemStatus},
        status::StatusResponse,
    },
    state::{SharedState, projection::DisplayView},
};

pub(crate) const EVENT_DISPLAY_UPDATED: &str = "display.updated";
const EVENT_SYSTEM_STATUS: &str = "system.status";

/// Push the projection of a freshly committed state to display subscribers.
pub fn broadcast_display_updated(state: &SharedState, view: &DisplayView) {
    send_display_event(state, EVENT_DISPLAY_UPDATED, &StatusResponse::from(view));
}

/// Announce that the store became unreachable or recovered.
pub fn broadcast_system_status(state: &SharedState, degraded: bool) {
    send_display_event(state, EVENT_SYSTEM_STATUS, &SystemStatus { degraded });
}

/// Relay degraded-mode transitions to display subscribers until the state is dropped.
pub async fn forward_degraded_changes(state: SharedState) {
    let mut watcher = state.degraded_watcher();
    while watcher.changed().await.is_ok() {
        let degraded = *watcher.borrow_and_update();
        if degraded {
            warn!("state store unreachable; entering degraded mode");
        } else {
            info!("state store reachable again; leaving degraded mode");
        }
        broadcast_system_status(&state, degraded);
    }
}

fn send_display_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.display_sse().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize display SSE payload"),
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use serde_json::Value;
    use tokio::time::timeout;

    use super::*;
    use crate::{
        dao::state_store::MemoryStateStore,
        state::{
            AppState,
            display::DisplayState,
            time_source::{ManualTimeSource, Timestamp},
        },
    };

    #[tokio::test]
    async fn degraded_transitions_reach_display_subscribers() {
        let store = MemoryStateStore::new(DisplayState::default());
        let time = ManualTimeSource::new(Timestamp::from_millis(0));
        let state = AppState::new(Arc::new(store), Arc::new(time));
        let mut receiver = state.display_sse().subscribe();
        let forwarder = tokio::spawn(forward_degraded_changes(Arc::clone(&state)));
        // Let the forwarder subscribe before the first flip.
        tokio::task::yield_now().await;

        for expected in [true, false] {
            assert!(state.update_degraded(expected));
            let event = timeout(Duration::from_secs(1), receiver.recv())
                .await
                .unwrap()
                .unwrap();
            assert_eq!(event.event.as_deref(), Some(EVENT_SYSTEM_STATUS));
            let data: Value = serde_json::from_str(&event.data).unwrap();
            assert_eq!(data["degraded"], expected);
        }

        forwarder.abort();
    }
}
