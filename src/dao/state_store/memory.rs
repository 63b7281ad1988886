//! In-process backend for tests and for running the screen loop inside the server.

use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::RwLock;

use crate::{
    dao::{state_store::StateStore, storage::StorageResult},
    state::display::DisplayState,
};

/// Keeps the display state behind a lock; clones share the same slot.
#[derive(Clone)]
pub struct MemoryStateStore {
    slot: Arc<RwLock<Option<DisplayState>>>,
    defaults: Arc<DisplayState>,
}

impl MemoryStateStore {
    /// Create an empty store that initializes itself with `defaults` on first load.
    pub fn new(defaults: DisplayState) -> Self {
        Self {
            slot: Arc::new(RwLock::new(None)),
            defaults: Arc::new(defaults),
        }
    }

    /// Stored state without initializing defaults.
    pub async fn snapshot(&self) -> Option<DisplayState> {
        self.slot.read().await.clone()
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> BoxFuture<'static, StorageResult<DisplayState>> {
        let slot = Arc::clone(&self.slot);
        let defaults = Arc::clone(&self.defaults);
        Box::pin(async move {
            let mut guard = slot.write().await;
            let state = guard.get_or_insert_with(|| DisplayState::clone(&defaults));
            Ok(state.clone())
        })
    }

    fn save(&self, state: DisplayState) -> BoxFuture<'static, StorageResult<()>> {
        let slot = Arc::clone(&self.slot);
        Box::pin(async move {
            *slot.write().await = Some(state);
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::display::Mode;

    #[tokio::test]
    async fn first_load_persists_defaults() {
        let store = MemoryStateStore::new(DisplayState::default());
        assert!(store.snapshot().await.is_none());

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, DisplayState::default());
        assert_eq!(store.snapshot().await, Some(loaded));
    }

    #[tokio::test]
    async fn clones_share_the_slot() {
        let store = MemoryStateStore::new(DisplayState::default());
        let mut state = DisplayState::default();
        state.mode = Mode::Timer;
        store.clone().save(state.clone()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), state);
    }
}
