/// JSON file backend.
pub mod file;
/// In-process backend.
pub mod memory;
#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::{
    config::{AppConfig, StoreKind},
    dao::storage::StorageResult,
    state::display::DisplayState,
};

pub use self::{file::FileStateStore, memory::MemoryStateStore};

/// Durable home of the single shared [`DisplayState`].
///
/// `load` returns exactly what the last `save` wrote, or persists and returns the default state when
/// nothing usable is stored. `save` must never let a reader observe a half-written state.
pub trait StateStore: Send + Sync {
    /// Read the stored state, persisting the defaults first when nothing usable is stored.
    fn load(&self) -> BoxFuture<'static, StorageResult<DisplayState>>;
    /// Replace the stored state as a whole.
    fn save(&self, state: DisplayState) -> BoxFuture<'static, StorageResult<()>>;
    /// Check that the backing medium is reachable and writable.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// Build the store selected by the configuration.
pub fn open(config: &AppConfig) -> Arc<dyn StateStore> {
    let defaults = config.default_state();
    match config.store() {
        StoreKind::File => Arc::new(FileStateStore::new(config.state_path(), defaults)),
        StoreKind::Memory => Arc::new(MemoryStateStore::new(defaults)),
    }
}
