//! Store doubles for exercising storage failures and stalls.

use std::{
    io::{self, ErrorKind},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use futures::future::{self, BoxFuture};

use crate::{
    dao::{
        state_store::{MemoryStateStore, StateStore},
        storage::{StorageError, StorageResult},
    },
    state::display::DisplayState,
};

/// Memory store that can be switched into failing every call.
#[derive(Clone)]
pub(crate) struct FlakyStateStore {
    inner: MemoryStateStore,
    failing: Arc<AtomicBool>,
}

impl FlakyStateStore {
    pub(crate) fn failing() -> Self {
        let store = Self {
            inner: MemoryStateStore::new(DisplayState::default()),
            failing: Arc::new(AtomicBool::new(false)),
        };
        store.set_failing(true);
        store
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> StorageResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::unavailable(
                "disk unplugged".into(),
                io::Error::from(ErrorKind::NotConnected),
            ));
        }
        Ok(())
    }
}

impl StateStore for FlakyStateStore {
    fn load(&self) -> BoxFuture<'static, StorageResult<DisplayState>> {
        match self.check() {
            Ok(()) => self.inner.load(),
            Err(err) => Box::pin(future::ready(Err(err))),
        }
    }

    fn save(&self, state: DisplayState) -> BoxFuture<'static, StorageResult<()>> {
        match self.check() {
            Ok(()) => self.inner.save(state),
            Err(err) => Box::pin(future::ready(Err(err))),
        }
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(future::ready(self.check()))
    }
}

/// Store whose calls never complete.
pub(crate) struct StallingStateStore;

impl StateStore for StallingStateStore {
    fn load(&self) -> BoxFuture<'static, StorageResult<DisplayState>> {
        Box::pin(future::pending())
    }

    fn save(&self, _state: DisplayState) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(future::pending())
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(future::pending())
    }
}
