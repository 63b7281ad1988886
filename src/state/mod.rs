/// Stopwatch and countdown arithmetic.
pub mod clock;
/// The shared display state and its parts.
pub mod display;
/// Mutations applied by the control surface.
pub mod mutation;
/// Read-only views of the state at an instant.
pub mod projection;
mod sse;
/// Wall clock abstraction.
pub mod time_source;

use std::{sync::Arc, time::Duration};

use tokio::sync::{Mutex, watch};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::{
    dao::{state_store::StateStore, storage::StorageError},
    error::ServiceError,
    state::{
        display::DisplayState,
        time_source::{TimeSource, Timestamp},
    },
};

pub use self::sse::SseHub;

/// Handle to the [`AppState`] shared by handlers, background tasks and the renderer.
pub type SharedState = Arc<AppState>;
/// Upper bound for one load → transform → save transaction.
pub const DEFAULT_TRANSACTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of a committed transaction.
#[derive(Debug, Clone)]
pub struct Committed<T> {
    /// Value returned by the transformation.
    pub output: T,
    /// State as persisted by the transaction.
    pub state: DisplayState,
    /// Instant the transformation was applied at.
    pub now: Timestamp,
}

/// Central application state shared by every request handler.
///
/// Holds no copy of the display state: the store is the single source of truth and every
/// operation goes back to it.
pub struct AppState {
    store: Arc<dyn StateStore>,
    time: Arc<dyn TimeSource>,
    display_sse: SseHub,
    degraded: watch::Sender<bool>,
    transaction_gate: Mutex<()>,
    transaction_timeout: Option<Duration>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(store: Arc<dyn StateStore>, time: Arc<dyn TimeSource>) -> SharedState {
        Self::with_timeout(store, time, Some(DEFAULT_TRANSACTION_TIMEOUT))
    }

    /// Same as [`AppState::new`] with an explicit transaction timeout (`None` disables it).
    pub fn with_timeout(
        store: Arc<dyn StateStore>,
        time: Arc<dyn TimeSource>,
        transaction_timeout: Option<Duration>,
    ) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(false);
        Arc::new(Self {
            store,
            time,
            display_sse: SseHub::new(16),
            degraded: degraded_tx,
            transaction_gate: Mutex::new(()),
            transaction_timeout,
        })
    }

    /// Handle to the state store.
    pub fn store(&self) -> Arc<dyn StateStore> {
        Arc::clone(&self.store)
    }

    /// Current instant according to the configured time source.
    pub fn now(&self) -> Timestamp {
        self.time.now()
    }

    /// Broadcast hub used for the display SSE stream.
    pub fn display_sse(&self) -> &SseHub {
        &self.display_sse
    }

    /// Whether the last store access failed.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag; returns whether the value changed.
    pub fn update_degraded(&self, value: bool) -> bool {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        })
    }

    /// Load the latest persisted state without modifying it.
    pub async fn load(&self) -> Result<(DisplayState, Timestamp), ServiceError> {
        let loaded = self.track_storage(self.store.load().await)?;
        Ok((loaded, self.now()))
    }

    /// Run one load → transform → save transaction.
    ///
    /// Transactions issued through the same [`AppState`] are serialized by the transaction gate.
    pub async fn run_transaction<F, T>(&self, work: F) -> Result<Committed<T>, ServiceError>
    where
        F: FnOnce(&mut DisplayState, Timestamp) -> T,
    {
        let _gate = self.transaction_gate.lock().await;

        let store = self.store();
        let time = Arc::clone(&self.time);
        let transaction = async move {
            let mut display = store.load().await?;
            let now = time.now();
            let output = work(&mut display, now);
            store.save(display.clone()).await?;
            Ok::<_, StorageError>(Committed {
                output,
                state: display,
                now,
            })
        };

        let outcome = match self.transaction_timeout {
            Some(limit) => match timeout(limit, transaction).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(timeout = ?limit, "state transaction timed out");
                    return Err(ServiceError::Timeout);
                }
            },
            None => transaction.await,
        };

        Ok(self.track_storage(outcome)?)
    }

    /// Record the outcome of a store access. Only the first failure of a streak is a warning.
    fn track_storage<T>(&self, result: Result<T, StorageError>) -> Result<T, StorageError> {
        match &result {
            Ok(_) => {
                self.update_degraded(false);
            }
            Err(err) => {
                if self.update_degraded(true) {
                    warn!(error = %err, "state store access failed");
                } else {
                    debug!(error = %err, "state store still unavailable");
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    use super::*;
    use crate::{
        dao::state_store::{
            memory::MemoryStateStore,
            testing::{FlakyStateStore, StallingStateStore},
        },
        state::{mutation::Mutation, time_source::ManualTimeSource},
    };

    /// Counts warnings emitted while installed.
    struct WarnCounter(Arc<AtomicUsize>);

    impl<S: Subscriber> Layer<S> for WarnCounter {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn setup() -> (SharedState, MemoryStateStore, ManualTimeSource) {
        let store = MemoryStateStore::new(DisplayState::default());
        let time = ManualTimeSource::new(Timestamp::from_millis(1_000));
        let state = AppState::new(Arc::new(store.clone()), Arc::new(time.clone()));
        (state, store, time)
    }

    #[tokio::test]
    async fn transaction_persists_before_returning() {
        let (state, store, _time) = setup();
        let committed = state
            .run_transaction(|display, now| display.apply(Mutation::ToggleStopwatch, now))
            .await
            .unwrap();

        assert_eq!(committed.now, Timestamp::from_millis(1_000));
        let persisted = store.snapshot().await.unwrap();
        assert_eq!(persisted, committed.state);
        assert!(persisted.stopwatch.is_running());
    }

    #[tokio::test]
    async fn each_transaction_starts_from_the_store() {
        let (state, store, time) = setup();
        state
            .run_transaction(|display, now| display.apply(Mutation::ToggleStopwatch, now))
            .await
            .unwrap();

        // Another writer replaces the state behind our back.
        store.save(DisplayState::default()).await.unwrap();
        time.advance(Duration::from_secs(3));

        let committed = state
            .run_transaction(|display, now| display.apply(Mutation::ToggleStopwatch, now))
            .await
            .unwrap();
        assert!(committed.state.stopwatch.is_running());
        assert_eq!(
            committed.state.stopwatch.started_at(),
            Some(Timestamp::from_millis(4_000))
        );
    }

    #[tokio::test]
    async fn load_reports_current_instant() {
        let (state, _store, time) = setup();
        time.set(Timestamp::from_millis(42));
        let (display, now) = state.load().await.unwrap();
        assert_eq!(display, DisplayState::default());
        assert_eq!(now, Timestamp::from_millis(42));
        assert!(!state.is_degraded());
    }

    #[tokio::test]
    async fn failed_access_sets_degraded_and_success_clears_it() {
        let store = FlakyStateStore::failing();
        let time = ManualTimeSource::new(Timestamp::from_millis(0));
        let state = AppState::new(Arc::new(store.clone()), Arc::new(time));
        let mut watcher = state.degraded_watcher();

        let err = state.load().await.unwrap_err();
        assert!(matches!(err, ServiceError::Unavailable(_)));
        assert!(state.is_degraded());
        assert!(watcher.has_changed().unwrap());
        assert!(*watcher.borrow_and_update());

        store.set_failing(false);
        state
            .run_transaction(|display, now| display.apply(Mutation::ToggleStopwatch, now))
            .await
            .unwrap();
        assert!(!state.is_degraded());
        assert!(!*watcher.borrow_and_update());
    }

    #[test]
    fn update_degraded_reports_changes_only() {
        let (state, _store, _time) = setup();
        assert!(!state.update_degraded(false));
        assert!(state.update_degraded(true));
        assert!(!state.update_degraded(true));
        assert!(state.update_degraded(false));
    }

    #[tokio::test]
    async fn repeated_failures_warn_once_per_outage() {
        let warnings = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(WarnCounter(Arc::clone(&warnings)));
        let _guard = tracing::subscriber::set_default(subscriber);

        let store = FlakyStateStore::failing();
        let time = ManualTimeSource::new(Timestamp::from_millis(0));
        let state = AppState::new(Arc::new(store.clone()), Arc::new(time));

        for _ in 0..60 {
            assert!(state.load().await.is_err());
        }
        assert_eq!(warnings.load(Ordering::SeqCst), 1);

        store.set_failing(false);
        state.load().await.unwrap();
        store.set_failing(true);
        for _ in 0..10 {
            assert!(state.load().await.is_err());
        }
        assert_eq!(warnings.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn stalled_store_times_out() {
        let time = ManualTimeSource::new(Timestamp::from_millis(0));
        let state = AppState::with_timeout(
            Arc::new(StallingStateStore),
            Arc::new(time),
            Some(Duration::from_millis(20)),
        );

        let err = state
            .run_transaction(|display, now| display.apply(Mutation::ToggleStopwatch, now))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Timeout));
    }
}
