/// Persisted document layout and its conversions.
pub mod models;
/// Display state storage backends.
pub mod state_store;
/// Storage error types shared by every backend.
pub mod storage;
