use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::state::time_source::Timestamp;

/// Control request bodies.
pub mod control;
/// Health check payloads.
pub mod health;
/// Server-sent event payloads.
pub mod sse;
/// Status and display snapshots.
pub mod status;
/// Field validators shared by request bodies.
pub mod validation;

fn format_timestamp(timestamp: Timestamp) -> String {
    OffsetDateTime::from(timestamp.to_system_time())
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
