//! Absolute instants and the sources that produce them.
//!
//! Every clock operation receives `now` explicitly; this module is the only place that reads the
//! wall clock.

use std::{
    sync::{
        Arc,
        atomic::{AtomicI64, Ordering},
    },
    time::{Duration, SystemTime, UNIX_EPOCH},
};

/// Absolute instant expressed as signed milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    /// The Unix epoch itself.
    pub const EPOCH: Timestamp = Timestamp(0);

    /// Build an instant from milliseconds since the Unix epoch.
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Milliseconds since the Unix epoch.
    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// Build an instant from fractional seconds since the Unix epoch, rounded to the millisecond.
    ///
    /// Returns `None` for non-finite input.
    pub fn from_secs_f64(secs: f64) -> Option<Self> {
        if !secs.is_finite() {
            return None;
        }
        Some(Self((secs * 1000.0).round() as i64))
    }

    /// Fractional seconds since the Unix epoch.
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// Time elapsed between `earlier` and `self`, clamped to zero when `earlier` lies in the future.
    pub fn saturating_since(self, earlier: Timestamp) -> Duration {
        let delta = self.0.saturating_sub(earlier.0);
        Duration::from_millis(u64::try_from(delta).unwrap_or(0))
    }

    /// Instant `duration` after `self`, saturating at the representable range.
    pub fn saturating_add(self, duration: Duration) -> Self {
        let millis = i64::try_from(duration.as_millis()).unwrap_or(i64::MAX);
        Self(self.0.saturating_add(millis))
    }

    /// Convert to a [`SystemTime`], used when formatting for humans.
    pub fn to_system_time(self) -> SystemTime {
        match u64::try_from(self.0) {
            Ok(millis) => UNIX_EPOCH + Duration::from_millis(millis),
            Err(_) => UNIX_EPOCH - Duration::from_millis(self.0.unsigned_abs()),
        }
    }
}

impl From<SystemTime> for Timestamp {
    fn from(value: SystemTime) -> Self {
        match value.duration_since(UNIX_EPOCH) {
            Ok(after) => Self(i64::try_from(after.as_millis()).unwrap_or(i64::MAX)),
            Err(before) => Self(-i64::try_from(before.duration().as_millis()).unwrap_or(i64::MAX)),
        }
    }
}

/// Source of the current instant.
pub trait TimeSource: Send + Sync {
    /// Current instant.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time source backed by [`SystemTime::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        SystemTime::now().into()
    }
}

/// Deterministic time source moved by hand, shared between clones.
#[derive(Debug, Clone, Default)]
pub struct ManualTimeSource {
    current: Arc<AtomicI64>,
}

impl ManualTimeSource {
    /// Create a source frozen at `start`.
    pub fn new(start: Timestamp) -> Self {
        Self {
            current: Arc::new(AtomicI64::new(start.as_millis())),
        }
    }

    /// Jump to an absolute instant (may move backwards).
    pub fn set(&self, instant: Timestamp) {
        self.current.store(instant.as_millis(), Ordering::SeqCst);
    }

    /// Move forward by `duration` and return the new instant.
    pub fn advance(&self, duration: Duration) -> Timestamp {
        let next = self.now().saturating_add(duration);
        self.set(next);
        next
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.current.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturating_since_clamps_backwards_intervals() {
        let later = Timestamp::from_millis(5_000);
        let earlier = Timestamp::from_millis(2_000);
        assert_eq!(later.saturating_since(earlier), Duration::from_millis(3_000));
        assert_eq!(earlier.saturating_since(later), Duration::ZERO);
    }

    #[test]
    fn fractional_seconds_round_to_millis() {
        let ts = Timestamp::from_secs_f64(1_700_000_000.1234).unwrap();
        assert_eq!(ts.as_millis(), 1_700_000_000_123);
        assert_eq!(Timestamp::from_secs_f64(ts.as_secs_f64()), Some(ts));
        assert!(Timestamp::from_secs_f64(f64::NAN).is_none());
    }

    #[test]
    fn system_time_conversion_round_trips() {
        let ts = Timestamp::from_millis(1_234_567);
        assert_eq!(Timestamp::from(ts.to_system_time()), ts);
    }

    #[test]
    fn manual_source_is_shared_between_clones() {
        let source = ManualTimeSource::new(Timestamp::EPOCH);
        let other = source.clone();
        source.advance(Duration::from_millis(250));
        assert_eq!(other.now(), Timestamp::from_millis(250));
        other.set(Timestamp::from_millis(100));
        assert_eq!(source.now(), Timestamp::from_millis(100));
    }
}
