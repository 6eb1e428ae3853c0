//! Abstraction over the system clock so that durations and timestamps are
//! deterministic under test.
#![deny(rustdoc::broken_intra_doc_links, rustdoc::bare_urls, rust_2018_idioms)]
#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    clippy::explicit_iter_loop,
    clippy::use_self,
    clippy::clone_on_ref_ptr
)]

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::RwLock;
use std::{fmt::Debug, ops::Add, sync::Arc, time::Duration};

/// A UTC instant with nanosecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Time(DateTime<Utc>);

impl Time {
    /// Construct from nanoseconds since the UNIX epoch.
    pub fn from_timestamp_nanos(nanos: i64) -> Self {
        Self(Utc.timestamp_nanos(nanos))
    }

    /// Construct from an already-built [`DateTime`].
    pub fn from_date_time(t: DateTime<Utc>) -> Self {
        Self(t)
    }

    /// Nanoseconds since the UNIX epoch.
    pub fn timestamp_nanos(&self) -> i64 {
        self.0.timestamp_nanos()
    }

    /// The underlying [`DateTime`].
    pub fn date_time(&self) -> DateTime<Utc> {
        self.0
    }

    /// RFC 3339 rendering, as used in event payloads and logs.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }

    /// Elapsed wall-clock time since `earlier`, or `None` if `earlier` is in
    /// the future.
    pub fn checked_duration_since(&self, earlier: Self) -> Option<Duration> {
        (self.0 - earlier.0).to_std().ok()
    }

    /// Add `duration`, returning `None` on overflow.
    pub fn checked_add(&self, duration: Duration) -> Option<Self> {
        let duration = chrono::Duration::from_std(duration).ok()?;
        self.0.checked_add_signed(duration).map(Self)
    }
}

impl Add<Duration> for Time {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        self.checked_add(rhs).expect("timestamp overflow")
    }
}

/// Source of the current time.
pub trait TimeProvider: Debug + Send + Sync + 'static {
    /// Returns the current [`Time`].
    fn now(&self) -> Time;
}

/// [`TimeProvider`] backed by the real system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProvider;

impl SystemProvider {
    /// Create a new system clock provider.
    pub fn new() -> Self {
        Self
    }
}

impl TimeProvider for SystemProvider {
    fn now(&self) -> Time {
        Time(Utc::now())
    }
}

/// A [`TimeProvider`] that returns a manually-controlled instant.
#[derive(Debug)]
pub struct MockProvider {
    now: RwLock<Time>,
}

impl MockProvider {
    /// Create a provider frozen at `start`.
    pub fn new(start: Time) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    /// Replace the current instant.
    pub fn set(&self, time: Time) {
        *self.now.write() = time
    }

    /// Advance the clock by `duration`, returning the new instant.
    pub fn inc(&self, duration: Duration) -> Time {
        let mut now = self.now.write();
        *now = *now + duration;
        *now
    }
}

impl TimeProvider for MockProvider {
    fn now(&self) -> Time {
        *self.now.read()
    }
}

impl<T: TimeProvider + ?Sized> TimeProvider for Arc<T> {
    fn now(&self) -> Time {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_provider_is_monotonic_enough() {
        let provider = SystemProvider::new();
        let a = provider.now();
        let b = provider.now();
        assert!(b >= a);
    }

    #[test]
    fn mock_provider_set_and_inc() {
        let provider = MockProvider::new(Time::from_timestamp_nanos(0));
        assert_eq!(provider.now(), Time::from_timestamp_nanos(0));

        provider.set(Time::from_timestamp_nanos(1_000));
        assert_eq!(provider.now().timestamp_nanos(), 1_000);

        let t = provider.inc(Duration::from_nanos(500));
        assert_eq!(t.timestamp_nanos(), 1_500);
        assert_eq!(provider.now().timestamp_nanos(), 1_500);
    }

    #[test]
    fn duration_since() {
        let a = Time::from_timestamp_nanos(10_000_000);
        let b = a + Duration::from_secs(2);
        assert_eq!(b.checked_duration_since(a), Some(Duration::from_secs(2)));
        assert_eq!(a.checked_duration_since(b), None);
    }

    #[test]
    fn rfc3339_round_trip() {
        let t = Time::from_timestamp_nanos(0);
        assert_eq!(t.to_rfc3339(), "1970-01-01T00:00:00+00:00");
    }
}
