//! Staleness tracking for feed readings

use crate::telemetry;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Whether a reading may still be reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale,
}

/// A flip of the availability state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Stale (or never observed) to fresh
    BecameAvailable,
    /// Fresh to stale
    Expired,
}

/// Decides whether a reading is too old and logs each availability flip once.
///
/// The tracker holds no reading of its own, only the expiry duration and
/// whether the last decision was "expired". It starts out expired since
/// nothing has been observed yet.
#[derive(Debug)]
pub struct ExpiryTracker {
    label: String,
    expiry: Duration,
    expired: AtomicBool,
}

impl ExpiryTracker {
    /// Create a tracker for the feed described by `label`
    pub fn new(label: impl Into<String>, expiry: Duration) -> Self {
        Self {
            label: label.into(),
            expiry,
            expired: AtomicBool::new(true),
        }
    }

    /// Feed label used in log events
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Maximum age of a reading
    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    /// Whether the last decision was "stale"
    pub fn is_expired(&self) -> bool {
        self.expired.load(Ordering::Acquire)
    }

    /// Freshness of a reading observed at `observed_at`, judged at `now`.
    ///
    /// `None` means nothing was ever observed and is always stale. A reading
    /// stamped after `now` counts as fresh.
    pub fn freshness(
        observed_at: Option<DateTime<Utc>>,
        expiry: Duration,
        now: DateTime<Utc>,
    ) -> Freshness {
        let Some(observed_at) = observed_at else {
            return Freshness::Stale;
        };

        match now.signed_duration_since(observed_at).to_std() {
            Ok(age) if age > expiry => Freshness::Stale,
            _ => Freshness::Fresh,
        }
    }

    /// Judge freshness at `now` and record the result
    pub fn check(&self, observed_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Freshness {
        let freshness = Self::freshness(observed_at, self.expiry, now);
        self.record(freshness);
        freshness
    }

    /// Record a freshness decision, returning the transition if the state flipped
    pub fn record(&self, freshness: Freshness) -> Option<Transition> {
        let stale = freshness == Freshness::Stale;
        if self.expired.swap(stale, Ordering::AcqRel) == stale {
            return None;
        }

        telemetry::set_available(&self.label, !stale);

        if stale {
            tracing::warn!(feed = %self.label, "Price feed has expired");
            Some(Transition::Expired)
        } else {
            tracing::info!(feed = %self.label, "Price feed became available");
            Some(Transition::BecameAvailable)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    const EXPIRY: Duration = Duration::from_secs(120);

    #[test]
    fn test_never_observed_is_stale() {
        let now = Utc::now();
        assert_eq!(
            ExpiryTracker::freshness(None, EXPIRY, now),
            Freshness::Stale
        );
        assert_eq!(
            ExpiryTracker::freshness(None, Duration::MAX, now),
            Freshness::Stale
        );
    }

    #[test]
    fn test_fresh_within_expiry() {
        let now = Utc::now();
        let observed = now - TimeDelta::seconds(60);
        assert_eq!(
            ExpiryTracker::freshness(Some(observed), EXPIRY, now),
            Freshness::Fresh
        );
    }

    #[test]
    fn test_boundary_is_fresh() {
        let now = Utc::now();
        let observed = now - TimeDelta::seconds(120);
        assert_eq!(
            ExpiryTracker::freshness(Some(observed), EXPIRY, now),
            Freshness::Fresh
        );
    }

    #[test]
    fn test_stale_past_expiry() {
        let now = Utc::now();
        let observed = now - TimeDelta::milliseconds(120_001);
        assert_eq!(
            ExpiryTracker::freshness(Some(observed), EXPIRY, now),
            Freshness::Stale
        );
    }

    #[test]
    fn test_future_observation_is_fresh() {
        let now = Utc::now();
        let observed = now + TimeDelta::seconds(30);
        assert_eq!(
            ExpiryTracker::freshness(Some(observed), EXPIRY, now),
            Freshness::Fresh
        );
    }

    #[test]
    fn test_starts_expired() {
        let tracker = ExpiryTracker::new("test", EXPIRY);
        assert!(tracker.is_expired());
        assert_eq!(tracker.label(), "test");
        assert_eq!(tracker.expiry(), EXPIRY);
    }

    #[test]
    fn test_transitions_fire_once() {
        let tracker = ExpiryTracker::new("test", EXPIRY);

        assert_eq!(tracker.record(Freshness::Stale), None);
        assert_eq!(
            tracker.record(Freshness::Fresh),
            Some(Transition::BecameAvailable)
        );
        assert_eq!(tracker.record(Freshness::Fresh), None);
        assert_eq!(tracker.record(Freshness::Fresh), None);
        assert_eq!(tracker.record(Freshness::Stale), Some(Transition::Expired));
        assert_eq!(tracker.record(Freshness::Stale), None);
        assert_eq!(
            tracker.record(Freshness::Fresh),
            Some(Transition::BecameAvailable)
        );
    }

    #[test]
    fn test_check_updates_state() {
        let tracker = ExpiryTracker::new("test", EXPIRY);
        let now = Utc::now();

        assert_eq!(tracker.check(Some(now), now), Freshness::Fresh);
        assert!(!tracker.is_expired());

        let later = now + TimeDelta::seconds(121);
        assert_eq!(tracker.check(Some(now), later), Freshness::Stale);
        assert!(tracker.is_expired());
    }

    #[test]
    fn test_concurrent_records_flip_once() {
        use std::sync::Arc;

        let tracker = Arc::new(ExpiryTracker::new("test", EXPIRY));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tracker = tracker.clone();
                std::thread::spawn(move || tracker.record(Freshness::Fresh).is_some())
            })
            .collect();

        let flips = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|flipped| *flipped)
            .count();
        assert_eq!(flips, 1);
    }
}
