//! Latest-reading slot shared between a feed's background task and its readers

use super::expiry::{ExpiryTracker, Freshness};
use super::types::{FeedReading, Price};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::time::Duration;

/// Single-writer, many-reader cell holding the latest reading.
///
/// Price and timestamp are always replaced together under one lock, and the
/// lock is never held across I/O.
#[derive(Debug)]
pub struct PriceSlot {
    reading: RwLock<Option<FeedReading>>,
    tracker: ExpiryTracker,
}

impl PriceSlot {
    /// Create an empty slot
    pub fn new(label: impl Into<String>, expiry: Duration) -> Self {
        Self {
            reading: RwLock::new(None),
            tracker: ExpiryTracker::new(label, expiry),
        }
    }

    /// Feed label
    pub fn label(&self) -> &str {
        self.tracker.label()
    }

    /// Expiry tracker of this slot
    pub fn tracker(&self) -> &ExpiryTracker {
        &self.tracker
    }

    /// Replace the reading, returning the previous one
    pub fn publish(&self, reading: FeedReading) -> Option<FeedReading> {
        let previous = {
            let mut guard = self.reading.write();
            let previous = guard.replace(reading);
            self.tracker.check(Some(reading.observed_at), Utc::now());
            previous
        };
        tracing::debug!(
            feed = %self.label(),
            price = %reading.price,
            observed_at = %reading.observed_at,
            "Price feed updated"
        );
        previous
    }

    /// Refresh the timestamp of the current reading without changing its price.
    ///
    /// Does nothing if no price was ever published. Timestamps never move
    /// backwards. Returns whether a reading was refreshed.
    pub fn touch(&self, now: DateTime<Utc>) -> bool {
        let mut guard = self.reading.write();
        match guard.as_mut() {
            Some(reading) => {
                if now > reading.observed_at {
                    reading.observed_at = now;
                }
                true
            }
            None => false,
        }
    }

    /// Drop the current reading
    pub fn clear(&self) {
        if self.reading.write().take().is_some() {
            tracing::debug!(feed = %self.label(), "Price feed reading cleared");
        }
    }

    /// Latest reading regardless of freshness
    pub fn latest(&self) -> Option<FeedReading> {
        *self.reading.read()
    }

    /// Price if the latest reading is fresh at `now`.
    ///
    /// The decision is recorded while the reading is still held, so it can
    /// never be applied after a newer reading was published.
    pub fn price_at(&self, now: DateTime<Utc>) -> Option<Price> {
        let guard = self.reading.read();
        let reading = *guard;
        match self.tracker.check(reading.map(|r| r.observed_at), now) {
            Freshness::Fresh => reading.map(|r| r.price),
            Freshness::Stale => None,
        }
    }

    /// Price if the latest reading is fresh now
    pub fn price(&self) -> Option<Price> {
        self.price_at(Utc::now())
    }
}
