//! Price feeds refreshed by polling a source on a fixed interval

use super::slot::PriceSlot;
use super::{FeedError, FeedReading, Price, PriceFeed};
use crate::telemetry::{self, FetchOutcome};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Default interval between two fetches
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// A source polled by [`PolledFeed`]
#[async_trait]
pub trait PriceSource: Send + Sync + 'static {
    /// Human-readable description for logs
    fn describe(&self) -> String;

    /// Fetch one reading.
    ///
    /// `Ok(None)` means the source is gone and the current reading must be
    /// dropped rather than left to expire.
    async fn fetch(&self) -> Result<Option<FeedReading>, FeedError>;

    /// Consecutive failures logged at debug level before warning
    fn warn_after_failures(&self) -> u32 {
        0
    }

    /// Advice logged along with warnings about repeated failures
    fn failure_hint(&self) -> Option<String> {
        None
    }
}

/// Feed backed by a background task polling a [`PriceSource`]
pub struct PolledFeed {
    slot: Arc<PriceSlot>,
}

impl PolledFeed {
    /// Start polling `source` every `interval` until `cancel` fires
    pub fn spawn<S: PriceSource>(
        source: S,
        interval: Duration,
        expiry: Duration,
        cancel: CancellationToken,
    ) -> Self {
        let slot = Arc::new(PriceSlot::new(source.describe(), expiry));

        tracing::info!(
            feed = %slot.label(),
            interval_secs = interval.as_secs_f64(),
            expiry_secs = expiry.as_secs(),
            "Starting polled price feed"
        );

        let task_slot = slot.clone();
        tokio::spawn(async move {
            run_poll_loop(source, task_slot, interval, cancel).await;
        });

        Self { slot }
    }

    /// Latest reading regardless of freshness
    pub fn latest(&self) -> Option<FeedReading> {
        self.slot.latest()
    }
}

impl PriceFeed for PolledFeed {
    fn get_price(&self) -> Option<Price> {
        self.slot.price()
    }
}

/// Poll `source` forever, publishing every reading into `slot`
async fn run_poll_loop<S: PriceSource>(
    source: S,
    slot: Arc<PriceSlot>,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut failures: u32 = 0;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let result = tokio::select! {
            _ = cancel.cancelled() => break,
            result = source.fetch() => result,
        };

        failures = apply_fetch_result(&source, &slot, result, failures);
    }

    tracing::debug!(feed = %slot.label(), "Polled price feed stopped");
}

/// Apply one fetch result to the slot and return the updated failure count
fn apply_fetch_result<S: PriceSource>(
    source: &S,
    slot: &PriceSlot,
    result: Result<Option<FeedReading>, FeedError>,
    failures: u32,
) -> u32 {
    match result {
        Ok(Some(reading)) => {
            telemetry::record_fetch(slot.label(), FetchOutcome::Success);
            slot.publish(reading);
            0
        }
        Ok(None) => {
            telemetry::record_fetch(slot.label(), FetchOutcome::Missing);
            slot.clear();
            0
        }
        Err(e) => {
            telemetry::record_fetch(slot.label(), FetchOutcome::Failure);
            let failures = failures.saturating_add(1);
            if !should_warn(failures, source.warn_after_failures()) {
                tracing::debug!(feed = %slot.label(), error = %e, failures, "Failed to fetch price");
            } else if let Some(hint) = source.failure_hint() {
                tracing::warn!(feed = %slot.label(), error = %e, failures, hint = %hint, "Failed to fetch price");
            } else {
                tracing::warn!(feed = %slot.label(), error = %e, failures, "Failed to fetch price");
            }
            failures
        }
    }
}

/// Whether the failure streak has grown past what a source tolerates quietly
fn should_warn(failures: u32, warn_after: u32) -> bool {
    failures > warn_after
}
