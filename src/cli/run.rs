//! Run command implementation

use super::FeedArgs;
use crate::config::FeedConfig;
use clap::Args;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub feed: FeedArgs,

    /// Seconds between two price reports
    #[arg(long, default_value = "10")]
    pub report_interval: u64,
}

impl RunArgs {
    pub async fn execute(&self, config: &FeedConfig) -> anyhow::Result<()> {
        let cancel = CancellationToken::new();
        let feed = self.feed.build_feed(config, cancel.clone())?;

        let mut ticker = tokio::time::interval(Duration::from_secs(self.report_interval.max(1)));

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutting down price feed");
                    break;
                }
                _ = ticker.tick() => {
                    match feed.get_price() {
                        Some(price) => tracing::info!(price = %price, "Current price"),
                        None => tracing::warn!("No price available"),
                    }
                }
            }
        }

        cancel.cancel();
        Ok(())
    }
}
