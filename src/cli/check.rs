//! Check command implementation

use super::FeedArgs;
use crate::config::FeedConfig;
use crate::feed::{Price, PriceFeed};
use clap::Args;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub feed: FeedArgs,

    /// Seconds to wait for a fresh price
    #[arg(long, default_value = "30")]
    pub timeout: u64,
}

impl CheckArgs {
    pub async fn execute(&self, config: &FeedConfig) -> anyhow::Result<()> {
        let cancel = CancellationToken::new();
        let feed = self.feed.build_feed(config, cancel.clone())?;

        let result = wait_for_price(feed.as_ref(), Duration::from_secs(self.timeout)).await;
        cancel.cancel();

        match result {
            Some(price) => {
                println!("{}", price);
                Ok(())
            }
            None => anyhow::bail!("No price available after {}s", self.timeout),
        }
    }
}

/// Poll `feed` until it reports a price or `timeout` elapses
pub async fn wait_for_price(feed: &dyn PriceFeed, timeout: Duration) -> Option<Price> {
    let poll = async {
        loop {
            if let Some(price) = feed.get_price() {
                return price;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    };

    tokio::time::timeout(timeout, poll).await.ok()
}
