//! CLI interface for pricefeed
//!
//! Provides subcommands for:
//! - `run`: Keep a feed running and report its price
//! - `check`: Wait for the first fresh price and print it
//! - `config`: Show the effective configuration

mod check;
mod run;

pub use check::CheckArgs;
pub use run::RunArgs;

use crate::config::{Config, FeedConfig};
use crate::feed::{PriceFeed, PriceFeedFactory};
use clap::{Args, Parser, Subcommand};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(name = "pricefeed")]
#[command(about = "Reference price feeds with staleness tracking")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Keep the price feed running and report its price
    Run(RunArgs),
    /// Wait for the first fresh price and print it
    Check(CheckArgs),
    /// Show the effective configuration
    Config,
}

/// Feed selection overrides shared by subcommands
#[derive(Args, Debug, Clone, Default)]
pub struct FeedArgs {
    /// Source of the price: `gdax-websocket`, `fixed:<price>`, `file:<path>` or a setzer symbol
    #[arg(long)]
    pub price_feed: Option<String>,

    /// Maximum age of the price in seconds
    #[arg(long)]
    pub price_feed_expiry: Option<u64>,
}

impl FeedArgs {
    /// Apply these overrides on top of the configured feed settings
    pub fn apply(&self, config: &FeedConfig) -> FeedConfig {
        let mut config = config.clone();
        if let Some(selector) = &self.price_feed {
            config.price_feed = Some(selector.clone());
        }
        if let Some(expiry) = self.price_feed_expiry {
            config.expiry_secs = expiry;
        }
        config
    }

    /// Build the selected feed
    pub fn build_feed(
        &self,
        config: &FeedConfig,
        cancel: CancellationToken,
    ) -> anyhow::Result<Arc<dyn PriceFeed>> {
        let config = self.apply(config);
        let selector = config.price_feed.clone();
        let factory = PriceFeedFactory::new(config, cancel);
        Ok(factory.create(selector.as_deref(), None, None)?)
    }
}

/// Human-readable summary of the effective configuration
pub fn describe_config(config: &Config) -> String {
    let feed = &config.feed;
    let telemetry = &config.telemetry;

    format!(
        "Current configuration:\n  \
         Price feed: {}\n  \
         Expiry: {}s, poll interval: {}s\n  \
         Stream: {} {} (reconnect {}s, ping {}s)\n  \
         Setzer: {} (warn after {} failures)\n  \
         Telemetry: level={}, format={:?}, metrics_port={}\n",
        feed.price_feed.as_deref().unwrap_or("(none)"),
        feed.expiry_secs,
        feed.poll_interval_secs,
        feed.stream.url,
        feed.stream.product_id,
        feed.stream.reconnect_delay_secs,
        feed.stream.ping_interval_secs,
        feed.setzer.program,
        feed.setzer.warn_after_failures,
        telemetry.log_level,
        telemetry.log_format,
        telemetry
            .metrics_port
            .map(|p| p.to_string())
            .unwrap_or_else(|| "disabled".to_string()),
    )
}
