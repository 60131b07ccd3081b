//! Selection of the price feed from its configuration token

use super::file::FileSource;
use super::oracle::{BlockchainFeed, OracleClient};
use super::polled::PolledFeed;
use super::scaled::ScaledFeed;
use super::setzer::SetzerSource;
use super::stream::StreamedFeed;
use super::types::parse_price;
use super::{FeedError, FixedPriceFeed, Price, PriceFeed};
use crate::config::FeedConfig;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Selector of the exchange WebSocket ticker
pub const STREAM_SELECTOR: &str = "gdax-websocket";

const FIXED_PREFIX: &str = "fixed:";
const FILE_PREFIX: &str = "file:";

/// Concrete source a selector resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    /// Exchange WebSocket ticker
    Stream,
    /// Constant price
    Fixed(Price),
    /// JSON price file
    File(PathBuf),
    /// Symbol looked up with setzer
    Setzer(String),
    /// On-chain oracle
    Oracle,
}

impl FeedSource {
    /// Resolve a selector token.
    ///
    /// Without a selector the oracle is used if one is available; otherwise
    /// there is nothing to read prices from.
    pub fn resolve(selector: Option<&str>, has_oracle: bool) -> Result<Self, FeedError> {
        let Some(selector) = selector.map(str::trim) else {
            return if has_oracle {
                Ok(FeedSource::Oracle)
            } else {
                Err(FeedError::Config(
                    "no price feed specified and no oracle available to default to".to_string(),
                ))
            };
        };

        if selector.is_empty() {
            return Err(FeedError::Config("empty price feed selector".to_string()));
        }

        if selector.eq_ignore_ascii_case(STREAM_SELECTOR) {
            return Ok(FeedSource::Stream);
        }

        if let Some(value) = selector.strip_prefix(FIXED_PREFIX) {
            let price = parse_price(value)
                .map_err(|e| FeedError::Config(format!("invalid fixed price: {}", e)))?;
            return Ok(FeedSource::Fixed(price));
        }

        if let Some(path) = selector.strip_prefix(FILE_PREFIX) {
            if path.is_empty() {
                return Err(FeedError::Config("empty price file path".to_string()));
            }
            return Ok(FeedSource::File(PathBuf::from(path)));
        }

        Ok(FeedSource::Setzer(selector.to_string()))
    }
}

impl fmt::Display for FeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedSource::Stream => write!(f, "{}", STREAM_SELECTOR),
            FeedSource::Fixed(price) => write!(f, "{}{}", FIXED_PREFIX, price),
            FeedSource::File(path) => write!(f, "{}{}", FILE_PREFIX, path.display()),
            FeedSource::Setzer(symbol) => write!(f, "setzer:{}", symbol),
            FeedSource::Oracle => write!(f, "oracle"),
        }
    }
}

/// Builds price feeds from configuration
pub struct PriceFeedFactory {
    config: FeedConfig,
    cancel: CancellationToken,
}

impl PriceFeedFactory {
    /// Create a factory; background tasks of built feeds stop when `cancel` fires
    pub fn new(config: FeedConfig, cancel: CancellationToken) -> Self {
        Self { config, cancel }
    }

    /// Build the feed selected by `selector`.
    ///
    /// The selector is resolved before anything is started, so configuration
    /// errors never leave background tasks behind. When `scale` is given the
    /// selected feed is divided by it.
    pub fn create(
        &self,
        selector: Option<&str>,
        oracle: Option<Arc<dyn OracleClient>>,
        scale: Option<Arc<dyn PriceFeed>>,
    ) -> Result<Arc<dyn PriceFeed>, FeedError> {
        let source = FeedSource::resolve(selector, oracle.is_some())?;
        tracing::info!(source = %source, expiry_secs = self.config.expiry_secs, "Creating price feed");

        let feed = self.build(source, oracle)?;

        Ok(match scale {
            Some(scale) => Arc::new(ScaledFeed::new(feed, scale)),
            None => feed,
        })
    }

    fn build(
        &self,
        source: FeedSource,
        oracle: Option<Arc<dyn OracleClient>>,
    ) -> Result<Arc<dyn PriceFeed>, FeedError> {
        let feed: Arc<dyn PriceFeed> = match source {
            FeedSource::Stream => Arc::new(StreamedFeed::spawn(
                self.config.stream_config(),
                self.cancel.clone(),
            )),
            FeedSource::Fixed(price) => Arc::new(FixedPriceFeed::new(price)),
            FeedSource::File(path) => Arc::new(PolledFeed::spawn(
                FileSource::new(path),
                self.config.poll_interval(),
                self.config.expiry(),
                self.cancel.clone(),
            )),
            FeedSource::Setzer(symbol) => Arc::new(PolledFeed::spawn(
                SetzerSource::new(symbol)
                    .program(&self.config.setzer.program)
                    .warn_after(self.config.setzer.warn_after_failures),
                self.config.poll_interval(),
                self.config.expiry(),
                self.cancel.clone(),
            )),
            FeedSource::Oracle => {
                let oracle = oracle.ok_or_else(|| {
                    FeedError::Config("oracle selected but not available".to_string())
                })?;
                Arc::new(BlockchainFeed::new(oracle))
            }
        };

        Ok(feed)
    }
}
