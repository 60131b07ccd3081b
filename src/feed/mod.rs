//! Price feed module
//!
//! Every provider implements [`PriceFeed`], a non-blocking accessor that
//! returns the latest price or `None` when no fresh price is available.
//! Polled and streamed providers refresh a shared [`PriceSlot`] from a
//! background task; the fixed and oracle providers have no background state.

mod expiry;
mod factory;
mod file;
mod fixed;
mod oracle;
mod polled;
mod rest;
mod scaled;
mod setzer;
mod slot;
mod stream;
mod types;

pub use expiry::{ExpiryTracker, Freshness, Transition};
pub use factory::{FeedSource, PriceFeedFactory, STREAM_SELECTOR};
pub use file::FileSource;
pub use fixed::FixedPriceFeed;
pub use oracle::{from_fixed_point, BlockchainFeed, OracleClient, RAY_DECIMALS, WAD_DECIMALS};
pub use polled::{PolledFeed, PriceSource, DEFAULT_POLL_INTERVAL};
pub use rest::{BiboxClient, RestTickerSource, Ticker, TickerClient, BIBOX_API_URL};
pub use scaled::ScaledFeed;
pub use setzer::{SetzerSource, DEFAULT_SETZER_PROGRAM, DEFAULT_WARN_AFTER_FAILURES};
pub use slot::PriceSlot;
pub use stream::{StreamConfig, StreamedFeed, DEFAULT_PRODUCT_ID, DEFAULT_STREAM_URL};
pub use types::{deserialize_price, parse_price, FeedError, FeedReading, Price};

/// A source of the current reference price
pub trait PriceFeed: Send + Sync {
    /// Latest fresh price, or `None` if the feed has none or it has expired.
    ///
    /// Never waits on I/O performed by a background task.
    fn get_price(&self) -> Option<Price>;
}
