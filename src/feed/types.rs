//! Price feed types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::str::FromStr;
use thiserror::Error;

/// Reference price
pub type Price = Decimal;

/// A price together with the instant it was observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedReading {
    /// Observed price
    pub price: Price,
    /// When the price was observed at its source
    pub observed_at: DateTime<Utc>,
}

impl FeedReading {
    /// Create a reading observed at the given instant
    pub fn new(price: Price, observed_at: DateTime<Utc>) -> Self {
        Self { price, observed_at }
    }

    /// Create a reading observed right now
    pub fn observed_now(price: Price) -> Self {
        Self::new(price, Utc::now())
    }
}

/// Price feed errors
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Invalid payload: {0}")]
    Payload(String),

    #[error("Subprocess '{program}' failed: {reason}")]
    Subprocess { program: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse a price from its textual form, accepting scientific notation
pub fn parse_price(text: &str) -> Result<Price, FeedError> {
    let text = text.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map(|price| price.normalize())
        .map_err(|e| FeedError::Payload(format!("invalid price '{}': {}", text, e)))
}

/// Price field encoded either as a JSON number or a numeric string
#[derive(Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Text(String),
    Number(serde_json::Number),
}

/// Deserialize a price from a JSON number or numeric string without going
/// through floating point
pub fn deserialize_price<'de, D>(deserializer: D) -> Result<Price, D::Error>
where
    D: Deserializer<'de>,
{
    let text = match RawPrice::deserialize(deserializer)? {
        RawPrice::Text(s) => s,
        RawPrice::Number(n) => n.to_string(),
    };
    parse_price(&text).map_err(serde::de::Error::custom)
}
