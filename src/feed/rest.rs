//! Price polled from an exchange REST ticker
//!
//! The reference price is the mid of the best buy and sell quotes.

use super::polled::PriceSource;
use super::types::deserialize_price;
use super::{FeedError, FeedReading, Price};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Bibox REST API base URL
pub const BIBOX_API_URL: &str = "https://api.bibox.com";

/// Best buy and sell quotes of a ticker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Ticker {
    #[serde(deserialize_with = "deserialize_price")]
    pub buy: Price,
    #[serde(deserialize_with = "deserialize_price")]
    pub sell: Price,
}

impl Ticker {
    /// Mid price between buy and sell
    pub fn mid(&self) -> Price {
        ((self.buy + self.sell) / Price::TWO).normalize()
    }
}

/// Exchange client able to fetch a ticker
#[async_trait]
pub trait TickerClient: Send + Sync {
    /// Fetch the current ticker for `pair`
    async fn ticker(&self, pair: &str) -> Result<Ticker, FeedError>;

    /// Exchange name for logs
    fn exchange(&self) -> &str;
}

/// Bibox ticker envelope
#[derive(Debug, Deserialize)]
struct BiboxResponse {
    result: Ticker,
}

/// Bibox REST client
pub struct BiboxClient {
    base_url: String,
    client: Client,
}

impl BiboxClient {
    /// Create a client against the public Bibox API
    pub fn new() -> Result<Self, FeedError> {
        Self::with_base_url(BIBOX_API_URL, Duration::from_secs(10))
    }

    /// Create a client against a custom base URL
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FeedError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    /// Parse a ticker response body
    fn parse_ticker(body: &str) -> Result<Ticker, FeedError> {
        let response: BiboxResponse = serde_json::from_str(body)?;
        Ok(response.result)
    }
}

#[async_trait]
impl TickerClient for BiboxClient {
    async fn ticker(&self, pair: &str) -> Result<Ticker, FeedError> {
        let url = format!("{}/v1/mdata", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("cmd", "ticker"), ("pair", pair)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Fetch(format!("Bibox API error: {} - {}", status, body)));
        }

        let body = response.text().await?;
        Self::parse_ticker(&body)
    }

    fn exchange(&self) -> &str {
        "bibox"
    }
}

/// Polled source reading an exchange ticker
pub struct RestTickerSource {
    client: Arc<dyn TickerClient>,
    pair: String,
}

impl RestTickerSource {
    /// Create a source for `pair` on the given exchange client
    pub fn new(client: Arc<dyn TickerClient>, pair: impl Into<String>) -> Self {
        Self {
            client,
            pair: pair.into(),
        }
    }
}

#[async_trait]
impl PriceSource for RestTickerSource {
    fn describe(&self) -> String {
        format!("{}-ticker:{}", self.client.exchange(), self.pair)
    }

    async fn fetch(&self) -> Result<Option<FeedReading>, FeedError> {
        let ticker = self.client.ticker(&self.pair).await?;
        Ok(Some(FeedReading::observed_now(ticker.mid())))
    }
}
