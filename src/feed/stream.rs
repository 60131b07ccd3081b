//! Exchange WebSocket ticker price feed
//!
//! Subscribes to the `ticker` and `heartbeat` channels of one product.
//! Ticker messages carry a new price; heartbeats only refresh the timestamp,
//! so a stream whose price does not move is not reported as stale.

use super::slot::PriceSlot;
use super::types::deserialize_price;
use super::{FeedReading, Price, PriceFeed};
use crate::telemetry::{self, StreamMessageKind};
use crate::ws::{WsClient, WsConfig, WsMessage};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Default ticker WebSocket URL
pub const DEFAULT_STREAM_URL: &str = "wss://ws-feed.exchange.coinbase.com";

/// Default product
pub const DEFAULT_PRODUCT_ID: &str = "ETH-USD";

/// Streamed feed configuration
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// WebSocket URL
    pub url: String,
    /// Product to subscribe to
    pub product_id: String,
    /// Delay before reconnecting after a disconnect
    pub reconnect_delay: Duration,
    /// Interval for protocol-level pings
    pub ping_interval: Duration,
    /// Maximum age of a reading
    pub expiry: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_STREAM_URL.to_string(),
            product_id: DEFAULT_PRODUCT_ID.to_string(),
            reconnect_delay: Duration::from_secs(1),
            ping_interval: Duration::from_secs(15),
            expiry: Duration::from_secs(120),
        }
    }
}

/// Subscribe request
#[derive(Debug, Serialize)]
struct SubscribeRequest<'a> {
    #[serde(rename = "type")]
    msg_type: &'static str,
    channels: Vec<Channel<'a>>,
}

/// Channel subscription entry
#[derive(Debug, Serialize)]
struct Channel<'a> {
    name: &'static str,
    product_ids: [&'a str; 1],
}

/// Inbound stream message
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum StreamMessage {
    Subscriptions,
    Ticker {
        #[serde(deserialize_with = "deserialize_price")]
        price: Price,
    },
    Heartbeat,
    #[serde(other)]
    Unknown,
}

/// Feed backed by a persistent WebSocket ticker subscription
pub struct StreamedFeed {
    slot: Arc<PriceSlot>,
}

impl StreamedFeed {
    /// Connect to the stream and keep the latest price until `cancel` fires
    pub fn spawn(config: StreamConfig, cancel: CancellationToken) -> Self {
        let slot = Arc::new(PriceSlot::new(
            format!("stream:{}", config.product_id),
            config.expiry,
        ));

        tracing::info!(
            url = %config.url,
            product_id = %config.product_id,
            expiry_secs = config.expiry.as_secs(),
            "Starting streamed price feed"
        );

        let ws_config = WsConfig::new(&config.url)
            .reconnect_delay(config.reconnect_delay)
            .ping_interval(config.ping_interval)
            .subscribe_message(Self::subscribe_message(&config.product_id));

        let ws_rx = WsClient::new(ws_config).connect(cancel);

        let task_slot = slot.clone();
        tokio::spawn(async move {
            Self::run_message_loop(ws_rx, task_slot).await;
        });

        Self { slot }
    }

    /// Build the subscribe frame for `product_id`
    fn subscribe_message(product_id: &str) -> String {
        let request = SubscribeRequest {
            msg_type: "subscribe",
            channels: vec![
                Channel {
                    name: "ticker",
                    product_ids: [product_id],
                },
                Channel {
                    name: "heartbeat",
                    product_ids: [product_id],
                },
            ],
        };
        serde_json::json!(request).to_string()
    }

    /// Apply one text frame to the slot
    fn handle_text(slot: &PriceSlot, text: &str) -> StreamMessageKind {
        let kind = match serde_json::from_str::<StreamMessage>(text) {
            Ok(StreamMessage::Subscriptions) => {
                tracing::debug!(feed = %slot.label(), "Subscription confirmed");
                StreamMessageKind::Subscriptions
            }
            Ok(StreamMessage::Ticker { price }) => {
                slot.publish(FeedReading::observed_now(price));
                StreamMessageKind::Ticker
            }
            Ok(StreamMessage::Heartbeat) => {
                slot.touch(Utc::now());
                StreamMessageKind::Heartbeat
            }
            Ok(StreamMessage::Unknown) => {
                tracing::warn!(feed = %slot.label(), message = %text, "Received unknown message type");
                StreamMessageKind::Unknown
            }
            Err(e) => {
                tracing::warn!(feed = %slot.label(), message = %text, error = %e, "Received invalid message");
                StreamMessageKind::Invalid
            }
        };

        telemetry::record_stream_message(kind);
        kind
    }

    /// Run the message processing loop
    async fn run_message_loop(mut ws_rx: mpsc::Receiver<WsMessage>, slot: Arc<PriceSlot>) {
        while let Some(msg) = ws_rx.recv().await {
            match msg {
                WsMessage::Text(text) => {
                    Self::handle_text(&slot, &text);
                }
                WsMessage::Connected => {
                    tracing::info!(feed = %slot.label(), "Price stream connected");
                }
                WsMessage::Reconnecting { attempt } => {
                    tracing::info!(feed = %slot.label(), attempt, "Price stream disconnected");
                }
                WsMessage::Disconnected => {
                    tracing::info!(feed = %slot.label(), "Price stream stopped");
                    break;
                }
                WsMessage::Binary(_) => {}
            }
        }
    }
}

impl PriceFeed for StreamedFeed {
    fn get_price(&self) -> Option<Price> {
        self.slot.price()
    }
}
