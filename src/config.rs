//! Configuration types for pricefeed

use crate::feed::{
    StreamConfig, DEFAULT_POLL_INTERVAL, DEFAULT_PRODUCT_ID, DEFAULT_SETZER_PROGRAM,
    DEFAULT_STREAM_URL, DEFAULT_WARN_AFTER_FAILURES,
};
use crate::telemetry::LogFormat;
use serde::Deserialize;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Price feed configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Source selector (`gdax-websocket`, `fixed:<price>`, `file:<path>` or a setzer symbol)
    #[serde(default)]
    pub price_feed: Option<String>,

    /// Maximum age of a price before it is treated as absent (seconds)
    #[serde(default = "default_expiry_secs")]
    pub expiry_secs: u64,

    /// Interval between two fetches of polled feeds (seconds)
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    #[serde(default)]
    pub stream: StreamSettings,

    #[serde(default)]
    pub setzer: SetzerSettings,
}

/// WebSocket ticker settings
#[derive(Debug, Clone, Deserialize)]
pub struct StreamSettings {
    #[serde(default = "default_stream_url")]
    pub url: String,

    #[serde(default = "default_product_id")]
    pub product_id: String,

    #[serde(default = "default_reconnect_delay_secs")]
    pub reconnect_delay_secs: u64,

    #[serde(default = "default_ping_interval_secs")]
    pub ping_interval_secs: u64,
}

/// External price lookup settings
#[derive(Debug, Clone, Deserialize)]
pub struct SetzerSettings {
    #[serde(default = "default_setzer_program")]
    pub program: String,

    /// Consecutive failures tolerated before warning
    #[serde(default = "default_warn_after_failures")]
    pub warn_after_failures: u32,
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Port of the Prometheus exporter, disabled when unset
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_expiry_secs() -> u64 {
    120
}
fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL.as_secs()
}
fn default_stream_url() -> String {
    DEFAULT_STREAM_URL.to_string()
}
fn default_product_id() -> String {
    DEFAULT_PRODUCT_ID.to_string()
}
fn default_reconnect_delay_secs() -> u64 {
    1
}
fn default_ping_interval_secs() -> u64 {
    15
}
fn default_setzer_program() -> String {
    DEFAULT_SETZER_PROGRAM.to_string()
}
fn default_warn_after_failures() -> u32 {
    DEFAULT_WARN_AFTER_FAILURES
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            price_feed: None,
            expiry_secs: default_expiry_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            stream: StreamSettings::default(),
            setzer: SetzerSettings::default(),
        }
    }
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            url: default_stream_url(),
            product_id: default_product_id(),
            reconnect_delay_secs: default_reconnect_delay_secs(),
            ping_interval_secs: default_ping_interval_secs(),
        }
    }
}

impl Default for SetzerSettings {
    fn default() -> Self {
        Self {
            program: default_setzer_program(),
            warn_after_failures: default_warn_after_failures(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            metrics_port: None,
        }
    }
}

impl FeedConfig {
    /// Maximum age of a price
    pub fn expiry(&self) -> Duration {
        Duration::from_secs(self.expiry_secs)
    }

    /// Interval between two polls, at least one second
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    /// Streamed feed configuration derived from these settings
    pub fn stream_config(&self) -> StreamConfig {
        StreamConfig {
            url: self.stream.url.clone(),
            product_id: self.stream.product_id.clone(),
            reconnect_delay: Duration::from_secs(self.stream.reconnect_delay_secs),
            ping_interval: Duration::from_secs(self.stream.ping_interval_secs.max(1)),
            expiry: self.expiry(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
