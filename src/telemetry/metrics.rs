//! Prometheus metrics

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Outcome of a single polled fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A reading was published
    Success,
    /// The source is gone and the reading was cleared
    Missing,
    /// The fetch failed
    Failure,
}

impl FetchOutcome {
    fn as_str(self) -> &'static str {
        match self {
            FetchOutcome::Success => "success",
            FetchOutcome::Missing => "missing",
            FetchOutcome::Failure => "failure",
        }
    }
}

/// Kinds of inbound stream messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMessageKind {
    Subscriptions,
    Ticker,
    Heartbeat,
    Unknown,
    Invalid,
}

impl StreamMessageKind {
    fn as_str(self) -> &'static str {
        match self {
            StreamMessageKind::Subscriptions => "subscriptions",
            StreamMessageKind::Ticker => "ticker",
            StreamMessageKind::Heartbeat => "heartbeat",
            StreamMessageKind::Unknown => "unknown",
            StreamMessageKind::Invalid => "invalid",
        }
    }
}

/// Install the Prometheus exporter listening on the given port
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(SocketAddr::from(([0, 0, 0, 0], port)))
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics exporter: {}", e))?;

    describe_counter!(
        "pricefeed_fetches_total",
        "Polled fetches by feed and outcome"
    );
    describe_counter!(
        "pricefeed_stream_messages_total",
        "Inbound stream messages by kind"
    );
    describe_counter!(
        "pricefeed_reconnects_total",
        "WebSocket reconnection attempts"
    );
    describe_gauge!(
        "pricefeed_available",
        "1 when the feed currently reports a fresh price"
    );

    tracing::info!(port, "Metrics exporter listening");
    Ok(())
}

/// Record the outcome of a polled fetch
pub fn record_fetch(feed: &str, outcome: FetchOutcome) {
    counter!(
        "pricefeed_fetches_total",
        "feed" => feed.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

/// Record an inbound stream message
pub fn record_stream_message(kind: StreamMessageKind) {
    counter!("pricefeed_stream_messages_total", "kind" => kind.as_str()).increment(1);
}

/// Record a websocket reconnection attempt
pub fn record_reconnect() {
    counter!("pricefeed_reconnects_total").increment(1);
}

/// Set the availability gauge of a feed
pub fn set_available(feed: &str, available: bool) {
    gauge!("pricefeed_available", "feed" => feed.to_string()).set(if available {
        1.0
    } else {
        0.0
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_outcome_labels() {
        assert_eq!(FetchOutcome::Success.as_str(), "success");
        assert_eq!(FetchOutcome::Missing.as_str(), "missing");
        assert_eq!(FetchOutcome::Failure.as_str(), "failure");
    }

    #[test]
    fn test_recording_without_exporter_is_noop() {
        record_fetch("file", FetchOutcome::Success);
        record_stream_message(StreamMessageKind::Heartbeat);
        record_reconnect();
        set_available("file", true);
    }
}
