//! End-to-end integration tests

use pricefeed::config::Config;
use pricefeed::feed::{PriceFeed, PriceFeedFactory, STREAM_SELECTOR};
use rust_decimal_macros::dec;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[test]
fn test_config_example_loads() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml.example");
    let config = Config::load(path).unwrap();

    assert_eq!(config.feed.price_feed.as_deref(), Some(STREAM_SELECTOR));
    assert_eq!(config.feed.expiry(), Duration::from_secs(120));
    assert_eq!(config.feed.poll_interval(), Duration::from_secs(5));
    assert_eq!(config.feed.stream.product_id, "ETH-USD");
    assert_eq!(config.feed.setzer.program, "setzer");
    assert_eq!(config.telemetry.log_level, "info");
    assert!(config.telemetry.metrics_port.is_none());
}

#[test]
fn test_config_to_fixed_feed() {
    let toml = r#"
        [feed]
        price_feed = "fixed:250.75"
        expiry_secs = 30
    "#;

    let config: Config = toml::from_str(toml).unwrap();
    let selector = config.feed.price_feed.clone();
    let factory = PriceFeedFactory::new(config.feed, CancellationToken::new());
    let feed = factory.create(selector.as_deref(), None, None).unwrap();

    assert_eq!(feed.get_price(), Some(dec!(250.75)));
}

#[tokio::test]
async fn test_stream_feed_unreachable_is_absent() {
    let toml = r#"
        [feed]
        price_feed = "gdax-websocket"

        [feed.stream]
        url = "ws://127.0.0.1:1"
    "#;

    let config: Config = toml::from_str(toml).unwrap();
    let cancel = CancellationToken::new();
    let selector = config.feed.price_feed.clone();
    let factory = PriceFeedFactory::new(config.feed, cancel.clone());
    let feed = factory.create(selector.as_deref(), None, None).unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(feed.get_price(), None);
    cancel.cancel();
}
