//! Integration tests for price feed module

use pricefeed::config::FeedConfig;
use pricefeed::feed::{
    FileSource, FixedPriceFeed, PolledFeed, PriceFeed, PriceFeedFactory, ScaledFeed,
};
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

async fn wait_until<F: Fn() -> bool>(condition: F) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

#[tokio::test]
async fn test_file_feed_follows_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("price.json");
    std::fs::write(&path, r#"{"price": 150.25}"#).unwrap();

    let cancel = CancellationToken::new();
    let feed = PolledFeed::spawn(
        FileSource::new(&path),
        Duration::from_millis(10),
        Duration::from_secs(60),
        cancel.clone(),
    );

    assert!(wait_until(|| feed.get_price() == Some(dec!(150.25))).await);

    std::fs::write(&path, r#"{"price": "151.5"}"#).unwrap();
    assert!(wait_until(|| feed.get_price() == Some(dec!(151.5))).await);

    std::fs::remove_file(&path).unwrap();
    assert!(wait_until(|| feed.get_price().is_none()).await);

    cancel.cancel();
}

#[tokio::test]
async fn test_file_feed_expires_unchanged_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("price.json");
    std::fs::write(&path, r#"{"price": 150.25}"#).unwrap();

    let cancel = CancellationToken::new();
    let feed = PolledFeed::spawn(
        FileSource::new(&path),
        Duration::from_millis(10),
        Duration::from_secs(1),
        cancel.clone(),
    );

    assert!(wait_until(|| feed.latest().is_some()).await);
    tokio::time::sleep(Duration::from_millis(1500)).await;

    // Reads keep succeeding but the modification time is too old
    assert!(feed.latest().is_some());
    assert_eq!(feed.get_price(), None);

    cancel.cancel();
}

#[tokio::test]
async fn test_factory_file_selector() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("price.json");
    std::fs::write(&path, r#"{"price": "42.125"}"#).unwrap();

    let cancel = CancellationToken::new();
    let factory = PriceFeedFactory::new(FeedConfig::default(), cancel.clone());
    let selector = format!("file:{}", path.display());
    let feed = factory.create(Some(&selector), None, None).unwrap();

    assert!(wait_until(|| feed.get_price() == Some(dec!(42.125))).await);
    cancel.cancel();
}

#[test]
fn test_factory_fixed_selector() {
    let factory = PriceFeedFactory::new(FeedConfig::default(), CancellationToken::new());
    let feed = factory.create(Some("fixed:42.5"), None, None).unwrap();
    assert_eq!(feed.get_price(), Some(dec!(42.5)));
}

#[test]
fn test_factory_rejects_bad_fixed_price() {
    let factory = PriceFeedFactory::new(FeedConfig::default(), CancellationToken::new());
    assert!(factory.create(Some("fixed:not-a-number"), None, None).is_err());
}

#[test]
fn test_scaled_feed() {
    let base: Arc<dyn PriceFeed> = Arc::new(FixedPriceFeed::new(dec!(300)));
    let scale: Arc<dyn PriceFeed> = Arc::new(FixedPriceFeed::new(dec!(1.5)));
    let feed = ScaledFeed::new(base, scale);
    assert_eq!(feed.get_price(), Some(dec!(200)));
}

#[tokio::test]
async fn test_scaled_by_missing_file_is_absent() {
    let dir = tempfile::tempdir().unwrap();
    let cancel = CancellationToken::new();
    let scale: Arc<dyn PriceFeed> = Arc::new(PolledFeed::spawn(
        FileSource::new(dir.path().join("missing.json")),
        Duration::from_millis(10),
        Duration::from_secs(60),
        cancel.clone(),
    ));

    let factory = PriceFeedFactory::new(FeedConfig::default(), cancel.clone());
    let feed = factory.create(Some("fixed:100"), None, Some(scale)).unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(feed.get_price(), None);
    cancel.cancel();
}
