//! Price read from a local JSON file
//!
//! The file holds `{"price": <number or numeric string>}`. Its modification
//! time, not the time of the read, is the observation time, so an unchanged
//! file eventually expires even though every read succeeds.

use super::polled::PriceSource;
use super::types::deserialize_price;
use super::{FeedError, FeedReading, Price};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Contents of a price file
#[derive(Debug, Deserialize)]
struct PriceFile {
    #[serde(deserialize_with = "deserialize_price")]
    price: Price,
}

/// Polled source reading a price file
pub struct FileSource {
    path: PathBuf,
    last_price: Mutex<Option<Price>>,
}

impl FileSource {
    /// Create a source for the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_price: Mutex::new(None),
        }
    }

    /// Path of the price file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Forget the last price once the file is gone
    fn forget(&self) -> Option<FeedReading> {
        *self.last_price.lock() = None;
        None
    }

    /// Parse the contents of a price file
    fn parse(content: &str) -> Result<Price, FeedError> {
        let file: PriceFile = serde_json::from_str(content)?;
        Ok(file.price)
    }
}

#[async_trait]
impl PriceSource for FileSource {
    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }

    async fn fetch(&self) -> Result<Option<FeedReading>, FeedError> {
        let metadata = match tokio::fs::metadata(&self.path).await {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => return Ok(self.forget()),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(self.forget()),
            Err(e) => return Err(e.into()),
        };

        let content = tokio::fs::read_to_string(&self.path).await?;
        let price = Self::parse(&content)?;
        let observed_at = DateTime::<Utc>::from(metadata.modified()?);

        let previous = self.last_price.lock().replace(price);
        if previous != Some(price) {
            tracing::info!(file = %self.path.display(), price = %price, "Price feed updated");
        }

        Ok(Some(FeedReading::new(price, observed_at)))
    }

    fn warn_after_failures(&self) -> u32 {
        u32::MAX
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::slot::PriceSlot;
    use chrono::TimeDelta;
    use rust_decimal_macros::dec;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_parse_string_price() {
        assert_eq!(
            FileSource::parse(r#"{"price": "150.25"}"#).unwrap(),
            dec!(150.25)
        );
    }

    #[test]
    fn test_parse_numeric_price() {
        assert_eq!(FileSource::parse(r#"{"price": 99.5}"#).unwrap(), dec!(99.5));
    }

    #[test]
    fn test_parse_missing_field() {
        assert!(FileSource::parse(r#"{"value": 1}"#).is_err());
        assert!(FileSource::parse("not json").is_err());
    }

    #[test]
    fn test_describe() {
        let source = FileSource::new("/tmp/price.json");
        assert_eq!(source.describe(), "file:/tmp/price.json");
        assert_eq!(source.path(), Path::new("/tmp/price.json"));
    }

    #[tokio::test]
    async fn test_fetch_reads_price_and_mtime() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("price.json");
        std::fs::write(&path, r#"{"price": "150.25"}"#).unwrap();

        let source = FileSource::new(&path);
        let reading = source.fetch().await.unwrap().unwrap();

        let mtime = DateTime::<Utc>::from(std::fs::metadata(&path).unwrap().modified().unwrap());
        assert_eq!(reading.price, dec!(150.25));
        assert_eq!(reading.observed_at, mtime);
    }

    #[tokio::test]
    async fn test_fetch_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let source = FileSource::new(dir.path().join("absent.json"));
        assert!(source.fetch().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_directory_is_none() {
        let dir = TempDir::new().unwrap();
        let source = FileSource::new(dir.path());
        assert!(source.fetch().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_path_turned_directory_forgets_price() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("price.json");
        std::fs::write(&path, r#"{"price": 42}"#).unwrap();

        let source = FileSource::new(&path);
        source.fetch().await.unwrap();
        assert_eq!(*source.last_price.lock(), Some(dec!(42)));

        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();
        assert!(source.fetch().await.unwrap().is_none());
        assert_eq!(*source.last_price.lock(), None);
    }

    #[tokio::test]
    async fn test_missing_file_forgets_price() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("price.json");
        std::fs::write(&path, r#"{"price": 42}"#).unwrap();

        let source = FileSource::new(&path);
        source.fetch().await.unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(source.fetch().await.unwrap().is_none());
        assert_eq!(*source.last_price.lock(), None);
    }

    #[tokio::test]
    async fn test_fetch_malformed_file_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("price.json");
        std::fs::write(&path, r#"{"price": "abc"}"#).unwrap();

        let source = FileSource::new(&path);
        assert!(source.fetch().await.is_err());
    }

    #[tokio::test]
    async fn test_unchanged_file_expires_by_mtime() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("price.json");
        std::fs::write(&path, r#"{"price": 42}"#).unwrap();

        let source = FileSource::new(&path);
        let slot = PriceSlot::new(source.describe(), Duration::from_secs(30));
        let reading = source.fetch().await.unwrap().unwrap();
        slot.publish(reading);

        // A fresh read of the same file later on does not refresh its age
        let later = reading.observed_at + TimeDelta::seconds(31);
        slot.publish(source.fetch().await.unwrap().unwrap());
        assert_eq!(slot.price_at(later), None);
        assert_eq!(
            slot.price_at(reading.observed_at + TimeDelta::seconds(29)),
            Some(dec!(42))
        );
    }
}
