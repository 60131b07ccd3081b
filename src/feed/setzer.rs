//! Price looked up through the `setzer` command-line utility

use super::polled::PriceSource;
use super::types::parse_price;
use super::{FeedError, FeedReading, Price};
use async_trait::async_trait;
use tokio::process::Command;

/// Default executable name
pub const DEFAULT_SETZER_PROGRAM: &str = "setzer";

/// Consecutive failures tolerated before warning
pub const DEFAULT_WARN_AFTER_FAILURES: u32 = 10;

/// Polled source running `<program> price <symbol>`
#[derive(Debug, Clone)]
pub struct SetzerSource {
    program: String,
    symbol: String,
    warn_after: u32,
}

impl SetzerSource {
    /// Create a source looking up `symbol` with the default `setzer` program
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            program: DEFAULT_SETZER_PROGRAM.to_string(),
            symbol: symbol.into(),
            warn_after: DEFAULT_WARN_AFTER_FAILURES,
        }
    }

    /// Use another executable
    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Set the number of failures tolerated before warning
    pub fn warn_after(mut self, failures: u32) -> Self {
        self.warn_after = failures;
        self
    }

    /// Symbol looked up
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Parse the standard output of a lookup
    fn parse_output(&self, stdout: &[u8]) -> Result<Price, FeedError> {
        let text = String::from_utf8_lossy(stdout);
        let line = text.lines().next().unwrap_or_default();
        parse_price(line).map_err(|e| FeedError::Subprocess {
            program: self.program.clone(),
            reason: e.to_string(),
        })
    }

    /// Run one lookup
    pub async fn price(&self) -> Result<Price, FeedError> {
        let output = Command::new(&self.program)
            .arg("price")
            .arg(&self.symbol)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| FeedError::Subprocess {
                program: self.program.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FeedError::Subprocess {
                program: self.program.clone(),
                reason: format!("{}: {}", output.status, stderr.trim()),
            });
        }

        self.parse_output(&output.stdout)
    }
}

#[async_trait]
impl PriceSource for SetzerSource {
    fn describe(&self) -> String {
        format!("setzer:{}", self.symbol)
    }

    async fn fetch(&self) -> Result<Option<FeedReading>, FeedError> {
        let price = self.price().await?;
        Ok(Some(FeedReading::observed_now(price)))
    }

    fn warn_after_failures(&self) -> u32 {
        self.warn_after
    }

    fn failure_hint(&self) -> Option<String> {
        Some(format!(
            "please check if '{}' is installed and working correctly",
            self.program
        ))
    }
}
