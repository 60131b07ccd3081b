//! pricefeed: Reference price feeds for market-making keepers
//!
//! This library provides the core components for:
//! - Fixed and on-chain oracle prices
//! - Prices polled from a file, the setzer tool or an exchange REST ticker
//! - Prices streamed from an exchange WebSocket ticker
//! - Expiry tracking so stale prices are reported as absent
//! - Scaling one feed by another
//! - Feed selection from a single configuration token
//! - Logging and metrics

pub mod cli;
pub mod config;
pub mod feed;
pub mod telemetry;
pub mod ws;
