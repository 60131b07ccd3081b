//! WebSocket client library
//!
//! Provides a reusable WebSocket client with automatic reconnection after a
//! fixed delay, subscribe-on-connect and ping keepalive.

mod client;
mod types;

pub use client::WsClient;
pub use types::{WsConfig, WsError, WsMessage};
