//! WebSocket client with automatic reconnection

use super::types::{WsConfig, WsError, WsMessage};
use crate::telemetry;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;

/// Reusable WebSocket client with automatic reconnection and ping/pong handling
pub struct WsClient {
    config: WsConfig,
}

impl WsClient {
    /// Create a new WebSocket client with the given configuration
    pub fn new(config: WsConfig) -> Self {
        Self { config }
    }

    /// Connect and return a receiver for messages
    ///
    /// This spawns a background task that handles connection management,
    /// reconnection after a fixed delay, and ping keepalive. Reconnection
    /// never gives up; the task stops only when `cancel` fires or the
    /// receiver is dropped.
    ///
    /// Returns a channel receiver that will receive all WebSocket messages
    /// including connection status events (Connected, Disconnected, Reconnecting).
    pub fn connect(&self, cancel: CancellationToken) -> mpsc::Receiver<WsMessage> {
        let (tx, rx) = mpsc::channel(1024);
        let config = self.config.clone();

        tokio::spawn(Self::run_connection_loop(config, tx, cancel));

        rx
    }

    /// Run the connection loop with automatic reconnection
    async fn run_connection_loop(
        config: WsConfig,
        tx: mpsc::Sender<WsMessage>,
        cancel: CancellationToken,
    ) {
        let mut reconnect_attempts: u32 = 0;

        loop {
            let result = tokio::select! {
                _ = cancel.cancelled() => Ok(()),
                result = Self::connect_and_stream(&config, &tx) => result,
            };

            match result {
                Ok(()) => {
                    tracing::info!(url = %config.url, "WebSocket connection loop stopped");
                    let _ = tx.send(WsMessage::Disconnected).await;
                    break;
                }
                Err(e) => {
                    reconnect_attempts = reconnect_attempts.saturating_add(1);
                    telemetry::record_reconnect();
                    tracing::info!(
                        error = %e,
                        attempt = reconnect_attempts,
                        "WebSocket disconnected, reconnecting..."
                    );

                    // Check if receiver is still alive
                    if tx.is_closed() {
                        tracing::info!("Receiver dropped, stopping reconnection");
                        break;
                    }

                    let _ = tx
                        .send(WsMessage::Reconnecting {
                            attempt: reconnect_attempts,
                        })
                        .await;

                    tokio::select! {
                        _ = cancel.cancelled() => {
                            let _ = tx.send(WsMessage::Disconnected).await;
                            break;
                        }
                        _ = sleep(config.reconnect_delay) => {}
                    }
                }
            }
        }
    }

    /// Connect to WebSocket, subscribe and stream messages.
    ///
    /// Returns `Ok(())` only when the receiver is gone; every server-side
    /// close or transport error is an `Err` so the caller reconnects.
    async fn connect_and_stream(
        config: &WsConfig,
        tx: &mpsc::Sender<WsMessage>,
    ) -> Result<(), WsError> {
        tracing::info!(url = %config.url, "Connecting to WebSocket");

        let (ws_stream, _response) = connect_async(&config.url)
            .await
            .map_err(|e| WsError::ConnectionFailed(e.to_string()))?;

        let (mut write, mut read) = ws_stream.split();

        tracing::info!(url = %config.url, "WebSocket connected");

        if let Some(subscribe) = &config.subscribe_message {
            write
                .send(Message::Text(subscribe.clone()))
                .await
                .map_err(|e| WsError::SendFailed(e.to_string()))?;
        }

        // Notify connected
        if tx.send(WsMessage::Connected).await.is_err() {
            return Ok(());
        }

        let mut ping_interval = tokio::time::interval(config.ping_interval);
        ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick completes immediately
        ping_interval.tick().await;

        // A pong must arrive before the next ping goes out
        let mut waiting_for_pong = false;

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if tx.send(WsMessage::Text(text)).await.is_err() {
                                tracing::debug!("Receiver dropped, closing connection");
                                return Ok(());
                            }
                        }
                        Some(Ok(Message::Binary(data))) => {
                            if tx.send(WsMessage::Binary(data)).await.is_err() {
                                tracing::debug!("Receiver dropped, closing connection");
                                return Ok(());
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            write.send(Message::Pong(data)).await
                                .map_err(|e| WsError::SendFailed(e.to_string()))?;
                        }
                        Some(Ok(Message::Pong(_))) => {
                            waiting_for_pong = false;
                        }
                        Some(Ok(Message::Close(_))) => {
                            return Err(WsError::ConnectionClosed);
                        }
                        Some(Err(e)) => {
                            return Err(WsError::ConnectionFailed(e.to_string()));
                        }
                        None => {
                            return Err(WsError::ConnectionFailed("Stream ended unexpectedly".into()));
                        }
                        _ => {}
                    }
                }

                _ = ping_interval.tick() => {
                    if waiting_for_pong {
                        return Err(WsError::ConnectionFailed("Pong timeout".into()));
                    }
                    write.send(Message::Ping(vec![])).await
                        .map_err(|e| WsError::SendFailed(e.to_string()))?;
                    waiting_for_pong = true;
                }
            }
        }
    }
}
