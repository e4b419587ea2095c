// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstractions for the remote authority.
//!
//! Two seams are exposed:
//! - [`BatchTransport`] posts a batch of mutations and returns the per-item
//!   results ([`HttpBatchTransport`] in production).
//! - [`PushTransport`] holds the push connection and yields raw text frames
//!   ([`WebSocketTransport`] in production).
//!
//! Both use boxed futures so mock implementations can be swapped in for
//! tests.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tide_core::{BatchRequest, BatchResponse};

/// Error type for transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Connection closed unexpectedly.
    #[error("connection closed")]
    ConnectionClosed,

    /// Send failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Receive failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// The remote answered with a non-success status.
    #[error("remote returned HTTP {0}")]
    Status(u16),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    SerializationError(String),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Boxed future returned by transport methods.
pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = TransportResult<T>> + Send + 'a>>;

/// Sends a batch of mutations to the remote authority.
pub trait BatchTransport: Send + Sync {
    /// Send the batch and wait for per-item results.
    ///
    /// Any failure to obtain a decodable response is a transport error.
    fn send_batch(&self, request: BatchRequest) -> TransportFuture<'_, BatchResponse>;
}

/// HTTP batch transport using reqwest.
pub struct HttpBatchTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpBatchTransport {
    /// Create a transport posting to `url` with the given request timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> TransportResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;
        Ok(HttpBatchTransport {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl BatchTransport for HttpBatchTransport {
    fn send_batch(&self, request: BatchRequest) -> TransportFuture<'_, BatchResponse> {
        Box::pin(async move {
            let response = self
                .client
                .post(&self.url)
                .json(&request)
                .send()
                .await
                .map_err(|e| TransportError::SendFailed(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(TransportError::Status(status.as_u16()));
            }

            let body = response
                .text()
                .await
                .map_err(|e| TransportError::ReceiveFailed(e.to_string()))?;
            BatchResponse::from_json(&body)
                .map_err(|e| TransportError::SerializationError(e.to_string()))
        })
    }
}

/// Push connection yielding text frames.
pub trait PushTransport: Send + Sync {
    /// Connect to a remote server.
    fn connect(&mut self, url: &str) -> TransportFuture<'_, ()>;

    /// Disconnect from the server.
    fn disconnect(&mut self) -> TransportFuture<'_, ()>;

    /// Receive the next text frame.
    ///
    /// Returns `None` if the connection is closed.
    fn recv(&mut self) -> TransportFuture<'_, Option<String>>;

    /// Check if connected.
    fn is_connected(&self) -> bool;
}

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// WebSocket transport implementation using tokio-tungstenite.
pub struct WebSocketTransport {
    /// The WebSocket connection, if connected.
    ws: Option<WebSocketConnection>,
}

/// Internal WebSocket connection wrapper.
struct WebSocketConnection {
    sink: futures_util::stream::SplitSink<WsStream, tokio_tungstenite::tungstenite::Message>,
    stream: futures_util::stream::SplitStream<WsStream>,
}

impl WebSocketTransport {
    /// Create a new WebSocket transport.
    pub fn new() -> Self {
        WebSocketTransport { ws: None }
    }
}

impl Default for WebSocketTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl PushTransport for WebSocketTransport {
    fn connect(&mut self, url: &str) -> TransportFuture<'_, ()> {
        let url = url.to_string();
        Box::pin(async move {
            use futures_util::StreamExt;

            let (ws_stream, _) = tokio_tungstenite::connect_async(&url)
                .await
                .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

            let (sink, stream) = ws_stream.split();
            self.ws = Some(WebSocketConnection { sink, stream });
            Ok(())
        })
    }

    fn disconnect(&mut self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            if let Some(mut ws) = self.ws.take() {
                use futures_util::SinkExt;
                if let Err(e) = ws.sink.close().await {
                    tracing::debug!("Error closing push connection: {}", e);
                }
            }
            Ok(())
        })
    }

    fn recv(&mut self) -> TransportFuture<'_, Option<String>> {
        Box::pin(async move {
            use futures_util::StreamExt;
            use tokio_tungstenite::tungstenite::Message;

            let ws = self.ws.as_mut().ok_or(TransportError::ConnectionClosed)?;

            loop {
                match ws.stream.next().await {
                    Some(Ok(Message::Text(text))) => return Ok(Some(text.to_string())),
                    Some(Ok(Message::Close(_))) | None => {
                        self.ws = None;
                        return Ok(None);
                    }
                    // Ping/pong and binary frames carry no events
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        self.ws = None;
                        return Err(TransportError::ReceiveFailed(e.to_string()));
                    }
                }
            }
        })
    }

    fn is_connected(&self) -> bool {
        self.ws.is_some()
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
