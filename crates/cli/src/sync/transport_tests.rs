// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the transport module.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::net::SocketAddr;

use futures_util::SinkExt;
use serde_json::json;
use tide_core::ItemResult;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::sync::test_helpers::make_test_mutation;

/// Push server on a random port that sends scripted frames to the first
/// client, then closes the connection.
struct TestPushServer {
    addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
}

impl TestPushServer {
    async fn start(frames: Vec<Message>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            tokio::select! {
                _ = serve_once(listener, frames) => {}
                _ = shutdown_rx => {}
            }
        });

        TestPushServer { addr, shutdown_tx }
    }

    fn ws_url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
    }
}

async fn serve_once(listener: TcpListener, frames: Vec<Message>) {
    let (stream, _) = listener.accept().await.unwrap();
    let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
    for frame in frames {
        ws.send(frame).await.unwrap();
    }
    let _ = ws.close(None).await;
}

fn batch_of(ids: &[&str]) -> (BatchRequest, Vec<tide_core::MutationId>) {
    let mutations: Vec<_> = ids.iter().map(|id| make_test_mutation(id)).collect();
    let request = BatchRequest::from_mutations(&mutations);
    let ids = mutations.into_iter().map(|m| m.id).collect();
    (request, ids)
}

#[tokio::test]
async fn http_batch_returns_per_item_results() {
    let server = MockServer::start().await;
    let (request, ids) = batch_of(&["a", "b"]);
    let response = json!({
        "results": [
            { "id": ids[0], "status": "applied" },
            { "id": ids[1], "status": "rejected", "reason": "stale" },
        ]
    });
    Mock::given(method("POST"))
        .and(path("/batch"))
        .and(body_json(&request))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .expect(1)
        .mount(&server)
        .await;

    let transport =
        HttpBatchTransport::new(format!("{}/batch", server.uri()), Duration::from_secs(5))
            .unwrap();
    let response = transport.send_batch(request).await.unwrap();

    assert_eq!(
        response.results,
        vec![
            ItemResult::applied(ids[0].clone()),
            ItemResult::rejected(ids[1].clone(), "stale"),
        ]
    );
}

#[tokio::test]
async fn http_batch_non_success_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let transport = HttpBatchTransport::new(server.uri(), Duration::from_secs(5)).unwrap();
    let (request, _) = batch_of(&["a"]);
    let err = transport.send_batch(request).await.unwrap_err();

    assert!(matches!(err, TransportError::Status(503)));
}

#[tokio::test]
async fn http_batch_undecodable_body_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let transport = HttpBatchTransport::new(server.uri(), Duration::from_secs(5)).unwrap();
    let (request, _) = batch_of(&["a"]);
    let err = transport.send_batch(request).await.unwrap_err();

    assert!(matches!(err, TransportError::SerializationError(_)));
}

#[tokio::test]
async fn http_batch_unreachable_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let transport =
        HttpBatchTransport::new(format!("http://{}/batch", addr), Duration::from_secs(1)).unwrap();
    let (request, _) = batch_of(&["a"]);
    let err = transport.send_batch(request).await.unwrap_err();

    assert!(matches!(err, TransportError::SendFailed(_)));
}

#[tokio::test]
async fn websocket_yields_text_frames_until_close() {
    let server = TestPushServer::start(vec![
        Message::Text(r#"{"type":"sync_requested"}"#.into()),
        Message::Ping(Default::default()),
        Message::Text(r#"{"type":"notification_read","payload":{"id":"n-1"}}"#.into()),
    ])
    .await;

    let mut transport = WebSocketTransport::new();
    assert!(!transport.is_connected());
    transport.connect(&server.ws_url()).await.unwrap();
    assert!(transport.is_connected());

    let first = transport.recv().await.unwrap();
    assert_eq!(first.as_deref(), Some(r#"{"type":"sync_requested"}"#));
    let second = transport.recv().await.unwrap().unwrap();
    assert!(second.contains("notification_read"));

    assert_eq!(transport.recv().await.unwrap(), None);
    assert!(!transport.is_connected());

    server.shutdown();
}

#[tokio::test]
async fn websocket_connect_refused() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut transport = WebSocketTransport::new();
    let err = transport
        .connect(&format!("ws://{}", addr))
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::ConnectionFailed(_)));
    assert!(!transport.is_connected());
}

#[tokio::test]
async fn websocket_recv_without_connection() {
    let mut transport = WebSocketTransport::default();
    let err = transport.recv().await.unwrap_err();
    assert!(matches!(err, TransportError::ConnectionClosed));

    // Disconnecting an idle transport is a no-op
    transport.disconnect().await.unwrap();
}
