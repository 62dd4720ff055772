//! Test helpers for relay E2E tests.
//!
//! Provides TestServer, TestClient, and helper functions for driving the
//! relay over real WebSocket connections.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use roomcast::{Config, RoomRegistry, WebServer};

/// Default timeout for test operations.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// How long to wait before concluding that nothing was delivered.
pub const QUIET_PERIOD: Duration = Duration::from_millis(200);

/// Create a test configuration bound to an ephemeral local port.
pub fn create_test_config() -> Config {
    let mut config = Config::default();
    config.server.host = "127.0.0.1".to_string();
    config.server.port = 0;
    config.web.serve_static = false;
    config.relay.send_timeout_ms = 1000;
    config
}

/// Running relay server with access to its registry.
pub struct TestServer {
    pub addr: SocketAddr,
    pub registry: Arc<RoomRegistry>,
}

impl TestServer {
    /// Start a server in the background.
    pub async fn new() -> Self {
        let registry = Arc::new(RoomRegistry::new());
        let server = WebServer::with_registry(&create_test_config(), Arc::clone(&registry));
        let addr = server
            .run_with_addr()
            .await
            .expect("Failed to start test server");
        Self { addr, registry }
    }

    /// Connect a client to `room_id` and wait until it is registered.
    pub async fn join(&self, room_id: &str) -> TestClient {
        let before = self.registry.participant_count(room_id);
        let client = TestClient::connect(self.addr, room_id).await;
        self.wait_for_count(room_id, before + 1).await;
        client
    }

    /// Send a plain HTTP/1.1 GET and return the raw response.
    pub async fn raw_get(&self, path: &str) -> String {
        let mut stream = TcpStream::connect(self.addr)
            .await
            .expect("Failed to connect");
        let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
        stream
            .write_all(request.as_bytes())
            .await
            .expect("Failed to write request");
        let mut response = String::new();
        timeout(DEFAULT_TIMEOUT, stream.read_to_string(&mut response))
            .await
            .expect("Timeout reading response")
            .expect("Failed to read response");
        response
    }

    /// Wait until `room_id` holds exactly `expected` participants.
    pub async fn wait_for_count(&self, room_id: &str, expected: usize) {
        let registry = Arc::clone(&self.registry);
        let room = room_id.to_string();
        timeout(DEFAULT_TIMEOUT, async move {
            while registry.participant_count(&room) != expected {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("room {room_id} never reached {expected} participants"));
    }
}

/// WebSocket client for one participant.
pub struct TestClient {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    /// Open a relay connection for `room_id`.
    pub async fn connect(addr: SocketAddr, room_id: &str) -> Self {
        let url = format!("ws://{addr}/ws/{room_id}");
        let (ws, _response) = timeout(DEFAULT_TIMEOUT, connect_async(url))
            .await
            .expect("connect timed out")
            .expect("WebSocket handshake failed");
        Self { ws }
    }

    /// Send a text frame.
    pub async fn send(&mut self, text: &str) {
        self.ws
            .send(Message::Text(text.into()))
            .await
            .expect("send failed");
    }

    /// Receive the next text frame.
    pub async fn recv(&mut self) -> String {
        loop {
            let msg = timeout(DEFAULT_TIMEOUT, self.ws.next())
                .await
                .expect("recv timed out")
                .expect("stream ended")
                .expect("WebSocket error");
            if msg.is_text() {
                return msg.to_text().expect("text frame").to_string();
            }
        }
    }

    /// Assert that no text frame arrives within the quiet period.
    pub async fn expect_silence(&mut self) {
        if let Ok(Some(Ok(msg))) = timeout(QUIET_PERIOD, self.ws.next()).await {
            assert!(!msg.is_text(), "unexpected message: {msg:?}");
        }
    }

    /// Close the connection gracefully.
    pub async fn close(mut self) {
        let _ = self.ws.close(None).await;
    }
}
