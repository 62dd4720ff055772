//! Relay WebSocket handler.
//!
//! Upgrades `/ws/:room_id` and hands the socket to a relay session.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use tokio::sync::Mutex;

use crate::relay::{ChannelError, ParticipantChannel, RelaySession};
use crate::web::handlers::AppState;

/// Participant channel over an axum WebSocket.
///
/// The socket is split so that the session's outbox writer never waits on
/// its pending read.
pub struct WsChannel {
    sink: Mutex<SplitSink<WebSocket, Message>>,
    stream: Mutex<SplitStream<WebSocket>>,
}

impl WsChannel {
    /// Wrap an upgraded socket.
    pub fn new(socket: WebSocket) -> Self {
        let (sink, stream) = socket.split();
        Self {
            sink: Mutex::new(sink),
            stream: Mutex::new(stream),
        }
    }
}

#[async_trait]
impl ParticipantChannel for WsChannel {
    async fn send_text(&self, text: &str) -> Result<(), ChannelError> {
        self.sink
            .lock()
            .await
            .send(Message::Text(text.to_owned()))
            .await
            .map_err(|e| ChannelError::Transport(e.to_string()))
    }

    async fn recv_text(&self) -> Result<Option<String>, ChannelError> {
        let mut stream = self.stream.lock().await;
        loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text)),
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(Message::Binary(data))) => {
                    tracing::debug!(len = data.len(), "ignoring binary frame");
                }
                // Pings are answered by the transport
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(ChannelError::Transport(e.to_string())),
            }
        }
    }
}

/// Relay WebSocket handler.
///
/// GET /ws/:room_id
///
/// Any room ID is accepted; an unseen ID creates the room.
pub async fn relay_ws_handler(
    ws: WebSocketUpgrade,
    Path(room_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let failed_room = room_id.clone();
    ws.on_failed_upgrade(move |e| {
        tracing::debug!(room_id = %failed_room, error = %e, "WebSocket upgrade failed");
    })
    .on_upgrade(move |socket| handle_socket(socket, state, room_id))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, room_id: String) {
    let channel = Arc::new(WsChannel::new(socket));
    let summary = RelaySession::new(Arc::clone(&state.registry), room_id.as_str(), channel)
        .with_send_timeout(state.send_timeout)
        .with_outbox_capacity(state.outbox_capacity)
        .run()
        .await;

    tracing::debug!(
        room_id = %room_id,
        received = summary.received,
        delivered = summary.delivered,
        "WebSocket session ended"
    );
}
