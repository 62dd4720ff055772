//! In-memory participant channels for relay tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};

use super::{ChannelError, ParticipantChannel, RoomRegistry};

/// Scripted inbound item for a mock channel.
pub type Inbound = Result<String, ChannelError>;

/// Channel backed by unbounded mpsc queues.
///
/// Dropping the inbound sender closes the channel.
pub struct MockChannel {
    inbound: Mutex<mpsc::UnboundedReceiver<Inbound>>,
    outbound: mpsc::UnboundedSender<String>,
    mode: SendMode,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum SendMode {
    Deliver,
    Fail,
    Stall,
}

impl MockChannel {
    fn build(
        mode: SendMode,
    ) -> (
        Arc<Self>,
        mpsc::UnboundedSender<Inbound>,
        mpsc::UnboundedReceiver<String>,
    ) {
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let channel = Arc::new(Self {
            inbound: Mutex::new(in_rx),
            outbound: out_tx,
            mode,
        });
        (channel, in_tx, out_rx)
    }

    /// A well-behaved channel.
    pub fn pair() -> (
        Arc<Self>,
        mpsc::UnboundedSender<Inbound>,
        mpsc::UnboundedReceiver<String>,
    ) {
        Self::build(SendMode::Deliver)
    }

    /// A channel whose sends always fail.
    pub fn failing() -> (
        Arc<Self>,
        mpsc::UnboundedSender<Inbound>,
        mpsc::UnboundedReceiver<String>,
    ) {
        Self::build(SendMode::Fail)
    }

    /// A channel whose sends never complete.
    pub fn stalled() -> (
        Arc<Self>,
        mpsc::UnboundedSender<Inbound>,
        mpsc::UnboundedReceiver<String>,
    ) {
        Self::build(SendMode::Stall)
    }
}

#[async_trait]
impl ParticipantChannel for MockChannel {
    async fn send_text(&self, text: &str) -> Result<(), ChannelError> {
        match self.mode {
            SendMode::Deliver => self
                .outbound
                .send(text.to_string())
                .map_err(|_| ChannelError::Closed),
            SendMode::Fail => Err(ChannelError::Transport("broken pipe".to_string())),
            SendMode::Stall => std::future::pending::<Result<(), ChannelError>>().await,
        }
    }

    async fn recv_text(&self) -> Result<Option<String>, ChannelError> {
        match self.inbound.lock().await.recv().await {
            Some(Ok(text)) => Ok(Some(text)),
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }
}

/// Wait until `room_id` holds exactly `expected` participants.
pub async fn wait_for_count(registry: &RoomRegistry, room_id: &str, expected: usize) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while registry.participant_count(room_id) != expected {
        assert!(
            tokio::time::Instant::now() < deadline,
            "room {room_id} never reached {expected} participants"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
