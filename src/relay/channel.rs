//! Participant channel abstraction.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

/// Default number of payloads queued per participant.
pub const DEFAULT_OUTBOX_CAPACITY: usize = 64;

/// Errors raised by a participant channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The remote side has gone away.
    #[error("channel closed")]
    Closed,

    /// The underlying transport failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// A push did not complete within the configured bound.
    #[error("send timed out after {0:?}")]
    Timeout(Duration),

    /// The participant's outbox is full.
    #[error("outbox full")]
    Backlogged,
}

/// One connected client's bidirectional text link.
///
/// Both operations take `&self`: the owning session receives while peer
/// sessions push through a shared handle.
#[async_trait]
pub trait ParticipantChannel: Send + Sync {
    /// Push a text payload to the remote side.
    async fn send_text(&self, text: &str) -> Result<(), ChannelError>;

    /// Wait for the next text payload.
    ///
    /// Returns `Ok(None)` once the remote side has closed the connection.
    async fn recv_text(&self) -> Result<Option<String>, ChannelError>;
}

/// Identity of a participant within the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticipantId(Uuid);

impl ParticipantId {
    /// Allocate a new random participant ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ParticipantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered participant: its identity and the sending half of its outbox.
///
/// Peers never touch the participant's channel directly. They enqueue into
/// the outbox, and the owning session drains it into the channel, so a slow
/// channel only backs up its own queue.
#[derive(Clone)]
pub struct Participant {
    id: ParticipantId,
    outbox: mpsc::Sender<String>,
}

impl Participant {
    /// Create a participant under a fresh ID with an outbox of `capacity`.
    pub fn new(capacity: usize) -> (Self, Outbox) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let participant = Self {
            id: ParticipantId::new(),
            outbox: tx,
        };
        (participant, Outbox { queue: rx })
    }

    /// Get the participant ID.
    pub fn id(&self) -> ParticipantId {
        self.id
    }

    /// Queue a payload for this participant without waiting.
    pub fn enqueue(&self, text: &str) -> Result<(), ChannelError> {
        self.outbox
            .try_send(text.to_owned())
            .map_err(|e| match e {
                TrySendError::Full(_) => ChannelError::Backlogged,
                TrySendError::Closed(_) => ChannelError::Closed,
            })
    }
}

impl fmt::Debug for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Participant").field("id", &self.id).finish()
    }
}

/// Receiving half of a participant's outbox.
pub struct Outbox {
    queue: mpsc::Receiver<String>,
}

impl Outbox {
    /// Wait for the next queued payload.
    pub async fn next(&mut self) -> Option<String> {
        self.queue.recv().await
    }

    /// Forward queued payloads to `channel` in order.
    ///
    /// Each push is bounded by `send_timeout` when set. Returns the first
    /// push error; the outbox is dropped with it, so later enqueues fail
    /// with [`ChannelError::Closed`].
    pub async fn drain(
        mut self,
        channel: &dyn ParticipantChannel,
        send_timeout: Option<Duration>,
    ) -> Result<(), ChannelError> {
        while let Some(text) = self.next().await {
            match send_timeout {
                Some(limit) => tokio::time::timeout(limit, channel.send_text(&text))
                    .await
                    .map_err(|_| ChannelError::Timeout(limit))??,
                None => channel.send_text(&text).await?,
            }
        }
        Ok(())
    }
}
