//! Relay session for roomcast.
//!
//! A session owns one participant channel for the lifetime of a connection:
//! it joins the room, relays every inbound payload to the other members,
//! and leaves the room when the connection ends.

use std::sync::Arc;
use std::time::Duration;

use super::channel::{
    ChannelError, Outbox, Participant, ParticipantChannel, ParticipantId,
    DEFAULT_OUTBOX_CAPACITY,
};
use super::registry::{Membership, RoomRegistry};

/// Lifecycle state of a relay session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Handshake accepted, not yet registered.
    Connecting,
    /// Registered in the room.
    Joined,
    /// Waiting for and relaying inbound payloads.
    Relaying,
    /// Connection ended and registration released.
    Closed,
}

impl SessionState {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Connecting => "connecting",
            SessionState::Joined => "joined",
            SessionState::Relaying => "relaying",
            SessionState::Closed => "closed",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// The client closed the connection.
    ClientClosed,
    /// The transport failed.
    TransportError(String),
}

/// Result of relaying one payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayOutcome {
    /// Peers the payload was queued for.
    pub delivered: usize,
    /// Peers whose outbox was full or already closed.
    pub failed: usize,
}

/// Summary returned when a session ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// Inbound payloads received from the client.
    pub received: u64,
    /// Payloads queued for peers across all inbound payloads.
    pub delivered: u64,
    /// Why the session ended.
    pub reason: CloseReason,
}

/// Queue `text` for every participant of `room_id` except `sender`.
///
/// Never waits on a peer: each payload lands in the peer's outbox and the
/// peer's own session forwards it. A peer whose outbox is full or closed
/// misses this payload and nothing else is affected.
pub fn relay_message(
    registry: &RoomRegistry,
    room_id: &str,
    sender: ParticipantId,
    text: &str,
) -> RelayOutcome {
    let mut outcome = RelayOutcome::default();
    for peer in registry
        .broadcast_candidates(room_id)
        .iter()
        .filter(|p| p.id() != sender)
    {
        match peer.enqueue(text) {
            Ok(()) => outcome.delivered += 1,
            Err(e) => {
                outcome.failed += 1;
                tracing::debug!(
                    room_id = %room_id,
                    participant = %peer.id(),
                    error = %e,
                    "push to peer failed"
                );
            }
        }
    }
    outcome
}

/// One connection's relay lifecycle.
pub struct RelaySession {
    registry: Arc<RoomRegistry>,
    room_id: String,
    channel: Arc<dyn ParticipantChannel>,
    participant: Participant,
    outbox: Option<Outbox>,
    send_timeout: Option<Duration>,
    state: SessionState,
}

impl RelaySession {
    /// Create a session for a channel whose handshake has completed.
    pub fn new(
        registry: Arc<RoomRegistry>,
        room_id: impl Into<String>,
        channel: Arc<dyn ParticipantChannel>,
    ) -> Self {
        let (participant, outbox) = Participant::new(DEFAULT_OUTBOX_CAPACITY);
        Self {
            registry,
            room_id: room_id.into(),
            channel,
            participant,
            outbox: Some(outbox),
            send_timeout: None,
            state: SessionState::Connecting,
        }
    }

    /// Bound each push to this session's channel by `timeout`.
    ///
    /// A push that exceeds the bound ends the session.
    pub fn with_send_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// Queue at most `capacity` payloads for this session's channel.
    pub fn with_outbox_capacity(mut self, capacity: usize) -> Self {
        let (participant, outbox) = Participant::new(capacity);
        self.participant = participant;
        self.outbox = Some(outbox);
        self
    }

    /// Get the room ID.
    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    /// Get this session's participant ID.
    pub fn participant_id(&self) -> ParticipantId {
        self.participant.id()
    }

    /// Get the current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    fn transition(&mut self, next: SessionState) {
        tracing::trace!(
            room_id = %self.room_id,
            participant = %self.participant.id(),
            from = %self.state,
            to = %next,
            "session state"
        );
        self.state = next;
    }

    async fn relay_inbound(&self, received: &mut u64, delivered: &mut u64) -> CloseReason {
        loop {
            match self.channel.recv_text().await {
                Ok(Some(text)) => {
                    *received += 1;
                    let outcome =
                        relay_message(&self.registry, &self.room_id, self.participant.id(), &text);
                    *delivered += outcome.delivered as u64;
                }
                Ok(None) | Err(ChannelError::Closed) => return CloseReason::ClientClosed,
                Err(e) => return CloseReason::TransportError(e.to_string()),
            }
        }
    }

    /// Run the session until the connection ends.
    ///
    /// Inbound payloads are relayed while the outbox is forwarded to the
    /// channel; whichever side fails first ends the session. The room
    /// registration is held by a guard for the whole run, so it is released
    /// on every exit path, including cancellation of the task running this
    /// future.
    pub async fn run(mut self) -> SessionSummary {
        let outbox = self.outbox.take();
        let membership = Membership::acquire(
            Arc::clone(&self.registry),
            self.room_id.clone(),
            self.participant.clone(),
        );
        self.transition(SessionState::Joined);
        tracing::info!(
            room_id = %self.room_id,
            participant = %self.participant.id(),
            "participant joined"
        );

        self.transition(SessionState::Relaying);
        let mut received = 0u64;
        let mut delivered = 0u64;
        let channel = Arc::clone(&self.channel);
        let send_timeout = self.send_timeout;
        let writer = async move {
            match outbox {
                Some(outbox) => outbox.drain(channel.as_ref(), send_timeout).await,
                None => std::future::pending().await,
            }
        };
        let reason = tokio::select! {
            reason = self.relay_inbound(&mut received, &mut delivered) => reason,
            result = writer => match result {
                Ok(()) => CloseReason::ClientClosed,
                Err(e) => CloseReason::TransportError(e.to_string()),
            },
        };

        drop(membership);
        self.transition(SessionState::Closed);
        tracing::info!(
            room_id = %self.room_id,
            participant = %self.participant.id(),
            received,
            reason = ?reason,
            "participant disconnected"
        );

        SessionSummary {
            received,
            delivered,
            reason,
        }
    }
}
