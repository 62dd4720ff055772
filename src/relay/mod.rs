//! Room relay for roomcast.
//!
//! This module provides the per-room broadcast relay:
//! - A participant channel abstraction (send text / receive text) and the
//!   per-participant outbox peers push into
//! - The room registry mapping room IDs to joined participants
//! - The relay session driving one connection from join to cleanup

mod channel;
mod registry;
mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use channel::{
    ChannelError, Outbox, Participant, ParticipantChannel, ParticipantId, DEFAULT_OUTBOX_CAPACITY,
};
pub use registry::{Membership, RoomRegistry};
pub use session::{
    relay_message, CloseReason, RelayOutcome, RelaySession, SessionState, SessionSummary,
};

/// Generate a fresh room identifier.
///
/// The identifier is a random UUID v4 in canonical hyphenated form.
/// Uniqueness is assumed, not checked against the registry.
pub fn new_room_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
