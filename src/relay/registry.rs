//! Room registry for roomcast.
//!
//! Maps room IDs to the participants currently joined to them. Rooms are
//! created on first join and are never removed, so a long-lived process
//! accumulates one empty entry per room that has ever been used.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use super::channel::{Participant, ParticipantId};

type Members = Arc<Mutex<Vec<Participant>>>;

/// Registry of rooms and their joined participants.
///
/// The room map and each room's member list are locked independently, so
/// traffic in one room never contends with another room beyond the brief
/// map lookup. No lock is ever held across an `.await`.
#[derive(Default)]
pub struct RoomRegistry {
    /// Member lists indexed by room ID.
    rooms: RwLock<HashMap<String, Members>>,
}

impl RoomRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn members(&self, room_id: &str) -> Option<Members> {
        self.rooms.read().get(room_id).cloned()
    }

    fn members_or_create(&self, room_id: &str) -> Members {
        if let Some(members) = self.members(room_id) {
            return members;
        }
        Arc::clone(self.rooms.write().entry(room_id.to_string()).or_default())
    }

    /// Add a participant to a room, creating the room if needed.
    ///
    /// Returns false if the participant was already in the room.
    pub fn join(&self, room_id: &str, participant: Participant) -> bool {
        let members = self.members_or_create(room_id);
        let mut members = members.lock();
        if members.iter().any(|p| p.id() == participant.id()) {
            return false;
        }
        members.push(participant);
        true
    }

    /// Remove a participant from a room.
    ///
    /// Returns false if the room or participant was not found. The room
    /// entry itself is kept even when it becomes empty.
    pub fn leave(&self, room_id: &str, participant_id: ParticipantId) -> bool {
        let Some(members) = self.members(room_id) else {
            return false;
        };
        let mut members = members.lock();
        match members.iter().position(|p| p.id() == participant_id) {
            Some(index) => {
                members.remove(index);
                true
            }
            None => false,
        }
    }

    /// Snapshot of the participants in a room, in join order.
    ///
    /// An unknown room yields an empty list.
    pub fn broadcast_candidates(&self, room_id: &str) -> Vec<Participant> {
        self.members(room_id)
            .map(|members| members.lock().clone())
            .unwrap_or_default()
    }

    /// Check if a participant is in a room.
    pub fn contains(&self, room_id: &str, participant_id: ParticipantId) -> bool {
        self.members(room_id)
            .is_some_and(|members| members.lock().iter().any(|p| p.id() == participant_id))
    }

    /// Get the number of participants in a room.
    pub fn participant_count(&self, room_id: &str) -> usize {
        self.members(room_id)
            .map(|members| members.lock().len())
            .unwrap_or(0)
    }

    /// Get the number of rooms ever joined, including empty ones.
    pub fn room_count(&self) -> usize {
        self.rooms.read().len()
    }
}

/// Registration of one participant in one room.
///
/// Acquiring joins the room; dropping leaves it. The leave runs on every
/// exit path of the owning task, including cancellation. A guard whose join
/// was rejected leaves nothing on drop, so it cannot remove the existing
/// registration it collided with.
pub struct Membership {
    registry: Arc<RoomRegistry>,
    room_id: String,
    participant_id: ParticipantId,
    joined: bool,
}

impl Membership {
    /// Join `participant` to `room_id` for the lifetime of the returned guard.
    pub fn acquire(
        registry: Arc<RoomRegistry>,
        room_id: impl Into<String>,
        participant: Participant,
    ) -> Self {
        let room_id = room_id.into();
        let participant_id = participant.id();
        let joined = registry.join(&room_id, participant);
        if !joined {
            tracing::warn!(room_id = %room_id, participant = %participant_id, "participant already joined");
        }
        Self {
            registry,
            room_id,
            participant_id,
            joined,
        }
    }

    /// Whether this guard holds the registration.
    pub fn is_joined(&self) -> bool {
        self.joined
    }

    /// Get the room ID.
    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    /// Get the participant ID.
    pub fn participant_id(&self) -> ParticipantId {
        self.participant_id
    }
}

impl Drop for Membership {
    fn drop(&mut self) {
        if !self.joined {
            return;
        }
        let removed = self.registry.leave(&self.room_id, self.participant_id);
        tracing::debug!(
            room_id = %self.room_id,
            participant = %self.participant_id,
            removed,
            "left room"
        );
    }
}
