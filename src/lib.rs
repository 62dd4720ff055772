//! roomcast - room-based WebSocket relay
//!
//! Hands out random room IDs, serves share and view pages, and relays text
//! messages between the participants of each room.

pub mod config;
pub mod error;
pub mod logging;
pub mod relay;
pub mod web;

pub use config::Config;
pub use error::{Result, RoomcastError};
pub use relay::{
    new_room_id, ChannelError, Membership, Participant, ParticipantChannel, ParticipantId,
    RelaySession, RoomRegistry,
};
pub use web::WebServer;
