//! WebSocket module for real-time relay.

pub mod relay;

pub use relay::{relay_ws_handler, WsChannel};
