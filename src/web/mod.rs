//! Web module for roomcast.
//!
//! This module provides the HTTP pages (room link generation, share and
//! view pages, static assets) and the WebSocket relay endpoint.

pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;
pub mod ws;

pub use router::create_router;
pub use server::WebServer;
