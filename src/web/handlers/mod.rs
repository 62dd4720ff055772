//! HTTP handlers for the web pages.

pub mod pages;
pub mod state;

pub use pages::{generate_room, share_screen, view_screen};
pub use state::AppState;
