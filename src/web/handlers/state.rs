//! Shared application state for handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::relay::RoomRegistry;

/// Application state shared across handlers.
pub struct AppState {
    /// Room registry shared by every relay session.
    pub registry: Arc<RoomRegistry>,
    /// Bound for a single push to one participant.
    pub send_timeout: Option<Duration>,
    /// Payloads queued per participant.
    pub outbox_capacity: usize,
    /// Host used for links when the request has no `Host` header.
    pub public_host: String,
}

impl AppState {
    /// Create a new application state around an existing registry.
    pub fn new(registry: Arc<RoomRegistry>, config: &Config) -> Self {
        Self {
            registry,
            send_timeout: config.relay.send_timeout(),
            outbox_capacity: config.relay.outbox_capacity,
            public_host: config.web.public_host.clone(),
        }
    }

    /// Create a new application state with a fresh registry.
    pub fn from_config(config: &Config) -> Self {
        Self::new(Arc::new(RoomRegistry::new()), config)
    }
}
