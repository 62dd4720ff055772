//! Configuration module for roomcast.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::{Result, RoomcastError};

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8088
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Relay configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Upper bound for a single push to one peer, in milliseconds (0 = no bound).
    #[serde(default = "default_send_timeout")]
    pub send_timeout_ms: u64,
    /// Payloads queued per participant before further pushes are dropped.
    #[serde(default = "default_outbox_capacity")]
    pub outbox_capacity: usize,
}

fn default_send_timeout() -> u64 {
    5000
}

fn default_outbox_capacity() -> usize {
    64
}

impl RelayConfig {
    /// Send timeout as a `Duration`, or `None` when unbounded.
    pub fn send_timeout(&self) -> Option<Duration> {
        if self.send_timeout_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.send_timeout_ms))
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            send_timeout_ms: default_send_timeout(),
            outbox_capacity: default_outbox_capacity(),
        }
    }
}

/// Web page configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// Whether to serve static files under `/static`.
    #[serde(default = "default_serve_static")]
    pub serve_static: bool,
    /// Path to static files directory.
    #[serde(default = "default_static_path")]
    pub static_path: String,
    /// Host used for generated links when the request has no `Host` header.
    #[serde(default = "default_public_host")]
    pub public_host: String,
}

fn default_serve_static() -> bool {
    true
}

fn default_static_path() -> String {
    "static".to_string()
}

fn default_public_host() -> String {
    "localhost:8088".to_string()
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            serve_static: default_serve_static(),
            static_path: default_static_path(),
            public_host: default_public_host(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log file path. Empty means console only.
    #[serde(default)]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: String::new(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Relay configuration.
    #[serde(default)]
    pub relay: RelayConfig,
    /// Web page configuration.
    #[serde(default)]
    pub web: WebConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(RoomcastError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| RoomcastError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `ROOMCAST_HOST`: Override the bind host
    /// - `ROOMCAST_PORT`: Override the bind port
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("ROOMCAST_HOST") {
            if !host.is_empty() {
                self.server.host = host;
            }
        }

        if let Ok(port) = std::env::var("ROOMCAST_PORT") {
            match port.parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) if port.is_empty() => {}
                Err(e) => eprintln!("Ignoring ROOMCAST_PORT={port}: {e}"),
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - The bind host is empty
    /// - The relay outbox capacity is zero
    /// - Static serving is enabled without a static path
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(RoomcastError::Validation(
                "server.host must not be empty".to_string(),
            ));
        }
        if self.relay.outbox_capacity == 0 {
            return Err(RoomcastError::Validation(
                "relay.outbox_capacity must be at least 1".to_string(),
            ));
        }
        if self.web.serve_static && self.web.static_path.trim().is_empty() {
            return Err(RoomcastError::Validation(
                "web.serve_static is enabled but web.static_path is not set".to_string(),
            ));
        }
        Ok(())
    }

    /// Socket address string for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
