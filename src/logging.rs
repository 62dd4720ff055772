//! Logging setup for roomcast.
//!
//! Events go to stdout and, when `logging.file` is set, are appended to that
//! file as well. `RUST_LOG` directives take precedence over the configured
//! level.

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;
use crate::Result;

/// Configured level, falling back to `info` for unknown names.
fn level_filter(level: &str) -> LevelFilter {
    level.trim().parse().unwrap_or(LevelFilter::INFO)
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level_filter(level).into())
        .from_env_lossy()
}

/// Open `path` for appending, creating missing parent directories.
fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Install the global subscriber described by `config`.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let file_layer = match config.file.as_str() {
        "" => None,
        path => Some(
            fmt::layer()
                .with_writer(Arc::new(open_log_file(Path::new(path))?))
                .with_ansi(false),
        ),
    };

    tracing_subscriber::registry()
        .with(env_filter(&config.level))
        .with(fmt::layer().with_target(false).compact())
        .with(file_layer)
        .init();

    Ok(())
}

/// Install a stdout-only subscriber, used when the log file cannot be opened.
pub fn init_console_only(level: &str) {
    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(fmt::layer().with_target(false).compact())
        .init();
}
