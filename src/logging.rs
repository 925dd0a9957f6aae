//! Tracing subscriber setup
//!
//! Installs a global `tracing` subscriber with:
//! - an `EnvFilter` (`RUST_LOG` wins, else the configured level)
//! - a compact layer on stderr
//! - a plain-text layer appending to the log file, when one is configured
//!   and can be opened
//!
//! Initialisation is idempotent: a second call is a no-op.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing::{Level, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::BridgeConfig;

/// Initialise logging from the bridge configuration.
pub fn init_from_config(config: &BridgeConfig) -> Result<(), String> {
    init(&config.log_level, config.log_file())
}

/// Initialise logging at `level`, optionally mirrored to `log_file`.
///
/// A log file that cannot be opened is reported once on stderr and skipped.
pub fn init(level: &str, log_file: Option<&Path>) -> Result<(), String> {
    let level = parse_log_level(level)?;
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_ascii_lowercase()));

    let (file, file_error) = match log_file.map(open_log_file) {
        Some(Ok(file)) => (Some(file), None),
        Some(Err(e)) => (None, Some(e)),
        None => (None, None),
    };

    let stderr_layer = fmt::layer().compact().with_writer(io::stderr);
    let file_layer = file.map(|file| {
        fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_writer(Mutex::new(file))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .or_else(|e| {
            // Tests and embedders may have installed a subscriber already.
            if e.to_string().contains("a global default trace dispatcher has already been set") {
                Ok(())
            } else {
                Err(format!("failed to initialize tracing: {e}"))
            }
        })?;

    if let (Some(path), Some(e)) = (log_file, file_error) {
        warn!(path = %path.display(), error = %e, "log file unavailable; logging to stderr only");
    }
    Ok(())
}

/// Open `path` for appending, creating its directory if needed.
fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

fn parse_log_level(level: &str) -> Result<Level, String> {
    match level.to_ascii_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(format!(
            "invalid log level '{level}'. Must be one of: trace, debug, info, warn, error"
        )),
    }
}
