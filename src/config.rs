//! Bridge configuration using Figment
//!
//! Configuration is merged from, in increasing priority:
//! 1. Built-in defaults
//! 2. An optional TOML file (`--config`)
//! 3. Environment variables prefixed with `CPUMONITORJR_`
//!
//! Command line flags are applied on top by the binary.
//!
//! # Example
//! ```no_run
//! use cpumonitorjr::config::BridgeConfig;
//!
//! let config = BridgeConfig::load(None)?;
//! println!("listening on UDP port {}", config.udp_port);
//! # Ok::<(), cpumonitorjr::config::ConfigError>(())
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::core::{
    BridgeError, DEFAULT_CONNECT_TIMEOUT, DEFAULT_SEND_INTERVAL, DEFAULT_UDP_PORT,
    MIN_SEND_INTERVAL,
};

/// Prefix of every environment variable read by [`BridgeConfig::load`].
pub const ENV_PREFIX: &str = "CPUMONITORJR_";

/// Default log file location.
pub const DEFAULT_LOG_FILE: &str = "/var/log/CPUMonitorJr/CPUMonitorJr.log";

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration loading or validation failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or a value had the wrong type.
    #[error("failed to load configuration: {0}")]
    Extract(#[from] figment::Error),

    /// The explicitly requested config file does not exist.
    #[error("config file not found: {}", .0.display())]
    MissingFile(PathBuf),

    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for BridgeError {
    fn from(err: ConfigError) -> Self {
        BridgeError::Config(err.to_string())
    }
}

/// Runtime settings of the bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// UDP discovery port; also embedded in the WebSocket path.
    pub udp_port: u16,
    /// Seconds between ticks. Values below 0.2 are raised to 0.2.
    pub interval: f64,
    /// Broadcast host announcements every 5 s.
    #[serde(deserialize_with = "deserialize_flag")]
    pub send_discovery: bool,
    /// Log file path. An empty path disables file logging.
    pub log_file: PathBuf,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Seconds allowed for a single connect attempt.
    pub connect_timeout: f64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            udp_port: DEFAULT_UDP_PORT,
            interval: DEFAULT_SEND_INTERVAL.as_secs_f64(),
            send_discovery: false,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            log_level: "info".to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT.as_secs_f64(),
        }
    }
}

impl BridgeConfig {
    /// Load defaults, then `path` (if given), then the environment, and
    /// validate the result.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::MissingFile(path.to_path_buf()));
            }
            figment = figment.merge(Toml::file(path));
        }

        let config: Self = figment.merge(Env::prefixed(ENV_PREFIX)).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the bridge cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.udp_port == 0 {
            return Err(ConfigError::Invalid("udp_port must be non-zero".into()));
        }

        if !VALID_LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                VALID_LOG_LEVELS.join(", ")
            )));
        }

        if !self.interval.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "interval must be a finite number of seconds, got {}",
                self.interval
            )));
        }

        if !(self.connect_timeout.is_finite() && self.connect_timeout > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "connect_timeout must be a positive number of seconds, got {}",
                self.connect_timeout
            )));
        }

        Ok(())
    }

    /// Tick interval with the 200 ms floor applied.
    pub fn interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.interval)
            .map(|interval| interval.max(MIN_SEND_INTERVAL))
            .unwrap_or(MIN_SEND_INTERVAL)
    }

    /// Connect timeout, falling back to the default when out of range.
    pub fn connect_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.connect_timeout)
            .ok()
            .filter(|timeout| !timeout.is_zero())
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT)
    }

    /// Log file, unless file logging is disabled.
    pub fn log_file(&self) -> Option<&Path> {
        Some(self.log_file.as_path()).filter(|path| !path.as_os_str().is_empty())
    }
}

/// Accept `true`/`false`, `1`/`0` and their string forms.
fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Int(value) => value == 1,
        Flag::Text(value) => matches!(value.trim(), "1" | "true" | "True"),
    })
}
