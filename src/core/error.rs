//! Error types for the CPUMonitorJr bridge.

use thiserror::Error;

/// Top-level bridge errors.
///
/// Only startup can fail: once the bridge is running, transport errors are
/// absorbed at the tick or datagram where they happen.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
