//! Transport layer error types.
//!
//! None of these errors is fatal to the bridge. A failed connect leaves the
//! manager disconnected until the next tick; a failed send drops the link.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Transport layer errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// I/O error (socket operations).
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// The connection could not be opened in time.
    #[error("connect timed out after {0:?}")]
    ConnectTimeout(Duration),

    /// The close handshake did not finish in time.
    #[error("close timed out")]
    CloseTimeout,

    /// The remote end closed the connection.
    #[error("connection closed")]
    ConnectionClosed,

    /// No link is currently open.
    #[error("not connected")]
    NotConnected,

    /// The advertised address cannot be turned into an endpoint.
    #[error("invalid target address: {0:?}")]
    InvalidTarget(String),

    /// WebSocket protocol error.
    #[error("websocket error: {0}")]
    WebSocket(String),
}

#[cfg(feature = "websocket")]
impl From<tokio_tungstenite::tungstenite::Error> for TransportError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        use tokio_tungstenite::tungstenite::Error as WsError;

        match err {
            WsError::ConnectionClosed | WsError::AlreadyClosed => TransportError::ConnectionClosed,
            WsError::Io(e) => TransportError::Io(e),
            other => TransportError::WebSocket(other.to_string()),
        }
    }
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;
