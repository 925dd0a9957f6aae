//! # CPUMonitorJr
//!
//! Host-side bridge for the CPUMonitorJr display.
//!
//! The display announces its address over UDP broadcast. The bridge listens
//! for those announcements, keeps one persistent WebSocket link to the most
//! recently advertised address, and on every tick sends exactly one binary
//! frame:
//!
//! - **Time**: local wall-clock time, sent first on every new connection and
//!   again every 24 hours
//! - **Identity**: host name, LAN address and external address, sent once
//!   after the first time frame of a connection
//! - **Stats**: memory, per-core CPU utilisation and temperatures, every
//!   other tick
//!
//! ## Feature Flags
//!
//! - `websocket` (default): WebSocket [`Connector`](transport::Connector)
//! - `system` (default): telemetry and identity read from the host OS
//! - `logging` (default): `tracing-subscriber` setup
//! - `cli` (default): the `cpumonitorjr` binary
//!
//! ## Modules
//!
//! - [`core`]: constants, error types and collaborator traits
//! - [`codec`]: frame encoding
//! - [`transport`]: discovery socket, connection manager, WebSocket link
//! - [`discovery`]: announcement parsing, listener and broadcaster
//! - [`session`]: per-tick frame selection and delivery
//! - [`bridge`]: lifecycle and shutdown
//! - [`config`]: layered configuration
//!
//! ## Example Usage
//!
//! ```rust
//! use cpumonitorjr::prelude::*;
//! use chrono::NaiveDate;
//!
//! let now = NaiveDate::from_ymd_opt(2025, 6, 15)
//!     .unwrap()
//!     .and_hms_opt(14, 30, 45)
//!     .unwrap();
//! let frame = Frame::time(&now);
//! assert_eq!(frame.as_bytes(), &[0, 25, 6, 15, 0, 14, 30, 45]);
//!
//! let stats = Frame::stats(&StatsSample {
//!     memory_percent: 42.37,
//!     core_percents: vec![0.2, 99.6, 100.4],
//!     average_temperature: 47.3,
//!     max_temperature: 61.0,
//! });
//! assert_eq!(stats.as_bytes(), &[2, 42, 4, 47, 3, 61, 0, 3, 0, 100, 100]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Core module (always included)
pub mod core;

pub mod bridge;
pub mod codec;
pub mod config;
pub mod discovery;
pub mod session;
pub mod transport;

// Host collaborators (feature-gated)
#[cfg(feature = "system")]
#[cfg_attr(docsrs, doc(cfg(feature = "system")))]
pub mod telemetry;

// Subscriber setup (feature-gated)
#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bridge::{Bridge, Shutdown, shutdown_on_signals};
    pub use crate::codec::{Frame, FrameKind, Identity, StatsSample};
    pub use crate::config::BridgeConfig;
    pub use crate::core::*;
    pub use crate::session::{SendScheduler, SendState, TickOutcome};
    pub use crate::transport::{
        ConnectionManager, ConnectionPhase, Connector, FrameLink, TransportError,
        TransportResult,
    };

    #[cfg(feature = "websocket")]
    pub use crate::transport::WebSocketConnector;

    #[cfg(feature = "system")]
    pub use crate::telemetry::{SystemIdentity, SystemTelemetry};
}

// Re-export commonly used items at crate root
pub use crate::bridge::{Bridge, Shutdown};
pub use crate::codec::{Frame, FrameKind, Identity, StatsSample};
pub use crate::config::BridgeConfig;
pub use crate::core::{BridgeError, BridgeResult, IdentitySource, TelemetrySource};
