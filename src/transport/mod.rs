//! CPUMonitorJr - Transport Layer
//!
//! This module owns everything that touches the network:
//!
//! - **Discovery socket**: [`DiscoverySocket`], a broadcast-enabled tokio UDP
//!   socket wrapper used by the discovery listener and broadcaster
//! - **Connection state machine**: [`ConnectionManager`], the single
//!   persistent link to the display, rebuilt on address change or failure
//! - **Link abstraction**: [`Connector`] and [`FrameLink`], implemented for
//!   WebSockets by [`WebSocketConnector`] (feature `websocket`)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           Send Scheduler                │
//! ├─────────────────────────────────────────┤
//! │         Transport Layer                 │  ← This module
//! │   connection manager, links, sockets    │
//! ├─────────────────────────────────────────┤
//! │       WebSocket (TCP)   │   UDP         │
//! └─────────────────────────────────────────┘
//! ```

mod connection;
mod error;
mod socket;
#[cfg(feature = "websocket")]
mod websocket;

#[cfg(test)]
pub(crate) mod testing;

pub use connection::*;
pub use error::*;
pub use socket::*;
#[cfg(feature = "websocket")]
pub use websocket::*;
