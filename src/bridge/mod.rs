//! CPUMonitorJr - Bridge Lifecycle
//!
//! [`Bridge`] binds the discovery port, spawns the listener (and optionally
//! the broadcaster), and drives the [`SendScheduler`](crate::session::SendScheduler)
//! on a fixed interval until the [`Shutdown`] signal fires.

mod service;
mod shutdown;

pub use service::*;
pub use shutdown::*;
