//! CPUMonitorJr - Send Session
//!
//! [`SendScheduler`] owns the connection manager and the [`SendState`] flags
//! and decides, once per tick, whether to send a time, identity or stats
//! frame.

mod scheduler;
mod state;

pub use scheduler::*;
pub use state::*;
