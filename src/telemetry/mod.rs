//! CPUMonitorJr - Host Collaborators
//!
//! Default [`TelemetrySource`](crate::core::TelemetrySource) and
//! [`IdentitySource`](crate::core::IdentitySource) implementations backed by
//! the operating system.

mod identity;
mod system;

pub use identity::*;
pub use system::*;
