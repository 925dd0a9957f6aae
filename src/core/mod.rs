//! CPUMonitorJr - Core traits, types, and constants.
//!
//! This module provides the foundational pieces shared by every layer of the
//! bridge: protocol constants, the top-level error type, and the traits the
//! bridge uses to pull telemetry and identity from the host.

mod constants;
mod error;
mod traits;

pub use constants::*;
pub use error::*;
pub use traits::*;
