//! CPUMonitorJr - Discovery
//!
//! The display announces itself over UDP broadcast. [`DiscoveryListener`]
//! turns those announcements into [`DiscoveryEvent`]s on a channel; the
//! bridge driver feeds them to the connection manager. The optional
//! [`DiscoveryBroadcaster`] prompts the display by announcing the host.

mod announcement;
mod broadcaster;
mod listener;

pub use announcement::*;
pub use broadcaster::*;
pub use listener::*;
