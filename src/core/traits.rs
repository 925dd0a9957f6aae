//! Collaborator traits.
//!
//! The bridge never reads the OS directly. Each tick it asks a
//! [`TelemetrySource`] for a [`StatsSample`] and, when an identity frame is
//! due, asks an [`IdentitySource`] for the host [`Identity`]. Implementations
//! must not fail: missing data degrades to zeros or placeholder strings.

use async_trait::async_trait;

use crate::codec::{Identity, StatsSample};

/// Source of per-tick system statistics.
pub trait TelemetrySource: Send {
    /// Sample memory, per-core utilisation and temperatures right now.
    fn sample(&mut self) -> StatsSample;
}

/// Source of the host's identity strings.
#[async_trait]
pub trait IdentitySource: Send {
    /// Resolve host name, LAN address and external address.
    async fn identity(&mut self) -> Identity;

    /// Resolve only the LAN address (used for discovery broadcasts).
    async fn lan_address(&mut self) -> String {
        self.identity().await.lan_address
    }
}

/// A fixed sample, reported on every tick.
impl TelemetrySource for StatsSample {
    fn sample(&mut self) -> StatsSample {
        self.clone()
    }
}

/// A fixed identity, useful when the addresses are known up front.
#[async_trait]
impl IdentitySource for Identity {
    async fn identity(&mut self) -> Identity {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_identity_source() {
        let mut source = Identity::new("box", "192.168.1.5", "203.0.113.9");
        assert_eq!(source.identity().await, source.clone());
        assert_eq!(source.lan_address().await, "192.168.1.5");
    }

    #[test]
    fn test_static_telemetry_source() {
        let mut source = StatsSample {
            memory_percent: 12.5,
            core_percents: vec![3.0, 4.0],
            ..Default::default()
        };
        assert_eq!(source.sample(), source.clone());
    }
}
