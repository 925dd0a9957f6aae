//! Optional active discovery broadcast.

use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use super::announcement::build_pc_announcement;
use crate::bridge::Shutdown;
use crate::core::BROADCAST_INTERVAL;
use crate::transport::DiscoverySocket;

/// Periodically broadcasts `CPUMonitorJr-PC;<lan>` to prompt the display.
#[derive(Debug)]
pub struct DiscoveryBroadcaster {
    socket: DiscoverySocket,
    destination: SocketAddr,
    payload: Vec<u8>,
    interval: Duration,
}

impl DiscoveryBroadcaster {
    /// Bind an ephemeral broadcast socket that announces `lan_address` to
    /// `255.255.255.255:port`.
    pub async fn bind(port: u16, lan_address: &str) -> io::Result<Self> {
        let socket = DiscoverySocket::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))).await?;
        Ok(Self {
            socket,
            destination: SocketAddr::from((Ipv4Addr::BROADCAST, port)),
            payload: build_pc_announcement(lan_address),
            interval: BROADCAST_INTERVAL,
        })
    }

    /// Send to a different destination.
    pub fn with_destination(mut self, destination: SocketAddr) -> Self {
        self.destination = destination;
        self
    }

    /// Set the broadcast period.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Payload sent on every announcement.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Send a single announcement.
    pub async fn announce_once(&self) -> io::Result<()> {
        self.socket.send_to(&self.payload, self.destination).await?;
        Ok(())
    }

    /// Announce every interval until shutdown. Send errors are logged only.
    pub async fn run(self, shutdown: Shutdown) {
        info!(
            destination = %self.destination,
            interval_ms = self.interval.as_millis() as u64,
            "active discovery enabled"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.wait() => {
                    debug!("discovery broadcaster stopping");
                    break;
                }
                _ = ticker.tick() => {
                    match self.announce_once().await {
                        Ok(()) => debug!("sent active discovery broadcast"),
                        Err(e) => debug!(error = %e, "active discovery send failed"),
                    }
                }
            }
        }
    }

    /// Spawn [`run`](Self::run) on the current runtime.
    pub fn spawn(self, shutdown: Shutdown) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}
