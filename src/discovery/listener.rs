//! UDP discovery listener.

use std::io;
use std::net::{Ipv4Addr, SocketAddr};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

use super::announcement::{is_host_announcement, parse_announcement};
use crate::bridge::Shutdown;
use crate::transport::DiscoverySocket;

/// A candidate display address learned from an announcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryEvent {
    /// Address advertised inside the datagram.
    pub address: String,
    /// Socket address the datagram came from.
    pub source: SocketAddr,
}

/// Receives display announcements and forwards candidate addresses.
#[derive(Debug)]
pub struct DiscoveryListener {
    socket: DiscoverySocket,
}

impl DiscoveryListener {
    /// Bind `0.0.0.0:port` with broadcast enabled.
    pub async fn bind(port: u16) -> io::Result<Self> {
        Self::bind_addr(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port))).await
    }

    /// Bind to an explicit address.
    pub async fn bind_addr(addr: SocketAddr) -> io::Result<Self> {
        let socket = DiscoverySocket::bind(addr).await?;
        Ok(Self { socket })
    }

    /// Get the bound address.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Receive datagrams until shutdown or until the receiving side is gone.
    ///
    /// Receive errors never stop the loop.
    pub async fn run(mut self, events: mpsc::Sender<DiscoveryEvent>, shutdown: Shutdown) {
        loop {
            tokio::select! {
                _ = shutdown.wait() => {
                    debug!("discovery listener stopping");
                    break;
                }
                result = self.socket.recv_from() => {
                    let event = match result {
                        Ok((data, source)) => Self::classify(data, source),
                        Err(e) => {
                            debug!(error = %e, "discovery receive failed");
                            continue;
                        }
                    };

                    let Some(event) = event else { continue };
                    info!(
                        source = %event.source,
                        address = %event.address,
                        "display announcement received"
                    );
                    if events.send(event).await.is_err() {
                        debug!("discovery receiver dropped; listener stopping");
                        break;
                    }
                }
            }
        }
    }

    /// Spawn [`run`](Self::run) on the current runtime.
    pub fn spawn(
        self,
        events: mpsc::Sender<DiscoveryEvent>,
        shutdown: Shutdown,
    ) -> JoinHandle<()> {
        tokio::spawn(self.run(events, shutdown))
    }

    fn classify(data: &[u8], source: SocketAddr) -> Option<DiscoveryEvent> {
        if is_host_announcement(data) {
            trace!(source = %source, "ignoring host announcement");
            return None;
        }

        match parse_announcement(data) {
            Some(address) => Some(DiscoveryEvent { address, source }),
            None => {
                trace!(source = %source, len = data.len(), "ignoring non-announcement datagram");
                None
            }
        }
    }
}
