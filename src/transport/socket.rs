//! Async UDP socket wrapper for discovery traffic.
//!
//! Discovery is broadcast based, so every socket created here has
//! `SO_BROADCAST` enabled.

use std::io;
use std::net::SocketAddr;

use tokio::net::UdpSocket;

/// Default receive buffer size. Announcements are a few dozen bytes.
pub const DEFAULT_RECV_BUFFER_SIZE: usize = 2048;

/// Broadcast-enabled UDP socket used for discovery.
#[derive(Debug)]
pub struct DiscoverySocket {
    /// The underlying UDP socket.
    socket: UdpSocket,
    /// Receive buffer.
    recv_buffer: Vec<u8>,
}

impl DiscoverySocket {
    /// Bind a discovery socket to the given address with broadcast enabled.
    pub async fn bind(addr: SocketAddr) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        socket.set_broadcast(true)?;
        Ok(Self::from_socket(socket))
    }

    /// Create a discovery socket from an existing UDP socket.
    ///
    /// The socket is used as-is; broadcast is not enabled for it.
    pub fn from_socket(socket: UdpSocket) -> Self {
        Self {
            socket,
            recv_buffer: vec![0u8; DEFAULT_RECV_BUFFER_SIZE],
        }
    }

    /// Get the local address.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Whether `SO_BROADCAST` is set.
    pub fn is_broadcast(&self) -> io::Result<bool> {
        self.socket.broadcast()
    }

    /// Send a datagram to a specific address.
    pub async fn send_to(&self, data: &[u8], addr: SocketAddr) -> io::Result<usize> {
        self.socket.send_to(data, addr).await
    }

    /// Receive a datagram and return the sender's address.
    pub async fn recv_from(&mut self) -> io::Result<(&[u8], SocketAddr)> {
        let (len, addr) = self.socket.recv_from(&mut self.recv_buffer).await?;
        Ok((&self.recv_buffer[..len], addr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_socket_bind_enables_broadcast() {
        let socket = DiscoverySocket::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        assert!(socket.local_addr().unwrap().port() != 0);
        assert!(socket.is_broadcast().unwrap());
    }

    #[tokio::test]
    async fn test_socket_send_recv() {
        let mut server = DiscoverySocket::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let server_addr = server.local_addr().unwrap();

        let client = DiscoverySocket::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();

        let data = b"CPUMonitorJr;192.168.1.50;44447";
        client.send_to(data, server_addr).await.unwrap();

        let (received, from) = server.recv_from().await.unwrap();
        assert_eq!(received, data);
        assert_eq!(from, client.local_addr().unwrap());
    }
}
