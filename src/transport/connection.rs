//! Connection state management for the display link.
//!
//! Exactly one persistent link exists at a time. It is opened lazily by
//! [`ConnectionManager::ensure_connected`], kept across ticks, and torn down
//! when the target address changes, the link reports itself closed, or a send
//! fails.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use super::error::{TransportError, TransportResult};
use crate::codec::Frame;
use crate::core::DEFAULT_CONNECT_TIMEOUT;

/// An open link to the display that carries whole frames.
#[async_trait]
pub trait FrameLink: Send {
    /// Send one frame as a single binary message.
    async fn send_frame(&mut self, frame: &Frame) -> TransportResult<()>;

    /// Whether the link is known to be unusable.
    fn is_closed(&self) -> bool;

    /// Close the link. Called at most once per link by the manager.
    async fn close(&mut self) -> TransportResult<()>;
}

/// Opens links to a target address.
#[async_trait]
pub trait Connector: Send {
    /// Link type produced by this connector.
    type Link: FrameLink;

    /// Open a new link to `target` (a host name or IP address).
    async fn connect(&mut self, target: &str) -> TransportResult<Self::Link>;
}

/// Connection lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    /// No target address known yet.
    Idle,
    /// Target known, no usable link.
    Disconnected,
    /// Live link bound to the current target.
    Connected,
}

/// Result of reporting an advertised address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetChange {
    /// The address was empty and was ignored.
    Ignored,
    /// Same address as the current target; nothing changed.
    Readvertised,
    /// New target; any existing link was closed.
    Changed {
        /// Previous target, if any.
        previous: Option<String>,
    },
}

/// How [`ConnectionManager::ensure_connected`] satisfied the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    /// A new link was opened on this call.
    Fresh,
    /// The existing link is still bound to the current target.
    Reused,
}

/// Owner of the target address and the single persistent link.
///
/// Invariant: when a link is present, `bound_address` holds the target that
/// was current when the link was opened.
pub struct ConnectionManager<C: Connector> {
    /// Opens new links.
    connector: C,
    /// Address of the display as last advertised.
    target: Option<String>,
    /// The live link, if any.
    link: Option<C::Link>,
    /// Target the live link was opened against.
    bound_address: Option<String>,
    /// Upper bound on a single connect attempt.
    connect_timeout: Duration,
}

impl<C: Connector> fmt::Debug for ConnectionManager<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("target", &self.target)
            .field("bound_address", &self.bound_address)
            .field("has_link", &self.link.is_some())
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl<C: Connector> ConnectionManager<C> {
    /// Create a manager with no target and the default connect timeout.
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            target: None,
            link: None,
            bound_address: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Current target address.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Address the live link is bound to.
    pub fn bound_address(&self) -> Option<&str> {
        self.link.as_ref().and(self.bound_address.as_deref())
    }

    /// Current phase.
    pub fn phase(&self) -> ConnectionPhase {
        match (&self.target, &self.link) {
            (None, _) => ConnectionPhase::Idle,
            (Some(target), Some(link))
                if !link.is_closed() && self.bound_address.as_ref() == Some(target) =>
            {
                ConnectionPhase::Connected
            }
            _ => ConnectionPhase::Disconnected,
        }
    }

    /// Record an advertised target address.
    ///
    /// A new address closes the current link so the next
    /// [`ensure_connected`](Self::ensure_connected) reconnects. Re-advertising
    /// the current address changes nothing.
    pub async fn set_target(&mut self, address: &str) -> TargetChange {
        let address = address.trim();
        if address.is_empty() {
            return TargetChange::Ignored;
        }

        if self.target.as_deref() == Some(address) {
            info!(target_addr = address, "target re-advertised");
            return TargetChange::Readvertised;
        }

        let previous = self.target.replace(address.to_string());
        info!(
            from = previous.as_deref().unwrap_or("<none>"),
            to = address,
            "target changed"
        );
        self.drop_link().await;

        TargetChange::Changed { previous }
    }

    /// Make sure a live link to the current target exists.
    ///
    /// Returns `None` when there is no target or the connect attempt failed;
    /// the caller skips this cycle and tries again on the next one.
    pub async fn ensure_connected(&mut self) -> Option<LinkStatus> {
        let Some(target) = self.target.clone() else {
            self.drop_link().await;
            return None;
        };

        if self.link.is_some() {
            let stale = self.bound_address.as_deref() != Some(target.as_str());
            let closed = self.link.as_ref().is_some_and(|link| link.is_closed());
            if !stale && !closed {
                return Some(LinkStatus::Reused);
            }
            debug!(target_addr = %target, stale, closed, "discarding unusable link");
            self.drop_link().await;
        }

        match tokio::time::timeout(self.connect_timeout, self.connector.connect(&target)).await {
            Ok(Ok(link)) => {
                info!(target_addr = %target, "connected to display");
                self.link = Some(link);
                self.bound_address = Some(target);
                Some(LinkStatus::Fresh)
            }
            Ok(Err(e)) => {
                debug!(target_addr = %target, error = %e, "connect failed");
                None
            }
            Err(_) => {
                let e = TransportError::ConnectTimeout(self.connect_timeout);
                debug!(target_addr = %target, error = %e, "connect failed");
                None
            }
        }
    }

    /// Send one frame over the live link.
    ///
    /// On failure the link is dropped so the next cycle reconnects.
    pub async fn send(&mut self, frame: &Frame) -> TransportResult<()> {
        let Some(link) = self.link.as_mut() else {
            return Err(TransportError::NotConnected);
        };

        let result = link.send_frame(frame).await;
        if result.is_err() {
            self.drop_link().await;
        }
        result
    }

    /// Close and forget the live link, if any. Close errors are logged only.
    pub async fn drop_link(&mut self) {
        self.bound_address = None;
        if let Some(mut link) = self.link.take() {
            if let Err(e) = link.close().await {
                debug!(error = %e, "error while closing link");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::StatsSample;
    use crate::transport::testing::{FakeConnector, HangingConnector};

    fn stats_frame() -> Frame {
        Frame::stats(&StatsSample::default())
    }

    #[tokio::test]
    async fn test_idle_without_target() {
        let connector = FakeConnector::new();
        let mut manager = ConnectionManager::new(connector.clone());

        assert_eq!(manager.phase(), ConnectionPhase::Idle);
        assert_eq!(manager.ensure_connected().await, None);
        assert!(connector.wire().connects.is_empty());
    }

    #[tokio::test]
    async fn test_connect_then_reuse() {
        let connector = FakeConnector::new();
        let mut manager = ConnectionManager::new(connector.clone());

        manager.set_target("192.168.1.50").await;
        assert_eq!(manager.phase(), ConnectionPhase::Disconnected);

        assert_eq!(manager.ensure_connected().await, Some(LinkStatus::Fresh));
        assert_eq!(manager.phase(), ConnectionPhase::Connected);
        assert_eq!(manager.bound_address(), Some("192.168.1.50"));

        assert_eq!(manager.ensure_connected().await, Some(LinkStatus::Reused));
        assert_eq!(connector.wire().connects, vec!["192.168.1.50"]);
    }

    #[tokio::test]
    async fn test_readvertised_target_keeps_link() {
        let connector = FakeConnector::new();
        let mut manager = ConnectionManager::new(connector.clone());

        manager.set_target("192.168.1.50").await;
        manager.ensure_connected().await;

        assert_eq!(
            manager.set_target("192.168.1.50").await,
            TargetChange::Readvertised
        );
        assert_eq!(manager.phase(), ConnectionPhase::Connected);
        assert_eq!(manager.ensure_connected().await, Some(LinkStatus::Reused));
        assert_eq!(connector.wire().connects.len(), 1);
        assert_eq!(connector.wire().closes, 0);
    }

    #[tokio::test]
    async fn test_new_target_tears_down_link() {
        let connector = FakeConnector::new();
        let mut manager = ConnectionManager::new(connector.clone());

        manager.set_target("192.168.1.50").await;
        manager.ensure_connected().await;

        let change = manager.set_target("192.168.1.77").await;
        assert_eq!(
            change,
            TargetChange::Changed {
                previous: Some("192.168.1.50".into())
            }
        );
        assert_eq!(connector.wire().closes, 1);
        assert_eq!(manager.phase(), ConnectionPhase::Disconnected);

        assert_eq!(manager.ensure_connected().await, Some(LinkStatus::Fresh));
        assert_eq!(manager.bound_address(), Some("192.168.1.77"));
        assert_eq!(
            connector.wire().connects,
            vec!["192.168.1.50", "192.168.1.77"]
        );
    }

    #[tokio::test]
    async fn test_empty_target_is_ignored() {
        let mut manager = ConnectionManager::new(FakeConnector::new());
        assert_eq!(manager.set_target("  ").await, TargetChange::Ignored);
        assert_eq!(manager.target(), None);
    }

    #[tokio::test]
    async fn test_connect_failure_stays_disconnected() {
        let connector = FakeConnector::new();
        connector.wire().refuse_connect = true;
        let mut manager = ConnectionManager::new(connector.clone());

        manager.set_target("192.168.1.50").await;
        assert_eq!(manager.ensure_connected().await, None);
        assert_eq!(manager.phase(), ConnectionPhase::Disconnected);

        connector.wire().refuse_connect = false;
        assert_eq!(manager.ensure_connected().await, Some(LinkStatus::Fresh));
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_timeout() {
        let connector = HangingConnector::default();
        let mut manager = ConnectionManager::new(connector.clone())
            .with_connect_timeout(Duration::from_secs(5));

        manager.set_target("192.168.1.50").await;
        assert_eq!(manager.ensure_connected().await, None);
        assert_eq!(connector.attempts(), 1);
        assert_eq!(manager.phase(), ConnectionPhase::Disconnected);
    }

    #[tokio::test]
    async fn test_send_failure_drops_link() {
        let connector = FakeConnector::new();
        let mut manager = ConnectionManager::new(connector.clone());

        manager.set_target("192.168.1.50").await;
        manager.ensure_connected().await;

        connector.wire().fail_sends = 1;
        assert!(manager.send(&stats_frame()).await.is_err());
        assert_eq!(manager.phase(), ConnectionPhase::Disconnected);
        assert_eq!(manager.bound_address(), None);

        assert_eq!(manager.ensure_connected().await, Some(LinkStatus::Fresh));
        manager.send(&stats_frame()).await.unwrap();
        assert_eq!(connector.wire().connects.len(), 2);
        assert_eq!(connector.wire().sent.len(), 1);
    }

    #[tokio::test]
    async fn test_remotely_closed_link_is_replaced() {
        let connector = FakeConnector::new();
        let mut manager = ConnectionManager::new(connector.clone());

        manager.set_target("192.168.1.50").await;
        manager.ensure_connected().await;

        connector.wire().remote_closed = true;
        assert_eq!(manager.phase(), ConnectionPhase::Disconnected);
        assert_eq!(manager.ensure_connected().await, Some(LinkStatus::Fresh));
        assert_eq!(connector.wire().connects.len(), 2);
    }

    #[tokio::test]
    async fn test_send_without_link() {
        let mut manager = ConnectionManager::new(FakeConnector::new());
        assert!(matches!(
            manager.send(&stats_frame()).await,
            Err(TransportError::NotConnected)
        ));
    }
}
