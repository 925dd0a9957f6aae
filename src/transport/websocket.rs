//! WebSocket link to the display.
//!
//! The firmware serves a WebSocket endpoint at `ws://<ip>/cpumonitorjr<port>`.
//! Frames are sent as binary messages. No keep-alive pings are sent; the
//! firmware does not answer them.
//!
//! The read half of each link is drained by a background task so a close
//! frame or a dropped TCP connection from the display marks the link closed
//! before the next send is attempted.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, trace};

use super::connection::{Connector, FrameLink};
use super::error::{TransportError, TransportResult};
use crate::codec::Frame;
use crate::core::{CLOSE_TIMEOUT, ENDPOINT_PATH_PREFIX};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Build the endpoint URL for a display at `target`.
///
/// Rejects targets that cannot be a bare host name or IP address.
pub fn endpoint_url(target: &str, port: u16) -> TransportResult<String> {
    let target = target.trim();
    if target.is_empty()
        || target
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#' | '@'))
    {
        return Err(TransportError::InvalidTarget(target.to_string()));
    }
    Ok(format!("ws://{target}/{ENDPOINT_PATH_PREFIX}{port}"))
}

/// Opens WebSocket links to the display.
#[derive(Debug, Clone)]
pub struct WebSocketConnector {
    /// Port embedded in the endpoint path (the discovery port).
    port: u16,
}

impl WebSocketConnector {
    /// Create a connector for the given discovery port.
    pub fn new(port: u16) -> Self {
        Self { port }
    }
}

#[async_trait]
impl Connector for WebSocketConnector {
    type Link = WebSocketLink;

    async fn connect(&mut self, target: &str) -> TransportResult<WebSocketLink> {
        let url = endpoint_url(target, self.port)?;
        let (stream, _response) = connect_async(url.as_str()).await?;
        let (sink, source) = stream.split();

        let closed = Arc::new(AtomicBool::new(false));
        let reader = tokio::spawn(watch_inbound(source, Arc::clone(&closed), url.clone()));

        Ok(WebSocketLink {
            sink,
            reader,
            url,
            closed,
        })
    }
}

/// Drain inbound messages until the display closes the link or it fails.
///
/// tungstenite queues pong replies to pings while reading.
async fn watch_inbound(mut source: SplitStream<WsStream>, closed: Arc<AtomicBool>, url: String) {
    loop {
        match source.next().await {
            Some(Ok(Message::Close(frame))) => {
                debug!(%url, ?frame, "display closed the link");
                break;
            }
            Some(Ok(message)) => trace!(%url, len = message.len(), "inbound message ignored"),
            Some(Err(e)) => {
                debug!(%url, error = %e, "link read failed");
                break;
            }
            None => {
                debug!(%url, "link stream ended");
                break;
            }
        }
    }
    closed.store(true, Ordering::Release);
}

/// An open WebSocket link.
pub struct WebSocketLink {
    sink: SplitSink<WsStream, Message>,
    reader: JoinHandle<()>,
    url: String,
    /// Set by the reader on remote close, or locally on failure or close.
    closed: Arc<AtomicBool>,
}

impl fmt::Debug for WebSocketLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebSocketLink")
            .field("url", &self.url)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl Drop for WebSocketLink {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

#[async_trait]
impl FrameLink for WebSocketLink {
    async fn send_frame(&mut self, frame: &Frame) -> TransportResult<()> {
        if self.is_closed() {
            return Err(TransportError::ConnectionClosed);
        }

        if let Err(e) = self.sink.send(Message::binary(frame.as_bytes().to_vec())).await {
            self.closed.store(true, Ordering::Release);
            return Err(e.into());
        }
        trace!(url = %self.url, kind = ?frame.kind(), len = frame.len(), "frame sent");
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    async fn close(&mut self) -> TransportResult<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            // Failed or remotely closed links skip the close handshake.
            self.reader.abort();
            return Ok(());
        }

        let result = match tokio::time::timeout(CLOSE_TIMEOUT, self.sink.close()).await {
            Ok(result) => result.map_err(TransportError::from),
            Err(_) => Err(TransportError::CloseTimeout),
        };
        self.reader.abort();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::StatsSample;
    use crate::core::DEFAULT_UDP_PORT;
    use crate::transport::ConnectionManager;
    use crate::transport::LinkStatus;
    use std::time::Duration;
    use tokio::net::TcpListener;

    /// Accept one WebSocket client and hand it to `serve`.
    async fn display<F, Fut, T>(serve: F) -> (String, JoinHandle<T>)
    where
        F: FnOnce(WebSocketStream<TcpStream>) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = T> + Send,
        T: Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            serve(ws).await
        });
        (addr.to_string(), task)
    }

    /// Wait until the link notices it was closed, or give up.
    async fn wait_closed(link: &WebSocketLink) -> bool {
        for _ in 0..100 {
            if link.is_closed() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        false
    }

    fn stats_frame() -> Frame {
        Frame::stats(&StatsSample::default())
    }

    #[test]
    fn test_endpoint_url_embeds_port() {
        assert_eq!(
            endpoint_url("192.168.1.50", DEFAULT_UDP_PORT).unwrap(),
            "ws://192.168.1.50/cpumonitorjr44447"
        );
        assert_eq!(
            endpoint_url(" esp32.local ", 44445).unwrap(),
            "ws://esp32.local/cpumonitorjr44445"
        );
    }

    #[test]
    fn test_endpoint_url_rejects_garbage() {
        for bad in ["", "   ", "a b", "host/path", "user@host", "host?x"] {
            assert!(
                matches!(endpoint_url(bad, 1), Err(TransportError::InvalidTarget(_))),
                "{bad:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_connect_rejects_invalid_target() {
        let mut connector = WebSocketConnector::new(DEFAULT_UDP_PORT);
        let err = connector.connect("not a host").await.unwrap_err();
        assert!(matches!(err, TransportError::InvalidTarget(_)));
    }

    #[tokio::test]
    async fn test_connect_refused_is_reported() {
        // Grab a free port, then release it so nothing is listening.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let mut connector = WebSocketConnector::new(DEFAULT_UDP_PORT);
        let result = connector.connect(&format!("127.0.0.1:{port}")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_frame_arrives_as_binary_message() {
        let (target, server) = display(|mut ws| async move {
            let message = ws.next().await.unwrap().unwrap();
            let _ = ws.next().await;
            message
        })
        .await;

        let mut link = WebSocketConnector::new(DEFAULT_UDP_PORT)
            .connect(&target)
            .await
            .unwrap();
        link.send_frame(&stats_frame()).await.unwrap();
        assert!(!link.is_closed());
        link.close().await.unwrap();

        let received = server.await.unwrap();
        assert_eq!(received, Message::binary(stats_frame().into_bytes()));
    }

    #[tokio::test]
    async fn test_display_close_marks_link_closed() {
        let (target, server) = display(|mut ws| async move {
            ws.close(None).await.unwrap();
        })
        .await;

        let mut link = WebSocketConnector::new(DEFAULT_UDP_PORT)
            .connect(&target)
            .await
            .unwrap();
        server.await.unwrap();

        assert!(wait_closed(&link).await, "display close went unnoticed");
        assert!(matches!(
            link.send_frame(&stats_frame()).await,
            Err(TransportError::ConnectionClosed)
        ));
        link.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_dropped_connection_marks_link_closed() {
        let (target, server) = display(|ws| async move { drop(ws) }).await;

        let link = WebSocketConnector::new(DEFAULT_UDP_PORT)
            .connect(&target)
            .await
            .unwrap();
        server.await.unwrap();

        assert!(wait_closed(&link).await);
    }

    #[tokio::test]
    async fn test_manager_reconnects_after_display_close() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let target = listener.local_addr().unwrap().to_string();
        let server = tokio::spawn(async move {
            // First client is closed right away, the second one gets a frame.
            let (stream, _) = listener.accept().await.unwrap();
            let mut first = tokio_tungstenite::accept_async(stream).await.unwrap();
            first.close(None).await.unwrap();

            let (stream, _) = listener.accept().await.unwrap();
            let mut second = tokio_tungstenite::accept_async(stream).await.unwrap();
            second.next().await.unwrap().unwrap()
        });

        let mut manager = ConnectionManager::new(WebSocketConnector::new(DEFAULT_UDP_PORT));
        manager.set_target(&target).await;
        assert_eq!(manager.ensure_connected().await, Some(LinkStatus::Fresh));

        let mut reconnected = None;
        for _ in 0..100 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            match manager.ensure_connected().await {
                Some(LinkStatus::Reused) => continue,
                status => {
                    reconnected = status;
                    break;
                }
            }
        }
        assert_eq!(reconnected, Some(LinkStatus::Fresh));

        manager.send(&stats_frame()).await.unwrap();
        let received = server.await.unwrap();
        assert!(received.is_binary());
        manager.drop_link().await;
    }
}
