//! In-memory links for exercising the connection manager and scheduler.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::{Connector, FrameLink, TransportError, TransportResult};
use crate::codec::Frame;

/// Everything that happened on the fake wire.
#[derive(Debug, Default)]
pub(crate) struct Wire {
    /// Targets connected to, in order.
    pub connects: Vec<String>,
    /// Frames sent, with the target of the link that carried them.
    pub sent: Vec<(String, Vec<u8>)>,
    /// Number of links closed.
    pub closes: usize,
    /// Refuse every connect attempt while set.
    pub refuse_connect: bool,
    /// Fail this many upcoming sends.
    pub fail_sends: usize,
    /// Make the current link report itself closed.
    pub remote_closed: bool,
}

impl Wire {
    /// Discriminant of every frame sent so far.
    pub fn sent_kinds(&self) -> Vec<u8> {
        self.sent.iter().map(|(_, bytes)| bytes[0]).collect()
    }
}

/// Connector whose links record into a shared [`Wire`].
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeConnector {
    wire: Arc<Mutex<Wire>>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wire(&self) -> MutexGuard<'_, Wire> {
        self.wire.lock().unwrap()
    }
}

#[async_trait]
impl Connector for FakeConnector {
    type Link = FakeLink;

    async fn connect(&mut self, target: &str) -> TransportResult<FakeLink> {
        let mut wire = self.wire.lock().unwrap();
        if wire.refuse_connect {
            return Err(TransportError::Io(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "connection refused",
            )));
        }
        wire.connects.push(target.to_string());
        wire.remote_closed = false;

        Ok(FakeLink {
            target: target.to_string(),
            wire: Arc::clone(&self.wire),
            closed: false,
        })
    }
}

/// Link handed out by [`FakeConnector`].
#[derive(Debug)]
pub(crate) struct FakeLink {
    target: String,
    wire: Arc<Mutex<Wire>>,
    closed: bool,
}

#[async_trait]
impl FrameLink for FakeLink {
    async fn send_frame(&mut self, frame: &Frame) -> TransportResult<()> {
        let mut wire = self.wire.lock().unwrap();
        if self.closed || wire.remote_closed {
            return Err(TransportError::ConnectionClosed);
        }
        if wire.fail_sends > 0 {
            wire.fail_sends -= 1;
            self.closed = true;
            return Err(TransportError::ConnectionClosed);
        }
        wire.sent.push((self.target.clone(), frame.as_bytes().to_vec()));
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed || self.wire.lock().unwrap().remote_closed
    }

    async fn close(&mut self) -> TransportResult<()> {
        self.closed = true;
        self.wire.lock().unwrap().closes += 1;
        Ok(())
    }
}

/// Connector whose connect attempts never complete.
#[derive(Debug, Clone, Default)]
pub(crate) struct HangingConnector {
    attempts: Arc<AtomicUsize>,
}

impl HangingConnector {
    /// Connect attempts started so far.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for HangingConnector {
    type Link = FakeLink;

    async fn connect(&mut self, _target: &str) -> TransportResult<FakeLink> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }
}
