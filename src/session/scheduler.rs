//! Per-tick frame delivery.

use chrono::{Local, NaiveDateTime};
use tracing::debug;

use super::state::SendState;
use crate::codec::{Frame, FrameKind};
use crate::core::{IdentitySource, TelemetrySource};
use crate::transport::{ConnectionManager, ConnectionPhase, Connector, LinkStatus, TargetChange};

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No target, or no link could be opened. Nothing was sent.
    Skipped,
    /// The frame went out.
    Sent(FrameKind),
    /// Sending the frame failed and the link was dropped.
    Failed(FrameKind),
}

/// Owns the bridge session: the connection, the send flags and the
/// collaborators that supply frame contents.
///
/// Every tick sends at most one frame.
pub struct SendScheduler<C: Connector, T, I> {
    connection: ConnectionManager<C>,
    state: SendState,
    telemetry: T,
    identity: I,
}

impl<C, T, I> SendScheduler<C, T, I>
where
    C: Connector,
    T: TelemetrySource,
    I: IdentitySource,
{
    /// Create a scheduler around a connection manager.
    pub fn new(connection: ConnectionManager<C>, telemetry: T, identity: I) -> Self {
        Self {
            connection,
            state: SendState::new(),
            telemetry,
            identity,
        }
    }

    /// The connection manager.
    pub fn connection(&self) -> &ConnectionManager<C> {
        &self.connection
    }

    /// Current send flags.
    pub fn state(&self) -> &SendState {
        &self.state
    }

    /// Whether a display address is known.
    pub fn has_target(&self) -> bool {
        self.connection.target().is_some()
    }

    /// Report an advertised display address.
    pub async fn set_target(&mut self, address: &str) -> TargetChange {
        self.connection.set_target(address).await
    }

    /// Run one tick at the current local time.
    pub async fn tick(&mut self) -> TickOutcome {
        self.tick_at(Local::now().naive_local()).await
    }

    /// Run one tick as if the local wall clock read `now`.
    pub async fn tick_at(&mut self, now: NaiveDateTime) -> TickOutcome {
        if !self.has_target() {
            return TickOutcome::Skipped;
        }

        match self.connection.ensure_connected().await {
            Some(LinkStatus::Fresh) => self.state.reset_for_new_connection(),
            Some(LinkStatus::Reused) => {}
            None => return TickOutcome::Skipped,
        }

        let kind = self.state.next_frame(now);
        let frame = match kind {
            FrameKind::Time => Frame::time(&now),
            FrameKind::Identity => Frame::identity(&self.identity.identity().await),
            FrameKind::Stats => Frame::stats(&self.telemetry.sample()),
        };

        match self.connection.send(&frame).await {
            Ok(()) => {
                self.state.on_sent(kind, now);
                debug!(kind = ?kind, len = frame.len(), "frame delivered");
                TickOutcome::Sent(kind)
            }
            Err(e) => {
                debug!(kind = ?kind, error = %e, "send failed; link dropped");
                TickOutcome::Failed(kind)
            }
        }
    }

    /// Close the link, if any. The target is kept.
    pub async fn close(&mut self) {
        if self.connection.phase() == ConnectionPhase::Connected {
            debug!("closing display link");
        }
        self.connection.drop_link().await;
    }
}
