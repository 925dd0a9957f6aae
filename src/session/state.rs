//! Frame selection state.
//!
//! One frame goes out per tick. Which one is decided purely from the flags
//! here and the current wall-clock time:
//!
//! 1. **Time** when a time sync was requested, on the first send to a newly
//!    connected display, or when the last time sync is 24 h old.
//! 2. **Identity** right after the first time sync on a connection.
//! 3. **Stats** otherwise.
//!
//! Flags only change after a confirmed send, so a failed frame is retried
//! once the link is back.

use chrono::NaiveDateTime;

use crate::codec::FrameKind;
use crate::core::TIME_RESYNC_INTERVAL;

/// Scheduler flags for the current connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendState {
    send_time_now: bool,
    send_identity_now: bool,
    first_connection_to_target: bool,
    last_time_sent_at: Option<NaiveDateTime>,
}

impl SendState {
    /// State for a bridge that has not connected yet.
    pub fn new() -> Self {
        Self {
            send_time_now: true,
            send_identity_now: false,
            first_connection_to_target: true,
            last_time_sent_at: None,
        }
    }

    /// Re-arm the Time → Identity sequence after a fresh connection.
    ///
    /// `last_time_sent_at` is kept; the time frame is due anyway.
    pub fn reset_for_new_connection(&mut self) {
        self.send_time_now = true;
        self.send_identity_now = false;
        self.first_connection_to_target = true;
    }

    /// Pick the frame to send at `now`.
    pub fn next_frame(&self, now: NaiveDateTime) -> FrameKind {
        if self.send_time_now || self.first_connection_to_target || self.time_sync_due(now) {
            FrameKind::Time
        } else if self.send_identity_now {
            FrameKind::Identity
        } else {
            FrameKind::Stats
        }
    }

    /// Record a successful send of `kind` at `now`.
    pub fn on_sent(&mut self, kind: FrameKind, now: NaiveDateTime) {
        match kind {
            FrameKind::Time => {
                self.send_time_now = false;
                self.last_time_sent_at = Some(now);
                if self.first_connection_to_target {
                    self.first_connection_to_target = false;
                    self.send_identity_now = true;
                }
            }
            FrameKind::Identity => self.send_identity_now = false,
            FrameKind::Stats => {}
        }
    }

    /// When the last time frame went out, if ever.
    pub fn last_time_sent_at(&self) -> Option<NaiveDateTime> {
        self.last_time_sent_at
    }

    /// Whether an identity frame is pending.
    pub fn identity_pending(&self) -> bool {
        self.send_identity_now
    }

    fn time_sync_due(&self, now: NaiveDateTime) -> bool {
        let Some(last) = self.last_time_sent_at else {
            return true;
        };
        // A clock that went backwards yields a negative delta: not due.
        (now - last)
            .to_std()
            .is_ok_and(|elapsed| elapsed >= TIME_RESYNC_INTERVAL)
    }
}

impl Default for SendState {
    fn default() -> Self {
        Self::new()
    }
}
