//! Bounded reconnection policy and the outbound reconnect seam
//!
//! The policy only counts and guards. Actually re-running the handshake,
//! including any delay before it, belongs to whoever drains the
//! [`ReconnectSink`].

use serde::Serialize;
use tokio::sync::mpsc;

use scrmirror_core::prelude::*;

use super::SessionId;
use crate::config::DEFAULT_MAX_RECONNECT_ATTEMPTS;

/// Outcome of asking the policy for another attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectDecision {
    /// Attempt number `attempt` of `max` was granted
    Retry { attempt: u32, max: u32 },
    /// The cap was already reached
    Exhausted { attempts: u32 },
}

/// Attempt counter with a fixed upper bound.
///
/// The counter only grows until [`reset`](Self::reset) is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    attempts: u32,
    max_attempts: u32,
}

impl ReconnectPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            attempts: 0,
            max_attempts,
        }
    }

    /// Consume one attempt if any remain
    pub fn try_acquire(&mut self) -> ReconnectDecision {
        if self.attempts >= self.max_attempts {
            return ReconnectDecision::Exhausted {
                attempts: self.attempts,
            };
        }

        self.attempts += 1;
        ReconnectDecision::Retry {
            attempt: self.attempts,
            max: self.max_attempts,
        }
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn remaining(&self) -> u32 {
        self.max_attempts.saturating_sub(self.attempts)
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RECONNECT_ATTEMPTS)
    }
}

/// Signal sent to the transport layer when a reconnect was granted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconnectRequest {
    pub session_id: SessionId,
    pub device_id: String,
    pub attempt: u32,
    pub max_attempts: u32,
    pub reason: String,
}

/// Receiver of reconnect signals.
///
/// Implementations must not block: the session actor calls this inline.
#[cfg_attr(test, mockall::automock)]
pub trait ReconnectSink: Send + Sync {
    fn request_reconnect(&self, request: ReconnectRequest) -> Result<()>;
}

impl ReconnectSink for mpsc::UnboundedSender<ReconnectRequest> {
    fn request_reconnect(&self, request: ReconnectRequest) -> Result<()> {
        self.send(request)
            .map_err(|e| Error::channel_send(format!("reconnect request dropped: {}", e)))
    }
}
