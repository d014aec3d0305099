//! Handler module - session update function and per-subsystem event handlers
//!
//! Organized into submodules:
//! - `update`: Main update() function and event dispatch
//! - `transport`: Transport handshake events
//! - `forward`: Port forwarding events
//! - `server`: Companion server push/launch events
//! - `socket`: Video/audio/control socket events and the socket barrier
//! - `decoder`: Media decoder lifecycle events
//! - `encoder`: Remote encoder detection notifications (log only)
//! - `control`: Reconnect, cleanup and session error requests

pub(crate) mod control;
pub(crate) mod decoder;
pub(crate) mod encoder;
pub(crate) mod forward;
pub(crate) mod server;
pub(crate) mod socket;
pub(crate) mod transport;
pub(crate) mod update;


use scrmirror_core::SessionEvent;

use crate::session::ReconnectRequest;

// Re-export main entry point
pub use update::update;

/// Actions the session actor performs after an update
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateAction {
    /// Signal the transport layer to re-run the handshake
    RequestReconnect(ReconnectRequest),
}

/// Result of processing an event
#[derive(Debug, Default)]
pub struct UpdateResult {
    /// Optional follow-up event to process
    pub message: Option<SessionEvent>,
    /// Optional action for the actor to perform
    pub action: Option<UpdateAction>,
}

impl UpdateResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn message(msg: SessionEvent) -> Self {
        Self {
            message: Some(msg),
            action: None,
        }
    }

    pub fn action(action: UpdateAction) -> Self {
        Self {
            message: None,
            action: Some(action),
        }
    }
}
