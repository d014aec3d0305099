//! Decoder lifecycle handlers

use scrmirror_core::{ComponentState, DecoderKind};
use tracing::debug;

use super::socket::reconnect_if_connected;
use super::UpdateResult;
use crate::session::Session;

pub(crate) fn handle_started(session: &mut Session, kind: DecoderKind) -> UpdateResult {
    debug!("Session {}: {} decoder started", session.id, kind);
    session
        .components
        .set(kind.component(), ComponentState::Running);
    UpdateResult::none()
}

pub(crate) fn handle_stopped(session: &mut Session, kind: DecoderKind) -> UpdateResult {
    debug!("Session {}: {} decoder stopped", session.id, kind);
    session
        .components
        .set(kind.component(), ComponentState::Stopped);
    UpdateResult::none()
}

/// Shares the reconnect budget with socket loss
pub(crate) fn handle_error(session: &mut Session, kind: DecoderKind, reason: String) -> UpdateResult {
    session
        .components
        .set(kind.component(), ComponentState::error(reason.clone()));

    reconnect_if_connected(session, format!("{} decoder error: {}", kind, reason))
}
