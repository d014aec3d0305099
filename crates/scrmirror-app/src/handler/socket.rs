//! Socket handlers and the three-way connection barrier
//!
//! Video, audio and control sockets report independently and in any order.
//! The session becomes `Connected` once all three are `Connected` and its
//! state allows it. Sockets that finish early wait for `ServerStarted`.

use scrmirror_core::{
    ComponentState, ConnectionStep, SessionEvent, SessionState, SocketKind, StepStatus,
};
use tracing::{debug, info};

use super::UpdateResult;
use crate::session::Session;

pub(crate) fn handle_connecting(session: &mut Session, kind: SocketKind) -> UpdateResult {
    session.progress.update(
        ConnectionStep::ConnectSocket,
        StepStatus::Running,
        Some(format!("Connecting {} socket...", kind)),
        None,
    );
    UpdateResult::none()
}

pub(crate) fn handle_connected(session: &mut Session, kind: SocketKind) -> UpdateResult {
    session
        .components
        .set(kind.component(), ComponentState::Connected);
    debug!("Session {}: {} socket connected", session.id, kind);

    complete_barrier(session);
    UpdateResult::none()
}

/// Move to `Connected` once all three sockets are connected.
///
/// A no-op while any socket is missing, when already connected, or while the
/// state has no `Connected` edge (the sockets then wait for a later stage).
/// Returns `true` when the session became connected.
pub(crate) fn complete_barrier(session: &mut Session) -> bool {
    if !session.components.all_sockets_connected() || session.is_connected() {
        return false;
    }

    if !session.state().can_transition_to(&SessionState::Connected) {
        debug!(
            "Session {}: all sockets connected, waiting while {}",
            session.id,
            session.state()
        );
        return false;
    }

    if !session.transition(SessionState::Connected) {
        return false;
    }
    info!("Session {}: all sockets connected", session.id);
    session
        .progress
        .update(ConnectionStep::ConnectSocket, StepStatus::Success, None, None);
    session
        .progress
        .update(ConnectionStep::Completed, StepStatus::Success, None, None);
    true
}

pub(crate) fn handle_disconnected(session: &mut Session, kind: SocketKind) -> UpdateResult {
    session
        .components
        .set(kind.component(), ComponentState::Disconnected);

    reconnect_if_connected(session, format!("{} socket disconnected", kind))
}

pub(crate) fn handle_error(session: &mut Session, kind: SocketKind, reason: String) -> UpdateResult {
    let message = format!(
        "{}: {}",
        ConnectionStep::ConnectSocket.default_message(StepStatus::Failed),
        reason
    );
    session.progress.update(
        ConnectionStep::ConnectSocket,
        StepStatus::Failed,
        Some(message),
        Some(reason.clone()),
    );
    session
        .components
        .set(kind.component(), ComponentState::error(reason.clone()));

    reconnect_if_connected(session, format!("{} socket error: {}", kind, reason))
}

/// Component loss only triggers a reconnect once the session was connected.
///
/// Earlier failures are left to the caller to surface and re-initiate.
pub(crate) fn reconnect_if_connected(session: &Session, reason: String) -> UpdateResult {
    if session.is_connected() {
        UpdateResult::message(SessionEvent::RequestReconnect { reason })
    } else {
        debug!(
            "Session {}: {} while {}, not reconnecting",
            session.id,
            reason,
            session.state()
        );
        UpdateResult::none()
    }
}
