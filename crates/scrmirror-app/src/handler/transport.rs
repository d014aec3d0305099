//! Transport handshake handlers

use scrmirror_core::{
    ComponentState, ConnectionStep, SessionComponent, SessionState, StepStatus,
};

use super::UpdateResult;
use crate::session::Session;

pub(crate) fn handle_connecting(session: &mut Session) -> UpdateResult {
    session
        .progress
        .update(ConnectionStep::AdbConnect, StepStatus::Running, None, None);
    session.transition(SessionState::AdbConnecting);
    UpdateResult::none()
}

pub(crate) fn handle_verifying(session: &mut Session) -> UpdateResult {
    session.progress.update(
        ConnectionStep::AdbConnect,
        StepStatus::Running,
        Some("Verifying ADB connection...".to_string()),
        None,
    );
    UpdateResult::none()
}

pub(crate) fn handle_connected(session: &mut Session) -> UpdateResult {
    session
        .progress
        .update(ConnectionStep::AdbConnect, StepStatus::Success, None, None);
    session.components.set(
        SessionComponent::TransportConnection,
        ComponentState::Connected,
    );
    session.transition(SessionState::AdbConnected);
    UpdateResult::none()
}

pub(crate) fn handle_disconnected(session: &mut Session, reason: String) -> UpdateResult {
    session.progress.update(
        ConnectionStep::AdbConnect,
        StepStatus::Failed,
        Some(format!("ADB disconnected: {}", reason)),
        Some(reason.clone()),
    );
    session.components.set(
        SessionComponent::TransportConnection,
        ComponentState::Disconnected,
    );
    session.transition(SessionState::AdbDisconnected { reason });
    UpdateResult::none()
}
