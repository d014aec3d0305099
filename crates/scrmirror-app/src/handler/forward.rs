//! Port forwarding handlers

use scrmirror_core::{ConnectionStep, SessionState, StepStatus};
use tracing::debug;

use super::UpdateResult;
use crate::session::Session;

pub(crate) fn handle_setting(session: &mut Session) -> UpdateResult {
    session
        .progress
        .update(ConnectionStep::AdbForward, StepStatus::Running, None, None);
    UpdateResult::none()
}

pub(crate) fn handle_established(session: &mut Session, detail: String) -> UpdateResult {
    let message = format!(
        "{}: {}",
        ConnectionStep::AdbForward.default_message(StepStatus::Success),
        detail
    );
    session.progress.update(
        ConnectionStep::AdbForward,
        StepStatus::Success,
        Some(message),
        None,
    );
    UpdateResult::none()
}

pub(crate) fn handle_removed(session: &mut Session, detail: String) -> UpdateResult {
    debug!("Session {}: port forward removed: {}", session.id, detail);
    UpdateResult::none()
}

/// The server is reached through the forward, so this fails the server stage
pub(crate) fn handle_failed(session: &mut Session, reason: String) -> UpdateResult {
    let message = format!(
        "{}: {}",
        ConnectionStep::AdbForward.default_message(StepStatus::Failed),
        reason
    );
    session.progress.update(
        ConnectionStep::AdbForward,
        StepStatus::Failed,
        Some(message),
        Some(reason.clone()),
    );
    session.transition(SessionState::ServerFailed { reason });
    UpdateResult::none()
}
