//! Companion server push and launch handlers

use scrmirror_core::{
    ComponentState, ConnectionStep, SessionComponent, SessionState, StepStatus,
};

use super::{socket, UpdateResult};
use crate::session::Session;

pub(crate) fn handle_pushing(session: &mut Session) -> UpdateResult {
    session
        .progress
        .update(ConnectionStep::PushServer, StepStatus::Running, None, None);
    UpdateResult::none()
}

pub(crate) fn handle_pushed(session: &mut Session) -> UpdateResult {
    session
        .progress
        .update(ConnectionStep::PushServer, StepStatus::Success, None, None);
    UpdateResult::none()
}

pub(crate) fn handle_push_failed(session: &mut Session, reason: String) -> UpdateResult {
    fail_stage(session, ConnectionStep::PushServer, reason)
}

pub(crate) fn handle_starting(session: &mut Session) -> UpdateResult {
    session
        .progress
        .update(ConnectionStep::StartServer, StepStatus::Running, None, None);
    session.transition(SessionState::ServerStarting);
    UpdateResult::none()
}

pub(crate) fn handle_started(session: &mut Session) -> UpdateResult {
    session
        .progress
        .update(ConnectionStep::StartServer, StepStatus::Success, None, None);
    session.components.set(
        SessionComponent::RemoteServerProcess,
        ComponentState::Running,
    );
    if session.transition(SessionState::ServerStarted) {
        // Sockets may have reported before the server did
        socket::complete_barrier(session);
    }
    UpdateResult::none()
}

pub(crate) fn handle_failed(session: &mut Session, reason: String) -> UpdateResult {
    fail_stage(session, ConnectionStep::StartServer, reason)
}

fn fail_stage(session: &mut Session, step: ConnectionStep, reason: String) -> UpdateResult {
    let message = format!("{}: {}", step.default_message(StepStatus::Failed), reason);
    session
        .progress
        .update(step, StepStatus::Failed, Some(message), Some(reason.clone()));
    session.components.set(
        SessionComponent::RemoteServerProcess,
        ComponentState::error(reason.clone()),
    );
    session.transition(SessionState::ServerFailed { reason });
    UpdateResult::none()
}
