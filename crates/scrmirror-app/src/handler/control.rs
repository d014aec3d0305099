//! Reconnect, cleanup and session error handlers

use scrmirror_core::SessionState;
use tracing::{info, warn};

use super::{UpdateAction, UpdateResult};
use crate::session::{ReconnectDecision, ReconnectRequest, Session};

/// Consume one reconnect attempt, or fail the session once the cap is hit.
///
/// Ignored when the session cannot enter `Reconnecting` from its current
/// state (`Idle`, `AdbConnecting` or `Failed`).
pub(crate) fn handle_request_reconnect(session: &mut Session, reason: String) -> UpdateResult {
    if !session
        .state()
        .can_transition_to(&SessionState::Reconnecting { attempt: 0 })
    {
        warn!(
            "Session {}: reconnect ({}) ignored while {}",
            session.id,
            reason,
            session.state()
        );
        return UpdateResult::none();
    }

    match session.reconnect.try_acquire() {
        ReconnectDecision::Retry { attempt, max } => {
            info!(
                "Session {}: reconnect attempt {}/{} ({})",
                session.id, attempt, max, reason
            );
            if session.is_connected() {
                session.monitor.mark_disconnected(reason.clone());
            }
            session.transition(SessionState::Reconnecting { attempt });

            UpdateResult::action(UpdateAction::RequestReconnect(ReconnectRequest {
                session_id: session.id,
                device_id: session.device_id.clone(),
                attempt,
                max_attempts: max,
                reason,
            }))
        }
        ReconnectDecision::Exhausted { attempts } => {
            warn!(
                "Session {}: reconnect attempts exhausted ({}/{}), failing: {}",
                session.id,
                attempts,
                session.reconnect.max_attempts(),
                reason
            );
            session.transition(SessionState::Failed { reason });
            UpdateResult::none()
        }
    }
}

pub(crate) fn handle_request_cleanup(session: &mut Session) -> UpdateResult {
    session.reset();
    UpdateResult::none()
}

pub(crate) fn handle_session_error(session: &mut Session, reason: String) -> UpdateResult {
    warn!("Session {}: session error: {}", session.id, reason);
    session.transition(SessionState::Failed { reason });
    UpdateResult::none()
}
