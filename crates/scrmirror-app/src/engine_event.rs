//! Domain events emitted by the Engine for external consumers
//!
//! Events are broadcast after each inbound session event is applied, via
//! `Engine::subscribe()`. They are derived by diffing the session snapshot
//! taken before the event against the one taken after it.

use scrmirror_core::{ComponentState, ConnectionProgress, SessionComponent, SessionState};

use crate::session::{ExceptionRecord, ReconnectRequest, SessionId, SessionSnapshot};

/// Domain events emitted by the Engine.
///
/// Subscribers see one consistent batch per applied event: state first, then
/// progress, components, recorded failures, then any reconnect signal.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    // ─────────────────────────────────────────────────────────
    // Session Lifecycle
    // ─────────────────────────────────────────────────────────
    /// A new session was created for a device
    SessionCreated {
        session_id: SessionId,
        device_id: String,
    },

    /// A session was removed from the session manager
    SessionRemoved { session_id: SessionId },

    // ─────────────────────────────────────────────────────────
    // Session Changes
    // ─────────────────────────────────────────────────────────
    /// The session state changed
    StateChanged {
        session_id: SessionId,
        old: SessionState,
        new: SessionState,
    },

    /// A handshake step reported a new status
    ProgressUpdated {
        session_id: SessionId,
        progress: ConnectionProgress,
    },

    /// A component changed state; `new` is `None` after a cleanup
    ComponentChanged {
        session_id: SessionId,
        component: SessionComponent,
        old: Option<ComponentState>,
        new: Option<ComponentState>,
    },

    /// A failure was added to the session monitor
    ExceptionRecorded {
        session_id: SessionId,
        record: ExceptionRecord,
    },

    /// A reconnect attempt was granted and signalled to the transport layer
    ReconnectRequested(ReconnectRequest),

    // ─────────────────────────────────────────────────────────
    // Engine Lifecycle
    // ─────────────────────────────────────────────────────────
    /// Engine is shutting down
    Shutdown,
}

impl EngineEvent {
    /// Returns a short string label for this event type (for logging/debugging).
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SessionCreated { .. } => "session_created",
            Self::SessionRemoved { .. } => "session_removed",
            Self::StateChanged { .. } => "state_changed",
            Self::ProgressUpdated { .. } => "progress_updated",
            Self::ComponentChanged { .. } => "component_changed",
            Self::ExceptionRecorded { .. } => "exception_recorded",
            Self::ReconnectRequested(_) => "reconnect_requested",
            Self::Shutdown => "shutdown",
        }
    }

    /// Session this event belongs to, if any
    pub fn session_id(&self) -> Option<SessionId> {
        match self {
            Self::SessionCreated { session_id, .. }
            | Self::SessionRemoved { session_id }
            | Self::StateChanged { session_id, .. }
            | Self::ProgressUpdated { session_id, .. }
            | Self::ComponentChanged { session_id, .. }
            | Self::ExceptionRecorded { session_id, .. } => Some(*session_id),
            Self::ReconnectRequested(request) => Some(request.session_id),
            Self::Shutdown => None,
        }
    }
}

/// Events describing how `after` differs from `before`
pub fn diff_snapshots(before: &SessionSnapshot, after: &SessionSnapshot) -> Vec<EngineEvent> {
    let session_id = after.session_id;
    let mut events = Vec::new();

    if before.state != after.state {
        events.push(EngineEvent::StateChanged {
            session_id,
            old: before.state.clone(),
            new: after.state.clone(),
        });
    }

    for (step, progress) in &after.progress {
        if before.progress.get(step) != Some(progress) {
            events.push(EngineEvent::ProgressUpdated {
                session_id,
                progress: progress.clone(),
            });
        }
    }

    for component in SessionComponent::ALL {
        let old = before.components.get(&component);
        let new = after.components.get(&component);
        if old != new {
            events.push(EngineEvent::ComponentChanged {
                session_id,
                component,
                old: old.cloned(),
                new: new.cloned(),
            });
        }
    }

    let recorded = after
        .monitor
        .exceptions_total()
        .saturating_sub(before.monitor.exceptions_total());
    let retained: Vec<&ExceptionRecord> = after.monitor.recent_exceptions().collect();
    let fresh = retained
        .len()
        .min(usize::try_from(recorded).unwrap_or(usize::MAX));
    for record in &retained[retained.len() - fresh..] {
        events.push(EngineEvent::ExceptionRecorded {
            session_id,
            record: (*record).clone(),
        });
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use scrmirror_core::{ConnectionStep, ExceptionKind, StepStatus};

    #[test]
    fn test_engine_event_type_labels() {
        assert_eq!(EngineEvent::Shutdown.event_type(), "shutdown");
        assert_eq!(
            EngineEvent::SessionRemoved { session_id: 1 }.event_type(),
            "session_removed"
        );
        assert_eq!(EngineEvent::Shutdown.session_id(), None);
    }

    #[test]
    fn test_identical_snapshots_produce_nothing() {
        let session = Session::new("device-1");
        let snap = session.snapshot();
        assert!(diff_snapshots(&snap, &snap).is_empty());
    }

    #[test]
    fn test_diff_orders_state_progress_components() {
        let mut session = Session::new("device-1");
        let before = session.snapshot();

        session
            .progress
            .update(ConnectionStep::AdbConnect, StepStatus::Success, None, None);
        session.components.set(
            SessionComponent::TransportConnection,
            ComponentState::Connected,
        );
        session.transition(SessionState::AdbConnected);

        let events = diff_snapshots(&before, &session.snapshot());
        let labels: Vec<_> = events.iter().map(|e| e.event_type()).collect();
        assert_eq!(
            labels,
            vec!["state_changed", "progress_updated", "component_changed"]
        );
    }

    #[test]
    fn test_new_failures_follow_components() {
        let mut session = Session::new("device-1");
        session.monitor.record_exception(ExceptionKind::Adb, "old");
        let before = session.snapshot();

        session.monitor.record_exception(ExceptionKind::Socket, "video reset");
        session.components.set(
            SessionComponent::VideoSocket,
            ComponentState::error("reset"),
        );

        let events = diff_snapshots(&before, &session.snapshot());
        let labels: Vec<_> = events.iter().map(|e| e.event_type()).collect();
        assert_eq!(labels, vec!["component_changed", "exception_recorded"]);
        match &events[1] {
            EngineEvent::ExceptionRecorded { record, .. } => {
                assert_eq!(record.kind, ExceptionKind::Socket);
                assert_eq!(record.message, "video reset");
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_cleared_component_reports_none() {
        let mut session = Session::new("device-1");
        session.components.set(
            SessionComponent::VideoSocket,
            ComponentState::Connected,
        );
        let before = session.snapshot();

        session.reset();

        let events = diff_snapshots(&before, &session.snapshot());
        assert_eq!(
            events,
            vec![EngineEvent::ComponentChanged {
                session_id: session.id,
                component: SessionComponent::VideoSocket,
                old: Some(ComponentState::Connected),
                new: None,
            }]
        );
    }
}
