//! Headless mode - NDJSON event output for scripted sessions
//!
//! The `scrmirror` binary replays a script of inbound session events and
//! writes every observable change to stdout as NDJSON (newline-delimited
//! JSON), one event per line. Each event has an "event" field indicating its
//! type, along with event-specific data.
//!
//! # Example Output
//!
//! ```json
//! {"event":"session_created","session_id":1,"device_id":"emulator-5554","timestamp":1704700001000}
//! {"event":"state_changed","session_id":1,"from":"idle","to":"adb_connecting","timestamp":1704700001002}
//! {"event":"reconnect_requested","session_id":1,"device_id":"emulator-5554","attempt":1,"max_attempts":3,"reason":"video socket disconnected","timestamp":1704700004000}
//! ```

pub mod runner;

use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{self, Write};
use tracing::error;

use scrmirror_app::{EngineEvent, SessionId, SessionSnapshot};
use scrmirror_core::{ComponentState, ConnectionStep, ExceptionKind, SessionComponent, StepStatus};

/// Events emitted in headless mode
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HeadlessEvent {
    /// A session was created for a device seen in the script
    SessionCreated {
        session_id: SessionId,
        device_id: String,
        timestamp: i64,
    },

    /// A session was removed
    SessionRemoved {
        session_id: SessionId,
        timestamp: i64,
    },

    /// The session state changed
    StateChanged {
        session_id: SessionId,
        from: String,
        to: String,
        timestamp: i64,
    },

    /// A handshake step reported a new status
    Progress {
        session_id: SessionId,
        step: ConnectionStep,
        status: StepStatus,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        timestamp: i64,
    },

    /// A component changed state (`state` is absent after a cleanup)
    Component {
        session_id: SessionId,
        component: SessionComponent,
        #[serde(skip_serializing_if = "Option::is_none")]
        state: Option<ComponentState>,
        timestamp: i64,
    },

    /// A failure was recorded by the session monitor
    Exception {
        session_id: SessionId,
        kind: ExceptionKind,
        message: String,
        timestamp: i64,
    },

    /// A reconnect attempt was granted
    ReconnectRequested {
        session_id: SessionId,
        device_id: String,
        attempt: u32,
        max_attempts: u32,
        reason: String,
        timestamp: i64,
    },

    /// A script line could not be applied
    ScriptError {
        line: usize,
        message: String,
        timestamp: i64,
    },

    /// Final state of a session when the script ends
    Summary {
        session_id: SessionId,
        device_id: String,
        state: String,
        reconnect_attempts: u32,
        failed_step: Option<ConnectionStep>,
        /// Inbound events seen, by event type
        event_counts: BTreeMap<String, u64>,
        exceptions_total: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        disconnect_reason: Option<String>,
        timestamp: i64,
    },

    /// The engine is shutting down
    Shutdown { timestamp: i64 },
}

impl HeadlessEvent {
    /// Emit this event to stdout as JSON (NDJSON format)
    pub fn emit(&self) {
        // Serialize to JSON
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize headless event: {}", e);
                return;
            }
        };

        // Write to stdout with newline (NDJSON format)
        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", json) {
            error!("Failed to write headless event: {}", e);
            return;
        }
        let _ = stdout.flush();
    }

    /// Event type label, matching the serialized "event" field
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SessionCreated { .. } => "session_created",
            Self::SessionRemoved { .. } => "session_removed",
            Self::StateChanged { .. } => "state_changed",
            Self::Progress { .. } => "progress",
            Self::Component { .. } => "component",
            Self::Exception { .. } => "exception",
            Self::ReconnectRequested { .. } => "reconnect_requested",
            Self::ScriptError { .. } => "script_error",
            Self::Summary { .. } => "summary",
            Self::Shutdown { .. } => "shutdown",
        }
    }

    /// Get current timestamp in milliseconds
    fn now() -> i64 {
        Utc::now().timestamp_millis()
    }

    // ─────────────────────────────────────────────────────────
    // Convenience constructors
    // ─────────────────────────────────────────────────────────

    pub fn script_error(line: usize, message: impl Into<String>) -> Self {
        Self::ScriptError {
            line,
            message: message.into(),
            timestamp: Self::now(),
        }
    }

    pub fn summary(snapshot: &SessionSnapshot) -> Self {
        let failed_step = snapshot
            .progress
            .values()
            .find(|p| p.is_failed())
            .map(|p| p.step);

        Self::Summary {
            session_id: snapshot.session_id,
            device_id: snapshot.device_id.clone(),
            state: snapshot.state.to_string(),
            reconnect_attempts: snapshot.reconnect_attempts,
            failed_step,
            event_counts: snapshot
                .monitor
                .events()
                .iter()
                .map(|(event_type, stats)| (event_type.to_string(), stats.count))
                .collect(),
            exceptions_total: snapshot.monitor.exceptions_total(),
            disconnect_reason: snapshot.monitor.connection().disconnect_reason.clone(),
            timestamp: Self::now(),
        }
    }

    /// Convert an engine event into its headless representation
    pub fn from_engine_event(event: EngineEvent) -> Self {
        let timestamp = Self::now();

        match event {
            EngineEvent::SessionCreated {
                session_id,
                device_id,
            } => Self::SessionCreated {
                session_id,
                device_id,
                timestamp,
            },
            EngineEvent::SessionRemoved { session_id } => Self::SessionRemoved {
                session_id,
                timestamp,
            },
            EngineEvent::StateChanged {
                session_id,
                old,
                new,
            } => Self::StateChanged {
                session_id,
                from: old.to_string(),
                to: new.to_string(),
                timestamp,
            },
            EngineEvent::ProgressUpdated {
                session_id,
                progress,
            } => Self::Progress {
                session_id,
                step: progress.step,
                status: progress.status,
                message: progress.message,
                error: progress.error,
                timestamp,
            },
            EngineEvent::ComponentChanged {
                session_id,
                component,
                new,
                ..
            } => Self::Component {
                session_id,
                component,
                state: new,
                timestamp,
            },
            EngineEvent::ExceptionRecorded { session_id, record } => Self::Exception {
                session_id,
                kind: record.kind,
                message: record.message,
                timestamp,
            },
            EngineEvent::ReconnectRequested(request) => Self::ReconnectRequested {
                session_id: request.session_id,
                device_id: request.device_id,
                attempt: request.attempt,
                max_attempts: request.max_attempts,
                reason: request.reason,
                timestamp,
            },
            EngineEvent::Shutdown => Self::Shutdown { timestamp },
        }
    }
}
