//! Session monitor - event counters, recent failures and the connection record
//!
//! Lives for the whole session: a cleanup resets the state machine but not
//! the monitor, so counters and failures survive reconnect cycles.

use std::collections::{BTreeMap, VecDeque};
use std::fmt::Write;

use chrono::{DateTime, Local};
use serde::Serialize;

use scrmirror_core::{ExceptionKind, SessionEvent, SessionState};

/// How often one event type was seen and when last
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventStatistics {
    pub count: u64,
    pub last_seen: DateTime<Local>,
}

/// One recorded failure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExceptionRecord {
    pub kind: ExceptionKind,
    pub message: String,
    pub at: DateTime<Local>,
}

/// When the session last reached and lost `Connected`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConnectionRecord {
    pub connected_at: Option<DateTime<Local>>,
    pub disconnected_at: Option<DateTime<Local>>,
    pub disconnect_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionMonitor {
    events: BTreeMap<&'static str, EventStatistics>,
    exceptions: VecDeque<ExceptionRecord>,
    exception_capacity: usize,
    exceptions_total: u64,
    connection: ConnectionRecord,
}

impl SessionMonitor {
    pub fn new(exception_capacity: usize) -> Self {
        Self {
            events: BTreeMap::new(),
            exceptions: VecDeque::with_capacity(exception_capacity),
            exception_capacity,
            exceptions_total: 0,
            connection: ConnectionRecord::default(),
        }
    }

    /// Count an event and keep it as a failure if it reports one
    pub fn record_event(&mut self, event: &SessionEvent) {
        let now = Local::now();
        self.events
            .entry(event.event_type())
            .and_modify(|s| {
                s.count += 1;
                s.last_seen = now;
            })
            .or_insert(EventStatistics {
                count: 1,
                last_seen: now,
            });

        if let Some(kind) = event.exception_kind() {
            self.record_exception(kind, event.summary());
        }
    }

    pub fn record_exception(&mut self, kind: ExceptionKind, message: impl Into<String>) {
        self.exceptions_total += 1;
        if self.exception_capacity == 0 {
            return;
        }
        if self.exceptions.len() == self.exception_capacity {
            self.exceptions.pop_front();
        }
        self.exceptions.push_back(ExceptionRecord {
            kind,
            message: message.into(),
            at: Local::now(),
        });
    }

    pub fn mark_connected(&mut self) {
        self.connection.connected_at = Some(Local::now());
    }

    pub fn mark_disconnected(&mut self, reason: impl Into<String>) {
        self.connection.disconnected_at = Some(Local::now());
        self.connection.disconnect_reason = Some(reason.into());
    }

    pub fn event_count(&self, event_type: &str) -> u64 {
        self.events.get(event_type).map(|s| s.count).unwrap_or(0)
    }

    /// Counters keyed by event type label
    pub fn events(&self) -> &BTreeMap<&'static str, EventStatistics> {
        &self.events
    }

    /// Retained failures, oldest first
    pub fn recent_exceptions(&self) -> impl Iterator<Item = &ExceptionRecord> {
        self.exceptions.iter()
    }

    /// Failures ever recorded, including those no longer retained
    pub fn exceptions_total(&self) -> u64 {
        self.exceptions_total
    }

    pub fn connection(&self) -> &ConnectionRecord {
        &self.connection
    }

    /// Multi-line human summary for logs
    pub fn summary(&self, device_id: &str, state: &SessionState) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== Session summary [{}] ===", device_id);
        let _ = writeln!(out, "State: {}", state);
        if let Some(at) = self.connection.connected_at {
            let _ = writeln!(out, "Last connected: {}", at.format("%H:%M:%S%.3f"));
        }
        if let (Some(at), Some(reason)) = (
            self.connection.disconnected_at,
            self.connection.disconnect_reason.as_deref(),
        ) {
            let _ = writeln!(
                out,
                "Last disconnected: {} ({})",
                at.format("%H:%M:%S%.3f"),
                reason
            );
        }
        let total: u64 = self.events.values().map(|s| s.count).sum();
        let _ = writeln!(out, "Events: {} across {} types", total, self.events.len());
        if !self.exceptions.is_empty() {
            let _ = writeln!(out, "Recent failures: {}", self.exceptions.len());
            let skip = self.exceptions.len().saturating_sub(3);
            for record in self.exceptions.iter().skip(skip) {
                let _ = writeln!(out, "  [{}] {}", record.kind, record.message);
            }
        }
        out
    }
}

impl Default for SessionMonitor {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_EXCEPTION_HISTORY)
    }
}
