//! Session aggregate - state and sub-trackers for one device

use std::collections::BTreeMap;

use chrono::{DateTime, Local};
use serde::Serialize;

use scrmirror_core::prelude::*;
use scrmirror_core::{
    ComponentState, ConnectionProgress, ConnectionStep, SessionComponent, SessionState, StepStatus,
};

use super::components::ComponentStateRegistry;
use super::monitor::SessionMonitor;
use super::progress::ConnectionProgressTracker;
use super::reconnect::ReconnectPolicy;
use super::{next_session_id, SessionId};
use crate::config::Settings;

/// A mirroring session for one device.
///
/// Mutated only by the handlers in [`crate::handler`]; the current state is
/// private so every change goes through [`Session::transition`].
#[derive(Debug, Clone)]
pub struct Session {
    /// Unique session identifier
    pub id: SessionId,

    /// Device this session mirrors
    pub device_id: String,

    state: SessionState,

    /// Per-step handshake progress
    pub progress: ConnectionProgressTracker,

    /// Per-subsystem status
    pub components: ComponentStateRegistry,

    /// Bounded reconnect budget
    pub reconnect: ReconnectPolicy,

    /// Event counters and recent failures, kept across cleanups
    pub monitor: SessionMonitor,

    /// When the session was created
    pub created_at: DateTime<Local>,
}

impl Session {
    pub fn new(device_id: impl Into<String>) -> Self {
        Self::with_settings(device_id, &Settings::default())
    }

    pub fn with_settings(device_id: impl Into<String>, settings: &Settings) -> Self {
        Self {
            id: next_session_id(),
            device_id: device_id.into(),
            state: SessionState::Idle,
            progress: ConnectionProgressTracker::new(settings.session.progress_history),
            components: ComponentStateRegistry::new(),
            reconnect: ReconnectPolicy::new(settings.reconnect.max_attempts),
            monitor: SessionMonitor::new(settings.session.exception_history),
            created_at: Local::now(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Move to `next` if the transition graph allows it.
    ///
    /// Returns `false` and leaves the state untouched otherwise. Re-entering
    /// the current state is a no-op that counts as accepted.
    pub fn transition(&mut self, next: SessionState) -> bool {
        if self.state == next {
            return true;
        }

        if !self.state.can_transition_to(&next) {
            warn!(
                "Session {} ({}): rejected transition {} -> {}",
                self.id, self.device_id, self.state, next
            );
            return false;
        }

        debug!(
            "Session {} ({}): {} -> {}",
            self.id, self.device_id, self.state, next
        );
        if next.is_connected() {
            self.monitor.mark_connected();
        } else if self.state.is_connected() {
            if let Some(reason) = next.reason() {
                self.monitor.mark_disconnected(reason);
            }
        }
        self.state = next;
        true
    }

    /// Hard reset to `Idle`, bypassing the transition graph.
    ///
    /// Clears component states and progress and zeroes the reconnect counter.
    /// The monitor is kept.
    pub fn reset(&mut self) {
        info!(
            "Session {} ({}): cleanup from {}",
            self.id, self.device_id, self.state
        );
        self.state = SessionState::Idle;
        self.components.clear();
        self.progress.clear();
        self.reconnect.reset();
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            device_id: self.device_id.clone(),
            state: self.state.clone(),
            progress: self
                .progress
                .snapshot()
                .into_iter()
                .map(|p| (p.step, p))
                .collect(),
            components: self.components.snapshot(),
            reconnect_attempts: self.reconnect.attempts(),
            max_reconnect_attempts: self.reconnect.max_attempts(),
            monitor: self.monitor.clone(),
        }
    }
}

/// Point-in-time copy of everything observable about a session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub device_id: String,
    pub state: SessionState,
    /// Latest progress per step, iterated in handshake order
    pub progress: BTreeMap<ConnectionStep, ConnectionProgress>,
    pub components: BTreeMap<SessionComponent, ComponentState>,
    pub reconnect_attempts: u32,
    pub max_reconnect_attempts: u32,
    pub monitor: SessionMonitor,
}

impl SessionSnapshot {
    pub fn step_status(&self, step: ConnectionStep) -> StepStatus {
        self.progress
            .get(&step)
            .map(|p| p.status)
            .unwrap_or_default()
    }

    pub fn component(&self, component: SessionComponent) -> Option<&ComponentState> {
        self.components.get(&component)
    }
}
