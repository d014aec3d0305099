//! Per-step connection progress tracking

use std::collections::{BTreeMap, VecDeque};

use scrmirror_core::{ConnectionProgress, ConnectionStep, StepStatus};

/// Latest status per handshake step plus a bounded history of every update.
///
/// The per-step map is the canonical view: last write wins per step, and
/// [`snapshot`](Self::snapshot) is always ordered `AdbConnect..Completed`.
#[derive(Debug, Clone)]
pub struct ConnectionProgressTracker {
    latest: BTreeMap<ConnectionStep, ConnectionProgress>,
    history: VecDeque<ConnectionProgress>,
    capacity: usize,
    last_step: Option<ConnectionStep>,
}

impl ConnectionProgressTracker {
    pub fn new(capacity: usize) -> Self {
        Self {
            latest: BTreeMap::new(),
            history: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
            last_step: None,
        }
    }

    /// Record a new status for `step`, replacing the previous entry for it
    pub fn update(
        &mut self,
        step: ConnectionStep,
        status: StepStatus,
        message: Option<String>,
        error: Option<String>,
    ) -> &ConnectionProgress {
        let progress = ConnectionProgress::new(step, status, message, error);

        if self.capacity > 0 {
            if self.history.len() >= self.capacity {
                self.history.pop_front();
            }
            self.history.push_back(progress.clone());
        }

        tracing::trace!("Progress {} -> {}: {}", step, status.label(), progress.message);

        self.last_step = Some(step);
        self.latest.insert(step, progress);
        &self.latest[&step]
    }

    pub fn get(&self, step: ConnectionStep) -> Option<&ConnectionProgress> {
        self.latest.get(&step)
    }

    /// Status of `step`, `Pending` when nothing was reported yet
    pub fn status(&self, step: ConnectionStep) -> StepStatus {
        self.latest
            .get(&step)
            .map(|p| p.status)
            .unwrap_or_default()
    }

    /// Most recent update across all steps
    pub fn current(&self) -> Option<&ConnectionProgress> {
        self.last_step.and_then(|step| self.latest.get(&step))
    }

    /// Ordered view of the latest entry per reported step
    pub fn snapshot(&self) -> Vec<ConnectionProgress> {
        self.latest.values().cloned().collect()
    }

    /// Every recorded update, oldest first
    pub fn history(&self) -> impl Iterator<Item = &ConnectionProgress> + '_ {
        self.history.iter()
    }

    /// Earliest step in handshake order whose latest status is `Failed`
    pub fn failed_step(&self) -> Option<&ConnectionProgress> {
        self.latest.values().find(|p| p.is_failed())
    }

    pub fn is_empty(&self) -> bool {
        self.latest.is_empty()
    }

    pub fn clear(&mut self) {
        self.latest.clear();
        self.history.clear();
        self.last_step = None;
    }
}

impl Default for ConnectionProgressTracker {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_PROGRESS_HISTORY)
    }
}
