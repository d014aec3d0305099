//! Session handle - mailbox and observers for a running session actor

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use scrmirror_core::prelude::*;
use scrmirror_core::SessionEvent;

use super::actor::SessionActor;
use super::reconnect::ReconnectSink;
use super::session::{Session, SessionSnapshot};
use super::SessionId;
use crate::config::Settings;
use crate::engine_event::EngineEvent;
use crate::message::Message;

/// Shared plumbing every session actor is spawned with
#[derive(Clone)]
pub struct SessionRuntime {
    pub settings: Settings,
    pub event_tx: broadcast::Sender<EngineEvent>,
    pub reconnect_sink: Arc<dyn ReconnectSink>,
}

impl std::fmt::Debug for SessionRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRuntime")
            .field("settings", &self.settings)
            .field("subscribers", &self.event_tx.receiver_count())
            .finish()
    }
}

/// Handle for talking to a session's actor task
pub struct SessionHandle {
    pub session_id: SessionId,

    pub device_id: String,

    /// Mailbox of the actor
    tx: mpsc::Sender<Message>,

    /// Latest snapshot published by the actor
    snapshot_rx: watch::Receiver<SessionSnapshot>,

    /// Actor task, taken on stop
    task: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("session_id", &self.session_id)
            .field("device_id", &self.device_id)
            .field("state", &self.snapshot_rx.borrow().state)
            .field("running", &self.task.is_some())
            .finish()
    }
}

impl SessionHandle {
    /// Spawn an actor owning `session` on the current tokio runtime
    pub fn spawn(session: Session, runtime: &SessionRuntime) -> Self {
        let session_id = session.id;
        let device_id = session.device_id.clone();

        let (tx, rx) = mpsc::channel(runtime.settings.engine.mailbox_capacity.max(1));
        let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot());

        let actor = SessionActor::new(
            session,
            rx,
            snapshot_tx,
            runtime.event_tx.clone(),
            runtime.reconnect_sink.clone(),
        );
        let task = tokio::spawn(actor.run());

        Self {
            session_id,
            device_id,
            tx,
            snapshot_rx,
            task: Some(task),
        }
    }

    /// Queue an event; waits only when the mailbox is full
    pub async fn send(&self, event: SessionEvent) -> Result<()> {
        self.tx
            .send(Message::Event(event))
            .await
            .map_err(|_| Error::ChannelClosed)
    }

    /// Wait until every previously queued event was applied
    pub async fn flush(&self) -> Result<SessionSnapshot> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Message::Flush(reply_tx))
            .await
            .map_err(|_| Error::ChannelClosed)?;
        reply_rx.await.map_err(|_| Error::ChannelClosed)
    }

    /// Latest published snapshot (may lag queued events)
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_rx.clone()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop the actor after queued events and wait up to `timeout` for it
    pub async fn stop(&mut self, timeout: Duration) {
        let Some(mut task) = self.task.take() else {
            return;
        };

        if self.tx.send(Message::Stop).await.is_err() {
            debug!("Session {} actor already gone", self.session_id);
        }

        match tokio::time::timeout(timeout, &mut task).await {
            Ok(Ok(())) => debug!("Session {} actor joined", self.session_id),
            Ok(Err(e)) => warn!("Session {} actor panicked: {}", self.session_id, e),
            Err(_) => {
                warn!(
                    "Session {} actor did not stop within {:?}, aborting",
                    self.session_id, timeout
                );
                task.abort();
            }
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
