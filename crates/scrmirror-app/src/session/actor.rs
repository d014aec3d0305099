//! Session actor - the single serialization point for one session

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, warn};

use super::reconnect::ReconnectSink;
use super::session::{Session, SessionSnapshot};
use crate::engine_event::{diff_snapshots, EngineEvent};
use crate::handler::UpdateAction;
use crate::message::Message;
use crate::process::process_event;

/// Owns a [`Session`] and applies its mailbox in arrival order
pub(crate) struct SessionActor {
    session: Session,
    rx: mpsc::Receiver<Message>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
    event_tx: broadcast::Sender<EngineEvent>,
    reconnect_sink: Arc<dyn ReconnectSink>,
}

impl SessionActor {
    pub(crate) fn new(
        session: Session,
        rx: mpsc::Receiver<Message>,
        snapshot_tx: watch::Sender<SessionSnapshot>,
        event_tx: broadcast::Sender<EngineEvent>,
        reconnect_sink: Arc<dyn ReconnectSink>,
    ) -> Self {
        Self {
            session,
            rx,
            snapshot_tx,
            event_tx,
            reconnect_sink,
        }
    }

    pub(crate) async fn run(mut self) {
        debug!(
            "Session {} ({}) actor started",
            self.session.id, self.session.device_id
        );

        while let Some(msg) = self.rx.recv().await {
            match msg {
                Message::Event(event) => self.apply(event),
                Message::Flush(reply) => {
                    // Receiver may have given up waiting
                    let _ = reply.send(self.session.snapshot());
                }
                Message::Stop => break,
            }
        }

        debug!("Session {} actor stopped", self.session.id);
    }

    fn apply(&mut self, event: scrmirror_core::SessionEvent) {
        let before = self.session.snapshot();
        let actions = process_event(&mut self.session, event);
        let after = self.session.snapshot();

        for engine_event in diff_snapshots(&before, &after) {
            let _ = self.event_tx.send(engine_event);
        }

        self.snapshot_tx.send_replace(after);

        for action in actions {
            self.handle_action(action);
        }
    }

    fn handle_action(&self, action: UpdateAction) {
        match action {
            UpdateAction::RequestReconnect(request) => {
                let _ = self
                    .event_tx
                    .send(EngineEvent::ReconnectRequested(request.clone()));

                if let Err(e) = self.reconnect_sink.request_reconnect(request) {
                    warn!(
                        "Session {}: failed to signal reconnect: {}",
                        self.session.id, e
                    );
                }
            }
        }
    }
}
