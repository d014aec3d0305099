//! Engine - owns every session and the channels around them
//!
//! The Engine is the only entry point collaborators need: it creates one
//! actor per device session, routes events to it, and fans observable
//! changes out on a broadcast channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, watch};

use scrmirror_core::prelude::*;
use scrmirror_core::SessionEvent;

use crate::config::Settings;
use crate::engine_event::EngineEvent;
use crate::session::{
    ReconnectRequest, ReconnectSink, SessionId, SessionRuntime, SessionSnapshot,
};
use crate::session_manager::SessionManager;

/// Orchestration engine for mirroring sessions.
///
/// Encapsulates:
/// - Session actors (one per device)
/// - Event broadcasting for external consumers
/// - The outbound reconnect channel
/// - Settings
pub struct Engine {
    /// Loaded settings
    settings: Settings,

    sessions: SessionManager,

    /// Plumbing handed to each spawned actor
    runtime: SessionRuntime,

    /// Receiving end of the default reconnect sink, until taken
    reconnect_rx: Option<mpsc::UnboundedReceiver<ReconnectRequest>>,
}

impl Engine {
    /// Create an engine whose reconnect signals go to an internal channel.
    ///
    /// Take the receiving end with [`Engine::take_reconnect_receiver`].
    pub fn new(settings: Settings) -> Self {
        let (reconnect_tx, reconnect_rx) = mpsc::unbounded_channel();
        let mut engine = Self::with_reconnect_sink(settings, Arc::new(reconnect_tx));
        engine.reconnect_rx = Some(reconnect_rx);
        engine
    }

    /// Create an engine that signals reconnects to a caller-provided sink
    pub fn with_reconnect_sink(settings: Settings, reconnect_sink: Arc<dyn ReconnectSink>) -> Self {
        let (event_tx, _) = broadcast::channel(settings.engine.event_capacity.max(1));

        info!(
            "Engine ready (max {} sessions, {} reconnect attempts)",
            settings.session.max_sessions, settings.reconnect.max_attempts
        );

        Self {
            sessions: SessionManager::new(settings.session.max_sessions),
            runtime: SessionRuntime {
                settings: settings.clone(),
                event_tx,
                reconnect_sink,
            },
            settings,
            reconnect_rx: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Subscribe to engine events.
    ///
    /// Only events emitted after this call are received.
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.runtime.event_tx.subscribe()
    }

    /// Receiver for reconnect requests, available once for engines built with
    /// [`Engine::new`]
    pub fn take_reconnect_receiver(&mut self) -> Option<mpsc::UnboundedReceiver<ReconnectRequest>> {
        self.reconnect_rx.take()
    }

    /// Start a session for `device_id`. Must be called within a tokio runtime.
    pub fn create_session(&mut self, device_id: &str) -> Result<SessionId> {
        let session_id = self.sessions.create_session(device_id, &self.runtime)?;
        self.emit(EngineEvent::SessionCreated {
            session_id,
            device_id: device_id.to_string(),
        });
        Ok(session_id)
    }

    /// Queue an event for a session
    pub async fn dispatch(&self, session_id: SessionId, event: SessionEvent) -> Result<()> {
        let handle = self
            .sessions
            .get(session_id)
            .ok_or_else(|| Error::session_not_found(session_id))?;
        handle.send(event).await
    }

    /// Wait until every event dispatched so far was applied
    pub async fn flush(&self, session_id: SessionId) -> Result<SessionSnapshot> {
        let handle = self
            .sessions
            .get(session_id)
            .ok_or_else(|| Error::session_not_found(session_id))?;
        handle.flush().await
    }

    /// Latest published snapshot of a session
    pub fn snapshot(&self, session_id: SessionId) -> Result<SessionSnapshot> {
        self.sessions
            .get(session_id)
            .map(|h| h.snapshot())
            .ok_or_else(|| Error::session_not_found(session_id))
    }

    /// Observe a session's snapshot as it changes
    pub fn watch_session(&self, session_id: SessionId) -> Result<watch::Receiver<SessionSnapshot>> {
        self.sessions
            .get(session_id)
            .map(|h| h.watch())
            .ok_or_else(|| Error::session_not_found(session_id))
    }

    pub fn find_session(&self, device_id: &str) -> Option<SessionId> {
        self.sessions.find_by_device(device_id)
    }

    /// Session IDs in creation order
    pub fn session_ids(&self) -> Vec<SessionId> {
        self.sessions.session_ids().to_vec()
    }

    /// Stop a session's actor and discard it
    pub async fn remove_session(&mut self, session_id: SessionId) -> Result<()> {
        let mut handle = self
            .sessions
            .remove_session(session_id)
            .ok_or_else(|| Error::session_not_found(session_id))?;

        handle.stop(self.shutdown_timeout()).await;
        self.emit(EngineEvent::SessionRemoved { session_id });
        info!("Removed session {} ({})", session_id, handle.device_id);
        Ok(())
    }

    /// Stop every session actor, waiting a bounded time for each
    pub async fn shutdown(&mut self) {
        self.emit(EngineEvent::Shutdown);

        let timeout = self.shutdown_timeout();
        for mut handle in self.sessions.drain() {
            handle.stop(timeout).await;
            info!("Session {} cleaned up", handle.session_id);
        }
    }

    fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.settings.engine.shutdown_timeout_ms)
    }

    fn emit(&self, event: EngineEvent) {
        let _ = self.runtime.event_tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MockReconnectSink;
    use scrmirror_core::{SessionState, SocketKind};

    fn connect_events() -> Vec<SessionEvent> {
        vec![
            SessionEvent::TransportConnecting,
            SessionEvent::TransportConnected,
            SessionEvent::ServerStarted,
            SessionEvent::SocketConnected {
                kind: SocketKind::Video,
            },
            SessionEvent::SocketConnected {
                kind: SocketKind::Audio,
            },
            SessionEvent::SocketConnected {
                kind: SocketKind::Control,
            },
        ]
    }

    #[tokio::test]
    async fn test_dispatch_and_flush() {
        let mut engine = Engine::new(Settings::default());
        let id = engine.create_session("emulator-5554").unwrap();

        for event in connect_events() {
            engine.dispatch(id, event).await.unwrap();
        }
        let snapshot = engine.flush(id).await.unwrap();

        assert_eq!(snapshot.state, SessionState::Connected);
        // The watch channel holds the same value once flushed
        assert_eq!(engine.snapshot(id).unwrap(), snapshot);
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let engine = Engine::new(Settings::default());

        let err = engine
            .dispatch(999_999, SessionEvent::RequestCleanup)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::SessionNotFound { id: 999_999 }));
        assert!(engine.snapshot(999_999).is_err());
    }

    #[tokio::test]
    async fn test_reconnect_reaches_channel_and_subscribers() {
        let mut engine = Engine::new(Settings::default());
        let mut events = engine.subscribe();
        let mut reconnects = engine.take_reconnect_receiver().unwrap();
        assert!(engine.take_reconnect_receiver().is_none());

        let id = engine.create_session("emulator-5554").unwrap();
        for event in connect_events() {
            engine.dispatch(id, event).await.unwrap();
        }
        engine
            .dispatch(
                id,
                SessionEvent::SocketDisconnected {
                    kind: SocketKind::Audio,
                },
            )
            .await
            .unwrap();
        engine.flush(id).await.unwrap();

        let request = reconnects.try_recv().unwrap();
        assert_eq!(request.session_id, id);
        assert_eq!(request.attempt, 1);
        assert_eq!(request.max_attempts, 3);
        assert_eq!(request.reason, "audio socket disconnected");

        let mut saw_reconnect = false;
        while let Ok(event) = events.try_recv() {
            if let EngineEvent::ReconnectRequested(r) = event {
                assert_eq!(r, request);
                saw_reconnect = true;
            }
        }
        assert!(saw_reconnect);
    }

    #[tokio::test]
    async fn test_custom_sink_receives_requests() {
        let mut sink = MockReconnectSink::new();
        sink.expect_request_reconnect()
            .withf(|r| r.attempt == 1 && r.device_id == "usb-1")
            .times(1)
            .returning(|_| Ok(()));

        let mut engine = Engine::with_reconnect_sink(Settings::default(), Arc::new(sink));
        assert!(engine.take_reconnect_receiver().is_none());

        let id = engine.create_session("usb-1").unwrap();
        for event in connect_events() {
            engine.dispatch(id, event).await.unwrap();
        }
        engine
            .dispatch(
                id,
                SessionEvent::RequestReconnect {
                    reason: "user asked".into(),
                },
            )
            .await
            .unwrap();
        let snapshot = engine.flush(id).await.unwrap();

        assert_eq!(snapshot.state, SessionState::Reconnecting { attempt: 1 });
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let mut engine = Engine::new(Settings::default());
        let a = engine.create_session("a").unwrap();
        let b = engine.create_session("b").unwrap();

        for event in connect_events() {
            engine.dispatch(a, event).await.unwrap();
        }
        engine
            .dispatch(b, SessionEvent::TransportConnecting)
            .await
            .unwrap();

        assert_eq!(engine.flush(a).await.unwrap().state, SessionState::Connected);
        assert_eq!(
            engine.flush(b).await.unwrap().state,
            SessionState::AdbConnecting
        );
    }

    #[tokio::test]
    async fn test_watch_session_sees_updates() {
        let mut engine = Engine::new(Settings::default());
        let id = engine.create_session("a").unwrap();
        let mut rx = engine.watch_session(id).unwrap();

        engine
            .dispatch(id, SessionEvent::TransportConnecting)
            .await
            .unwrap();
        rx.changed().await.unwrap();

        assert_eq!(rx.borrow().state, SessionState::AdbConnecting);
    }

    #[tokio::test]
    async fn test_remove_session_emits_event() {
        let mut engine = Engine::new(Settings::default());
        let mut events = engine.subscribe();
        let id = engine.create_session("a").unwrap();

        engine.remove_session(id).await.unwrap();

        assert!(engine.session_ids().is_empty());
        assert!(engine.find_session("a").is_none());
        assert_eq!(
            events.recv().await.unwrap(),
            EngineEvent::SessionCreated {
                session_id: id,
                device_id: "a".into()
            }
        );
        assert_eq!(
            events.recv().await.unwrap(),
            EngineEvent::SessionRemoved { session_id: id }
        );
        assert!(engine.remove_session(id).await.is_err());
    }

    #[tokio::test]
    async fn test_shutdown_stops_all_sessions() {
        let mut engine = Engine::new(Settings::default());
        let mut events = engine.subscribe();
        engine.create_session("a").unwrap();
        engine.create_session("b").unwrap();

        engine.shutdown().await;

        assert!(engine.session_ids().is_empty());
        let mut saw_shutdown = false;
        while let Ok(event) = events.try_recv() {
            saw_shutdown |= event == EngineEvent::Shutdown;
        }
        assert!(saw_shutdown);
    }
}
