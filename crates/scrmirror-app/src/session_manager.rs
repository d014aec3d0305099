//! Manages the sessions of all devices

use std::collections::HashMap;

use scrmirror_core::prelude::*;

use super::session::{Session, SessionHandle, SessionId, SessionRuntime};

/// Owns one [`SessionHandle`] per device
#[derive(Debug)]
pub struct SessionManager {
    /// All session handles indexed by session ID
    sessions: HashMap<SessionId, SessionHandle>,

    /// Creation order of session IDs
    session_order: Vec<SessionId>,

    max_sessions: usize,
}

impl SessionManager {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            session_order: Vec::new(),
            max_sessions,
        }
    }

    /// Create a session for `device_id` and spawn its actor
    pub fn create_session(&mut self, device_id: &str, runtime: &SessionRuntime) -> Result<SessionId> {
        if self.find_by_device(device_id).is_some() {
            return Err(Error::duplicate_device(device_id));
        }

        if self.sessions.len() >= self.max_sessions {
            return Err(Error::SessionLimit {
                max: self.max_sessions,
            });
        }

        let session = Session::with_settings(device_id, &runtime.settings);
        let id = session.id;
        let handle = SessionHandle::spawn(session, runtime);

        self.sessions.insert(id, handle);
        self.session_order.push(id);

        info!("Created session {} for device {}", id, device_id);
        Ok(id)
    }

    /// Remove a session, handing back its handle so the caller can stop it
    pub fn remove_session(&mut self, session_id: SessionId) -> Option<SessionHandle> {
        self.session_order.retain(|&id| id != session_id);
        self.sessions.remove(&session_id)
    }

    /// Get a session by ID
    pub fn get(&self, session_id: SessionId) -> Option<&SessionHandle> {
        self.sessions.get(&session_id)
    }

    /// Get a mutable session by ID
    pub fn get_mut(&mut self, session_id: SessionId) -> Option<&mut SessionHandle> {
        self.sessions.get_mut(&session_id)
    }

    /// Find the session mirroring `device_id`
    pub fn find_by_device(&self, device_id: &str) -> Option<SessionId> {
        self.session_order
            .iter()
            .copied()
            .find(|id| self.sessions.get(id).is_some_and(|h| h.device_id == device_id))
    }

    /// Session IDs in creation order
    pub fn session_ids(&self) -> &[SessionId] {
        &self.session_order
    }

    /// Remove every session, in creation order
    pub fn drain(&mut self) -> Vec<SessionHandle> {
        let order = std::mem::take(&mut self.session_order);
        order
            .into_iter()
            .filter_map(|id| self.sessions.remove(&id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use std::sync::Arc;
    use tokio::sync::{broadcast, mpsc};

    fn runtime() -> SessionRuntime {
        let (event_tx, _) = broadcast::channel(16);
        let (reconnect_tx, _reconnect_rx) = mpsc::unbounded_channel();
        SessionRuntime {
            settings: Settings::default(),
            event_tx,
            reconnect_sink: Arc::new(reconnect_tx),
        }
    }

    #[tokio::test]
    async fn test_create_and_find_session() {
        let runtime = runtime();
        let mut manager = SessionManager::new(9);

        let id = manager.create_session("emulator-5554", &runtime).unwrap();

        assert_eq!(manager.len(), 1);
        assert_eq!(manager.find_by_device("emulator-5554"), Some(id));
        assert_eq!(manager.get(id).unwrap().device_id, "emulator-5554");
    }

    #[tokio::test]
    async fn test_duplicate_device_rejected() {
        let runtime = runtime();
        let mut manager = SessionManager::new(9);
        manager.create_session("emulator-5554", &runtime).unwrap();

        let err = manager
            .create_session("emulator-5554", &runtime)
            .unwrap_err();

        assert!(matches!(err, Error::DuplicateDevice { .. }));
        assert_eq!(manager.len(), 1);
    }

    #[tokio::test]
    async fn test_session_limit() {
        let runtime = runtime();
        let mut manager = SessionManager::new(2);
        manager.create_session("a", &runtime).unwrap();
        manager.create_session("b", &runtime).unwrap();

        let err = manager.create_session("c", &runtime).unwrap_err();

        assert!(matches!(err, Error::SessionLimit { max: 2 }));
    }

    #[tokio::test]
    async fn test_remove_frees_slot_and_device() {
        let runtime = runtime();
        let mut manager = SessionManager::new(1);
        let id = manager.create_session("a", &runtime).unwrap();

        assert!(manager.remove_session(id).is_some());
        assert!(manager.is_empty());
        assert!(manager.session_ids().is_empty());

        manager.create_session("a", &runtime).unwrap();
    }

    #[tokio::test]
    async fn test_drain_keeps_creation_order() {
        let runtime = runtime();
        let mut manager = SessionManager::new(9);
        let a = manager.create_session("a", &runtime).unwrap();
        let b = manager.create_session("b", &runtime).unwrap();

        let drained: Vec<_> = manager.drain().iter().map(|h| h.session_id).collect();

        assert_eq!(drained, vec![a, b]);
        assert!(manager.is_empty());
    }
}
