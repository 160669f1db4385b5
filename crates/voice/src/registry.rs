use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{info, warn};

use dineline_agent::session::CallSession;

/// Concurrency-safe map from call identifier to its owned session.
/// Sessions are inserted on call start and removed on call end or transfer;
/// the registry is the sole owner of session lifetime.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<CallSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates and registers a fresh session for `call_id`.
    pub fn insert(&self, call_id: &str) -> Arc<CallSession> {
        let session = Arc::new(CallSession::new(call_id));
        let replaced = self.write_sessions().insert(call_id.to_string(), session.clone());

        if replaced.is_some() {
            warn!(event_name = "voice.session.replaced", call_id, "replaced existing session");
        } else {
            info!(event_name = "voice.session.started", call_id, "session registered");
        }

        session
    }

    pub fn get(&self, call_id: &str) -> Option<Arc<CallSession>> {
        self.read_sessions().get(call_id).cloned()
    }

    pub fn remove(&self, call_id: &str) -> Option<Arc<CallSession>> {
        let removed = self.write_sessions().remove(call_id);
        if removed.is_some() {
            info!(event_name = "voice.session.ended", call_id, "session removed");
        }
        removed
    }

    pub fn active_calls(&self) -> usize {
        self.read_sessions().len()
    }

    fn read_sessions(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<CallSession>>> {
        self.sessions.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_sessions(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<CallSession>>> {
        self.sessions.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::SessionRegistry;

    #[test]
    fn insert_get_remove_lifecycle() {
        let registry = SessionRegistry::new();
        assert_eq!(registry.active_calls(), 0);

        let session = registry.insert("CA1");
        assert_eq!(session.call_id(), "CA1");
        assert_eq!(registry.active_calls(), 1);
        assert!(registry.get("CA1").is_some());

        registry.remove("CA1");
        assert_eq!(registry.active_calls(), 0);
        assert!(registry.get("CA1").is_none());
    }

    #[tokio::test]
    async fn sessions_are_isolated_per_call() {
        let registry = SessionRegistry::new();
        let first = registry.insert("CA1");
        let second = registry.insert("CA2");

        first.lock().await.history.push(dineline_core::Message::User("hi".to_string()));

        assert_eq!(first.lock().await.history.len(), 1);
        assert!(second.lock().await.history.is_empty());
    }
}
