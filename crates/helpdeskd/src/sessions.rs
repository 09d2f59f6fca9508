//! Per-conversation session registry.
//!
//! Each session sits behind its own mutex so two conversations never wait on
//! each other; the map lock is only held to look up, insert or sweep entries.
//! Sessions idle longer than the configured timeout are dropped on the next
//! lookup unless a request still holds them.

use helpdesk_common::Session;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::debug;

/// Session used when a request carries no id.
pub const DEFAULT_SESSION_ID: &str = "default";

/// Idle time after which an unfinished conversation is forgotten.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

pub type SharedSession = Arc<Mutex<Session>>;

#[derive(Debug)]
struct Entry {
    session: SharedSession,
    last_seen: Instant,
}

#[derive(Debug)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Entry>>,
    idle_timeout: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_idle_timeout(DEFAULT_IDLE_TIMEOUT)
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
        }
    }

    /// Existing session for `id`, or a fresh one. Sweeps idle entries first.
    pub async fn get_or_create(&self, id: &str) -> SharedSession {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        self.evict_idle(&mut sessions, now);

        let entry = sessions.entry(id.to_string()).or_insert_with(|| Entry {
            session: Arc::new(Mutex::new(Session::new())),
            last_seen: now,
        });
        entry.last_seen = now;
        entry.session.clone()
    }

    /// Lock the live session for `id`.
    ///
    /// A session that ended while this caller waited on its lock is dropped
    /// from the registry and a fresh one is taken instead.
    pub async fn lock_active(&self, id: &str) -> (SharedSession, OwnedMutexGuard<Session>) {
        loop {
            let session = self.get_or_create(id).await;
            let guard = session.clone().lock_owned().await;
            if !guard.is_ended() {
                return (session, guard);
            }
            drop(guard);
            self.remove(id, &session).await;
        }
    }

    /// Forget `session` if it is still the one registered under `id`.
    pub async fn remove(&self, id: &str, session: &SharedSession) -> bool {
        let mut sessions = self.sessions.write().await;
        let registered = sessions
            .get(id)
            .is_some_and(|entry| Arc::ptr_eq(&entry.session, session));
        if registered {
            sessions.remove(id);
        }
        registered
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn evict_idle(&self, sessions: &mut HashMap<String, Entry>, now: Instant) {
        let before = sessions.len();
        sessions.retain(|_, entry| {
            now.duration_since(entry.last_seen) < self.idle_timeout
                || Arc::strong_count(&entry.session) > 1
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!("Evicted {} idle session(s)", evicted);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helpdesk_common::{Dialogue, KnowledgeBase, MemoryStore};

    #[tokio::test]
    async fn test_same_id_same_session() {
        let registry = SessionRegistry::new();
        let a = registry.get_or_create("abc").await;
        let b = registry.get_or_create("abc").await;
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_remove_starts_fresh() {
        let registry = SessionRegistry::new();
        let first = registry.get_or_create(DEFAULT_SESSION_ID).await;
        first.lock().await.customer_name = Some("Rosa".to_string());

        assert!(registry.remove(DEFAULT_SESSION_ID, &first).await);
        assert!(!registry.remove(DEFAULT_SESSION_ID, &first).await);

        let second = registry.get_or_create(DEFAULT_SESSION_ID).await;
        assert!(second.lock().await.customer_name.is_none());
    }

    #[tokio::test]
    async fn test_remove_keeps_newer_session() {
        let registry = SessionRegistry::new();
        let stale = registry.get_or_create("s").await;
        registry.remove("s", &stale).await;
        let fresh = registry.get_or_create("s").await;

        assert!(!registry.remove("s", &stale).await);
        assert_eq!(registry.len().await, 1);
        assert!(Arc::ptr_eq(&fresh, &registry.get_or_create("s").await));
    }

    #[tokio::test]
    async fn test_idle_sessions_are_evicted() {
        let registry = SessionRegistry::with_idle_timeout(Duration::from_millis(20));
        let held = registry.get_or_create("held").await;
        drop(registry.get_or_create("idle").await);
        assert_eq!(registry.len().await, 2);

        tokio::time::sleep(Duration::from_millis(60)).await;
        registry.get_or_create("new").await;

        // "idle" is gone; "held" is still referenced by a request
        assert_eq!(registry.len().await, 2);
        assert!(Arc::ptr_eq(&held, &registry.get_or_create("held").await));
    }

    #[tokio::test]
    async fn test_lock_active_skips_ended_session() {
        let registry = SessionRegistry::new();
        let dialogue = Dialogue::new(Arc::new(KnowledgeBase::new()), Arc::new(MemoryStore::new()));

        // A request still holding the handle after the conversation ended
        let ended = registry.get_or_create("s").await;
        dialogue.process_message(&mut *ended.lock().await, "chao");
        assert!(ended.lock().await.is_ended());

        let (session, guard) = registry.lock_active("s").await;
        assert!(!Arc::ptr_eq(&session, &ended));
        assert!(!guard.is_ended());
        assert!(guard.messages.is_empty());
        drop(guard);
        assert_eq!(registry.len().await, 1);
    }
}
