//! In-memory session store
//!
//! A missing entry reads as the default idle member session. Entries are
//! replaced wholesale; callers serialize per-user updates (see `SessionRouter`).

use crate::db::UserId;
use crate::state_machine::Session;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy)]
struct SessionEntry {
    session: Session,
    last_seen: Instant,
}

#[derive(Debug, Default)]
pub struct SessionStore {
    entries: RwLock<HashMap<UserId, SessionEntry>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, user: UserId) -> Session {
        self.entries
            .read()
            .await
            .get(&user)
            .map(|e| e.session)
            .unwrap_or_default()
    }

    pub async fn put(&self, user: UserId, session: Session) {
        self.entries.write().await.insert(
            user,
            SessionEntry {
                session,
                last_seen: Instant::now(),
            },
        );
    }

    /// Drop sessions untouched for longer than `ttl`; returns how many went
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| e.last_seen.elapsed() <= ttl);
        before - entries.len()
    }

    #[allow(dead_code)] // Used in tests
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
