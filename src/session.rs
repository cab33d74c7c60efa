#![cfg(feature = "web")]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, SystemTime};

use uuid::Uuid;

use crate::error::StoreError;
use crate::store::MemoryStore;

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "session";

const SESSION_DURATION: u64 = 24 * 60 * 60; // 24 hours in seconds

/// Dataset slot owned by one session.
pub type SessionStore = Arc<Mutex<MemoryStore>>;

struct SessionEntry {
    store: SessionStore,
    expires_at: SystemTime,
}

/// Per-session dataset stores
///
/// Each session owns its own `MemoryStore`, seeded on its first cycle. A
/// session lives for 24 hours after its last use.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, SessionEntry>>,
    ttl: Duration,
    seed: Option<u64>,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        SessionRegistry {
            sessions: RwLock::new(HashMap::new()),
            ttl: Duration::from_secs(SESSION_DURATION),
            seed: None,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Seeds every new session's dataset from a fixed random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn new_store(&self) -> MemoryStore {
        match self.seed {
            Some(seed) => MemoryStore::with_seed(seed),
            None => MemoryStore::new(),
        }
    }

    /// Registers a new session holding an unseeded store.
    fn open_session(
        &self,
        sessions: &mut HashMap<String, SessionEntry>,
        now: SystemTime,
    ) -> (String, SessionStore) {
        let session_id = Uuid::new_v4().to_string();
        let store = Arc::new(Mutex::new(self.new_store()));
        sessions.insert(
            session_id.clone(),
            SessionEntry {
                store: Arc::clone(&store),
                expires_at: now + self.ttl,
            },
        );
        log::debug!("created session {}", session_id);
        (session_id, store)
    }

    /// Returns the store for `session_id`, opening a new session if it is
    /// missing or expired
    ///
    /// The returned id is the one the caller should hand back to the client;
    /// it differs from the requested one when a new session was opened.
    pub fn store_for(&self, session_id: Option<&str>) -> Result<(String, SessionStore), StoreError> {
        let now = SystemTime::now();
        let mut sessions = self.sessions.write().map_err(|_| StoreError::Poisoned)?;

        if let Some(id) = session_id {
            if let Some(entry) = sessions.get_mut(id) {
                if entry.expires_at > now {
                    entry.expires_at = now + self.ttl;
                    return Ok((id.to_string(), Arc::clone(&entry.store)));
                }
                sessions.remove(id);
                log::debug!("session {} expired", id);
            }
        }

        Ok(self.open_session(&mut sessions, now))
    }

    /// Returns the store of a live session without ever opening a new one.
    ///
    /// Used by read-only requests so cookieless clients do not leave
    /// sessions behind.
    pub fn existing_store(&self, session_id: Option<&str>) -> Result<Option<SessionStore>, StoreError> {
        let Some(id) = session_id else {
            return Ok(None);
        };
        let now = SystemTime::now();
        let mut sessions = self.sessions.write().map_err(|_| StoreError::Poisoned)?;
        Ok(sessions
            .get_mut(id)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| {
                entry.expires_at = now + self.ttl;
                Arc::clone(&entry.store)
            }))
    }

    /// A throwaway store seeded the same way session stores are.
    pub fn detached_store(&self) -> MemoryStore {
        self.new_store()
    }

    /// Drops expired sessions; returns how many were removed.
    pub fn purge_expired(&self) -> Result<usize, StoreError> {
        let now = SystemTime::now();
        let mut sessions = self.sessions.write().map_err(|_| StoreError::Poisoned)?;
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at > now);
        Ok(before - sessions.len())
    }

    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
