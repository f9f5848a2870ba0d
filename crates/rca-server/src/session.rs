//! Per-client session state: one history buffer per session.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use rca_core::{Error, Result, SessionId};
use rca_engine::History;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

/// One client's accumulated history
pub struct Session {
    pub created_at: DateTime<Utc>,
    pub history: History,
    /// Alphabet size of the most recent run, used when rendering
    pub states: u32,
    pub runs: u64,
    last_used: Instant,
}

impl Session {
    fn new() -> Self {
        Self {
            created_at: Utc::now(),
            history: History::new(),
            states: 2,
            runs: 0,
            last_used: Instant::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    pub live_sessions: usize,
    pub total_sessions: usize,
    pub runs_completed: u64,
}

pub struct SessionManager {
    sessions: DashMap<SessionId, Arc<Mutex<Session>>>,
    max_sessions: usize,
    total_sessions: RwLock<usize>,
    runs_completed: RwLock<u64>,
}

impl SessionManager {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            max_sessions,
            total_sessions: RwLock::new(0),
            runs_completed: RwLock::new(0),
        }
    }

    /// Open a new session with an empty history
    #[instrument(skip(self))]
    pub fn create(&self) -> Result<SessionId> {
        if self.sessions.len() >= self.max_sessions {
            return Err(Error::InvalidState(format!(
                "session limit of {} reached",
                self.max_sessions
            )));
        }

        let id = SessionId::new();
        self.sessions.insert(id, Arc::new(Mutex::new(Session::new())));
        *self.total_sessions.write() += 1;

        debug!(session_id = %id, "Created session");
        Ok(id)
    }

    #[instrument(skip(self))]
    pub fn remove(&self, id: SessionId) -> Result<()> {
        self.sessions
            .remove(&id)
            .map(|_| debug!(session_id = %id, "Removed session"))
            .ok_or_else(|| not_found(id))
    }

    /// Run `f` with exclusive access to the session.
    ///
    /// Only the session itself is locked while `f` runs: requests for the
    /// same session serialise, the map and other sessions stay available.
    pub fn with_session<R>(
        &self,
        id: SessionId,
        f: impl FnOnce(&mut Session) -> Result<R>,
    ) -> Result<R> {
        let session = self.get(id)?;
        let mut session = session.lock();
        session.last_used = Instant::now();
        let result = f(&mut session);
        session.last_used = Instant::now();
        result
    }

    fn get(&self, id: SessionId) -> Result<Arc<Mutex<Session>>> {
        self.sessions
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| not_found(id))
    }

    pub fn record_run(&self) {
        *self.runs_completed.write() += 1;
    }

    /// Drop sessions unused for longer than `ttl`. Sessions in use are kept.
    #[instrument(skip(self))]
    pub fn expire_idle(&self, ttl: Duration) -> usize {
        let now = Instant::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, session| {
            session
                .try_lock()
                .map_or(true, |s| now.duration_since(s.last_used) <= ttl)
        });
        let expired = before.saturating_sub(self.sessions.len());

        if expired > 0 {
            info!("Expired {} idle sessions", expired);
        }
        expired
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            live_sessions: self.sessions.len(),
            total_sessions: *self.total_sessions.read(),
            runs_completed: *self.runs_completed.read(),
        }
    }
}

fn not_found(id: SessionId) -> Error {
    Error::NotFound(format!("session {}", id))
}
