// SPDX-FileCopyrightText: 2026 Govchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory session store keyed by an opaque cookie id.
//!
//! Each session is wrapped in its own `tokio::sync::Mutex`; handlers perform
//! read-modify-write under that lock, so two in-flight requests for the same
//! session serialize on sequence increments. Sessions are independent: there
//! is no cross-session locking.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::session::Session;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "govchat.sid";

/// Shared handle to one session's state.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Keyed in-memory session store with TTL expiry.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, SessionHandle>>,
    ttl: Duration,
}

impl SessionStore {
    /// Creates a store whose sessions expire `ttl` after creation.
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Session lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Creates a fresh session and returns its opaque cookie id.
    pub fn create(&self) -> (String, SessionHandle) {
        let id = Uuid::new_v4().to_string();
        let handle: SessionHandle = Arc::new(Mutex::new(Session::new()));
        self.sessions.insert(id.clone(), handle.clone());
        debug!(session_id = %id, "session created");
        (id, handle)
    }

    /// Looks up a live session. Expired sessions are dropped on access and
    /// reported as absent.
    pub fn get(&self, id: &str) -> Option<SessionHandle> {
        let handle = self.sessions.get(id)?.clone();
        if self.is_expired(&handle) {
            drop(self.sessions.remove(id));
            debug!(session_id = %id, "session expired");
            return None;
        }
        Some(handle)
    }

    /// Removes a session (sign-out).
    pub fn remove(&self, id: &str) {
        if self.sessions.remove(id).is_some() {
            debug!(session_id = %id, "session removed");
        }
    }

    /// Drops every expired session. Callers run this periodically; `get`
    /// already drops expired entries lazily.
    pub fn purge_expired(&self) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, handle| !self.is_expired(handle));
        before - self.sessions.len()
    }

    /// Number of live entries (expired-but-unpurged included).
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn is_expired(&self, handle: &SessionHandle) -> bool {
        // try_lock: a session busy in a request is by definition not expired
        // enough to matter; skip it rather than block the purge.
        match handle.try_lock() {
            Ok(session) => {
                let age = Utc::now() - session.created_at;
                age.to_std().map(|a| a >= self.ttl).unwrap_or(false)
            }
            Err(_) => false,
        }
    }
}
