//! Per-session state with an explicit lifecycle.
//!
//! Sessions are created, read, updated and ended by the caller; nothing here
//! is global and nothing outlives `end`.

use crate::domain::SessionId;
use crate::portfolio::Portfolio;
use std::collections::HashMap;

/// Everything one user session keeps between requests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub portfolio: Portfolio,
    pub selected_ticker: Option<String>,
}

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<SessionId, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session. An existing session with the same id is kept.
    pub fn create(&mut self, id: SessionId) -> &mut Session {
        tracing::debug!(session = %id, "session created");
        self.sessions.entry(id).or_default()
    }

    pub fn get(&self, id: &SessionId) -> Option<&Session> {
        self.sessions.get(id)
    }

    pub fn get_mut(&mut self, id: &SessionId) -> Option<&mut Session> {
        self.sessions.get_mut(id)
    }

    /// Drop a session and return its final state.
    pub fn end(&mut self, id: &SessionId) -> Option<Session> {
        let ended = self.sessions.remove(id);
        if ended.is_some() {
            tracing::debug!(session = %id, "session ended");
        }
        ended
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
