//! Per-session conversation logs.
//!
//! This module keeps one [`ConversationLog`] per session id, each behind its
//! own async lock so a turn can hold its session exclusively while the
//! supervisor loop runs. An optional cap on tracked sessions evicts the
//! least recently used idle session.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::log::ConversationLog;
use crate::message::Message;

/// Exclusive access to one session's log for the duration of a turn.
pub type SessionHandle = OwnedMutexGuard<ConversationLog>;

/// Returned when a session id is empty or blank.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("session id must not be empty")]
pub struct InvalidSessionId;

/// Opaque, non-empty session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(String);

impl SessionId {
    /// Validate and wrap a session id.
    pub fn new(id: impl Into<String>) -> Result<Self, InvalidSessionId> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(InvalidSessionId);
        }
        Ok(Self(id))
    }

    /// The raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// In-memory map from session id to conversation log.
///
/// Sessions are created on first use and live until the process exits,
/// unless a session cap is configured.
///
/// # Example
///
/// ```rust
/// use harmonia_core::{Message, SessionId, SessionStore};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let store = SessionStore::new();
///     let id = SessionId::new("s1").unwrap();
///
///     {
///         let mut log = store.lock(&id).await;
///         log.append(Message::user("hello"));
///     }
///
///     assert_eq!(store.history(&id).await.len(), 1);
/// }
/// ```
#[derive(Debug, Default)]
pub struct SessionStore {
    /// Insertion order doubles as recency order for eviction.
    sessions: Mutex<IndexMap<SessionId, Arc<Mutex<ConversationLog>>>>,
    max_sessions: Option<usize>,
}

impl SessionStore {
    /// Create a store that never evicts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that tracks at most `max_sessions` sessions.
    pub fn with_max_sessions(max_sessions: usize) -> Self {
        Self {
            sessions: Mutex::new(IndexMap::new()),
            max_sessions: Some(max_sessions),
        }
    }

    /// Lock a session's log, creating the session if needed.
    ///
    /// Waits while another turn holds the same session. The returned handle
    /// releases the session when dropped.
    pub async fn lock(&self, id: &SessionId) -> SessionHandle {
        let log = self.checkout(id).await;
        log.lock_owned().await
    }

    /// Snapshot a session's messages. Unknown sessions are empty.
    pub async fn history(&self, id: &SessionId) -> Vec<Message> {
        let log = {
            let sessions = self.sessions.lock().await;
            sessions.get(id).cloned()
        };

        match log {
            Some(log) => log.lock().await.messages().to_vec(),
            None => Vec::new(),
        }
    }

    /// Number of tracked sessions.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Whether no session is tracked.
    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    /// Forget an idle session. Returns whether it was removed.
    ///
    /// A session with a turn in flight is kept, so the turn's appends are
    /// never split from the log later turns see.
    pub async fn remove(&self, id: &SessionId) -> bool {
        let mut sessions = self.sessions.lock().await;
        let idle = sessions
            .get(id)
            .is_some_and(|entry| Arc::strong_count(entry) == 1);
        if idle {
            sessions.shift_remove(id);
        }
        idle
    }

    /// Fetch or create the session entry and mark it most recently used.
    async fn checkout(&self, id: &SessionId) -> Arc<Mutex<ConversationLog>> {
        let mut sessions = self.sessions.lock().await;

        let log = sessions.shift_remove(id).unwrap_or_default();
        sessions.insert(id.clone(), log.clone());

        if let Some(max) = self.max_sessions {
            while sessions.len() > max {
                // Sessions referenced outside the map have a turn in flight.
                let idle = sessions
                    .values()
                    .position(|entry| Arc::strong_count(entry) == 1);
                match idle {
                    Some(index) => {
                        sessions.shift_remove_index(index);
                    }
                    None => break,
                }
            }
        }

        log
    }
}
