//! Analysis session and session storage.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::extraction::{ExtractionMode, ExtractionResult};

/// Default session timeout (30 minutes).
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// A single dashboard session.
///
/// Cloning is cheap; clones share the same state.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    id: String,
    created_at: DateTime<Utc>,
    state: RwLock<AnalysisSnapshot>,
}

/// Point-in-time copy of a session's analysis state.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisSnapshot {
    /// Name of the most recently analysed file.
    pub file_name: Option<String>,
    /// Mode used for the current result.
    pub mode: Option<ExtractionMode>,
    /// Text extracted from the current file.
    pub text: Option<String>,
    /// Extraction result for the current text.
    pub result: Option<ExtractionResult>,
    /// Last time the state changed.
    pub updated_at: Option<DateTime<Utc>>,
    /// Bumped on every upload; results for an older upload are discarded.
    #[serde(skip)]
    generation: u64,
}

impl Session {
    fn new(id: String) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                id,
                created_at: Utc::now(),
                state: RwLock::new(AnalysisSnapshot::default()),
            }),
        }
    }

    /// Get the session ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Replace the extracted text for a new upload.
    ///
    /// The previous result no longer matches the text, so it is cleared.
    /// Returns the upload generation to pass to [`Self::record_result`].
    pub fn record_text(&self, file_name: impl Into<String>, text: impl Into<String>) -> u64 {
        let mut guard = self.inner.state.write().unwrap_or_else(PoisonError::into_inner);
        guard.generation += 1;
        guard.file_name = Some(file_name.into());
        guard.text = Some(text.into());
        guard.mode = None;
        guard.result = None;
        guard.updated_at = Some(Utc::now());
        guard.generation
    }

    /// Store the result of an analysis run started at `generation`.
    ///
    /// Returns `false`, leaving the state untouched, when another upload
    /// replaced the text in the meantime.
    pub fn record_result(
        &self,
        generation: u64,
        mode: ExtractionMode,
        result: ExtractionResult,
    ) -> bool {
        let mut guard = self.inner.state.write().unwrap_or_else(PoisonError::into_inner);
        if guard.generation != generation {
            return false;
        }
        guard.mode = Some(mode);
        guard.result = Some(result);
        guard.updated_at = Some(Utc::now());
        true
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> AnalysisSnapshot {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Check if the session has been idle longer than `timeout`.
    #[must_use]
    pub fn is_expired_with_timeout(&self, timeout: Duration) -> bool {
        let last = self
            .inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .updated_at
            .unwrap_or(self.inner.created_at);
        // Negative duration means clock skew; treat as active.
        (Utc::now() - last)
            .to_std()
            .is_ok_and(|idle| idle > timeout)
    }
}

/// Thread-safe store for sessions.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    /// Create a new session store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new session and return it.
    #[must_use]
    pub fn create(&self) -> Session {
        let session = Session::new(Uuid::new_v4().to_string());
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session.id().to_string(), session.clone());
        session
    }

    /// Get a session by ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Session> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Get a session by ID, or create a fresh one when the ID is unknown.
    ///
    /// Unknown IDs are not adopted; the new session gets its own UUID.
    #[must_use]
    pub fn get_or_create(&self, id: Option<&str>) -> Session {
        id.filter(|id| !id.is_empty())
            .and_then(|id| self.get(id))
            .unwrap_or_else(|| self.create())
    }

    /// Remove a session by ID.
    pub fn remove(&self, id: &str) -> Option<Session> {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
    }

    /// Get the number of active sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove sessions that have been inactive longer than the timeout.
    ///
    /// Returns the number of sessions removed.
    pub fn cleanup_expired_with_timeout(&self, timeout: Duration) -> usize {
        let mut guard = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let before = guard.len();
        guard.retain(|_, session| !session.is_expired_with_timeout(timeout));
        before - guard.len()
    }
}
