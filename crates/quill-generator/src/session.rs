//! Per-session state isolation
//!
//! The last generated article and any pending editor redirect belong to one
//! session. [`SessionStore`] keys them by [`SessionId`] so concurrent users of
//! one front end never observe each other's results.

use quill_domain::{ArticleDocument, SessionId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// State carried between pipeline invocations of one session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Most recently generated article, as its JSON interchange form
    pub last_article: Option<String>,
    /// Raw model text behind `last_article`
    pub last_raw_response: Option<String>,
    /// Editor URL to open once, after a successful publish
    pub pending_edit_url: Option<String>,
}

impl SessionState {
    /// Decode the cached article, if any
    pub fn last_document(&self) -> Result<Option<ArticleDocument>, serde_json::Error> {
        self.last_article
            .as_deref()
            .map(ArticleDocument::from_json)
            .transpose()
    }
}

/// Session-keyed store of [`SessionState`]
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<SessionId, SessionState>>,
}

impl SessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, SessionState>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// State of `id`, or a fresh state for an unknown session
    pub fn get(&self, id: SessionId) -> SessionState {
        self.lock().get(&id).cloned().unwrap_or_default()
    }

    /// Replace the state of `id`
    pub fn put(&self, id: SessionId, state: SessionState) {
        self.lock().insert(id, state);
    }

    /// Forget `id`, returning its last state
    pub fn remove(&self, id: SessionId) -> Option<SessionState> {
        self.lock().remove(&id)
    }

    /// Take the pending editor URL of `id`, clearing it
    pub fn take_pending_edit_url(&self, id: SessionId) -> Option<String> {
        self.lock()
            .get_mut(&id)
            .and_then(|state| state.pending_edit_url.take())
    }

    /// Number of sessions with stored state
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no session has stored state
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
