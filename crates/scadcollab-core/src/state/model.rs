//! Client-local state model.
//!
//! A per-browser-tab (per-process) mirror of "which session is
//! active", a pending first prompt carried over from a landing flow,
//! and per-(session, user) last-read marks for the team chat. None of
//! this is synchronized between clients; it exists for reload
//! survival only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Persisted client-local state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientState {
    /// The session the client is currently operating on.
    #[serde(default)]
    pub active_session_id: Option<String>,
    /// A prompt captured before the session was opened; surfaced as
    /// pending input on the next bootstrap, never replayed.
    #[serde(default)]
    pub initial_prompt: Option<String>,
    /// Last-read marks keyed by [`last_read_key`].
    #[serde(default)]
    pub last_read: HashMap<String, DateTime<Utc>>,
}

/// Key for a per-(session, user) last-read entry.
pub fn last_read_key(session_id: &str, user_id: &str) -> String {
    format!("{session_id}/{user_id}")
}
