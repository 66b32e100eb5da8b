//! Team-chat comments.
//!
//! Comments form an append-only side-channel log per session,
//! decoupled from the AI conversation. They are ordered strictly by
//! ascending timestamp and never edited or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Optional line/column anchor for code-anchored comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentPosition {
    pub line: u32,
    pub column: u32,
}

/// One turn in the team-chat log of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionComment {
    /// Store-assigned identifier.
    pub id: String,
    pub session_id: String,
    pub user_id: String,
    pub user_name: String,
    pub content: String,
    /// Store-assigned timestamp; the comment list is ordered by it.
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<CommentPosition>,
}

/// The caller-supplied part of a comment; id and timestamp are
/// assigned by the store on `post`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentDraft {
    pub user_id: String,
    pub user_name: String,
    pub content: String,
    pub position: Option<CommentPosition>,
}

impl CommentDraft {
    pub fn new(
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            user_name: user_name.into(),
            content: content.into(),
            position: None,
        }
    }
}
