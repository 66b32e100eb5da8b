//! Session domain model.
//!
//! A `Session` is the unit of collaboration: the persisted AI
//! conversation, the latest generated source, the sharing state and
//! the live collaborator set. It is the sole aggregate root; messages,
//! collaborators and comments have no lifecycle outside it.

use super::collaborator::CollaboratorInfo;
use super::message::ChatMessage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The persisted unit of a collaborative conversation + generated source.
///
/// Mutations follow a read-full-document, modify-in-memory,
/// write-full-document pattern at the store level; `messages` is
/// append-only from the caller's perspective but each persistence
/// write replaces the whole list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier (UUID format), assigned at creation.
    pub id: String,
    /// Identifier of the creating user.
    pub owner_id: String,
    /// Human-readable session title.
    pub title: String,
    pub created_at: DateTime<Utc>,
    /// Refreshed on every mutation; never decreases.
    pub updated_at: DateTime<Utc>,
    /// The AI conversation, in insertion order.
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    /// The latest generated/edited source text. Single current value,
    /// no history.
    #[serde(default)]
    pub model_code: String,
    /// Optional rendered preview thumbnail (data URI).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Gates whether non-owners may attach.
    #[serde(default)]
    pub is_shared: bool,
    /// User ids granted access (membership, not ownership).
    #[serde(default)]
    pub shared_with: Vec<String>,
    /// Active collaborators, unique by `user_id`.
    #[serde(default)]
    pub collaborators: Vec<CollaboratorInfo>,
}

impl Session {
    /// Creates a fresh session with empty messages, empty code and
    /// sharing disabled.
    pub fn new(id: impl Into<String>, owner_id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            owner_id: owner_id.into(),
            title: title.into(),
            created_at: now,
            updated_at: now,
            messages: Vec::new(),
            model_code: String::new(),
            thumbnail: None,
            is_shared: false,
            shared_with: Vec::new(),
            collaborators: Vec::new(),
        }
    }

    /// Refreshes `updated_at`.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Returns the last message of the conversation, if any.
    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}
