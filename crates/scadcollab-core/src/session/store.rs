//! Session store trait.
//!
//! Defines the interface for session persistence plus push
//! subscriptions, decoupling the engine from the specific backend
//! (an in-process document store, a hosted document database, ...).

use super::message::ChatMessage;
use super::model::Session;
use crate::error::Result;
use crate::subscription::Subscription;
use async_trait::async_trait;

/// A partial session update. Only fields that are `Some` are merged
/// into the stored document; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionPatch {
    pub messages: Option<Vec<ChatMessage>>,
    pub model_code: Option<String>,
    pub title: Option<String>,
    pub thumbnail: Option<String>,
}

impl SessionPatch {
    /// True when no field is present.
    pub fn is_empty(&self) -> bool {
        self.messages.is_none()
            && self.model_code.is_none()
            && self.title.is_none()
            && self.thumbnail.is_none()
    }
}

/// An abstract store for sessions with push-based change delivery.
///
/// # Concurrency contract
///
/// The session document is the unit of concurrency. There is no
/// optimistic-concurrency token and no server-side atomic array
/// append: callers that read a document, modify it in memory and
/// write it back can lose a concurrent writer's change. Subscription
/// delivery is at-least-once and not ordered relative to the
/// subscriber's own writes.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Allocates a new session with empty messages, empty code and
    /// sharing disabled. Returns the new session id.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` if the backing store cannot be reached.
    async fn create(&self, owner_id: &str, title: &str) -> Result<String>;

    /// Point read. Absent is a valid, non-error outcome.
    async fn get(&self, session_id: &str) -> Result<Option<Session>>;

    /// Merges the fields present in `patch` into the stored document
    /// and refreshes `updated_at`.
    ///
    /// # Errors
    ///
    /// `NotFound` if the session does not exist.
    async fn update(&self, session_id: &str, patch: SessionPatch) -> Result<()>;

    /// Replaces the whole stored document and refreshes `updated_at`.
    ///
    /// This is the write half of the read-modify-write pattern used
    /// for collaborators and sharing flags.
    ///
    /// # Errors
    ///
    /// `NotFound` if the session does not exist.
    async fn replace(&self, session_id: &str, session: Session) -> Result<()>;

    /// Removes the session entirely. Subscribers receive a final
    /// absent (`None`) notification.
    async fn delete(&self, session_id: &str) -> Result<()>;

    /// Registers a push listener for the session.
    ///
    /// The current snapshot (or `None` if absent) is delivered
    /// immediately, then a new value on every subsequent mutation,
    /// including ones made by this client.
    async fn subscribe(&self, session_id: &str) -> Subscription<Option<Session>>;

    /// Lists the owner's sessions, most recently updated first,
    /// bounded to 50 entries.
    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Session>>;

    /// Appends one message to the stored conversation.
    ///
    /// Read-modify-write: the stored document is fetched, the message
    /// pushed, and the whole list written back. Two clients appending
    /// at overlapping times can lose one of the appends.
    ///
    /// # Errors
    ///
    /// `NotFound` if the session does not exist.
    async fn append_message(&self, session_id: &str, message: ChatMessage) -> Result<()> {
        let session = self
            .get(session_id)
            .await?
            .ok_or_else(|| crate::error::CollabError::not_found("session", session_id))?;

        let mut messages = session.messages;
        messages.push(message);
        self.update(
            session_id,
            SessionPatch {
                messages: Some(messages),
                ..Default::default()
            },
        )
        .await
    }
}
