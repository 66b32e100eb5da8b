//! Comment store trait.
//!
//! The team-chat log is persisted independently of the session
//! document (its own keyed sub-log), with its own subscription.

use super::comment::{CommentDraft, SessionComment};
use crate::error::Result;
use crate::subscription::Subscription;
use async_trait::async_trait;

/// An abstract append-only store for per-session team-chat comments.
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Appends a comment with a store-assigned id and timestamp.
    /// Returns the new comment id.
    async fn post(&self, session_id: &str, draft: CommentDraft) -> Result<String>;

    /// Returns the full comment list, ordered by ascending timestamp.
    async fn list(&self, session_id: &str) -> Result<Vec<SessionComment>>;

    /// Registers a push listener for the session's comments.
    ///
    /// The full ordered list is delivered immediately and again on
    /// every change. Ordering is stable and matches timestamp order
    /// even if underlying delivery is out of order.
    async fn subscribe(&self, session_id: &str) -> Subscription<Vec<SessionComment>>;
}
