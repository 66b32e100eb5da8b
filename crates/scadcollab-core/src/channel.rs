//! Team-chat channel and unread accounting.
//!
//! The channel is a thin facade over [`CommentStore`]. Unread
//! accounting is client-local: the per-(session, user) last-read
//! timestamp lives in [`ClientStateRepository`], not in the store, so
//! reading on a second device does not reset the first device's
//! counter.

use crate::error::Result;
use crate::session::{CommentDraft, CommentStore, SessionComment};
use crate::state::ClientStateRepository;
use crate::subscription::Subscription;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Ordered, append-only team-chat side channel for a session.
pub struct MessageChannel {
    comments: Arc<dyn CommentStore>,
}

impl MessageChannel {
    pub fn new(comments: Arc<dyn CommentStore>) -> Self {
        Self { comments }
    }

    /// Posts a comment; the store assigns the id and timestamp.
    pub async fn post(&self, session_id: &str, draft: CommentDraft) -> Result<String> {
        self.comments.post(session_id, draft).await
    }

    /// Subscribes to the full ordered comment list.
    pub async fn subscribe(&self, session_id: &str) -> Subscription<Vec<SessionComment>> {
        self.comments.subscribe(session_id).await
    }
}

/// Client-local unread counter for one user.
pub struct UnreadTracker {
    state: Arc<dyn ClientStateRepository>,
    user_id: String,
}

impl UnreadTracker {
    pub fn new(state: Arc<dyn ClientStateRepository>, user_id: impl Into<String>) -> Self {
        Self {
            state,
            user_id: user_id.into(),
        }
    }

    /// Counts comments newer than the stored last-read mark that were
    /// authored by someone else. A missing mark counts everything
    /// from other users.
    pub async fn unread_count(&self, session_id: &str, comments: &[SessionComment]) -> usize {
        let last_read = self.state.get_last_read(session_id, &self.user_id).await;
        Self::count_unread(comments, last_read, &self.user_id)
    }

    /// Marks the channel as read "now"; the unread count drops to
    /// zero even if new comments arrive within the same tick.
    pub async fn mark_read(&self, session_id: &str) -> Result<DateTime<Utc>> {
        let now = Utc::now();
        self.state
            .set_last_read(session_id, &self.user_id, now)
            .await?;
        Ok(now)
    }

    /// Pure counting rule, separated for testability.
    pub fn count_unread(
        comments: &[SessionComment],
        last_read: Option<DateTime<Utc>>,
        self_user_id: &str,
    ) -> usize {
        comments
            .iter()
            .filter(|c| c.user_id != self_user_id)
            .filter(|c| match last_read {
                Some(mark) => c.timestamp > mark,
                None => true,
            })
            .count()
    }
}
