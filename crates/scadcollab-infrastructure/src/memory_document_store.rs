//! In-process document store.
//!
//! A stand-in for the hosted document database: sessions are whole
//! documents in a map, comments are a keyed sub-log, and every
//! mutation is pushed to subscribers. The write semantics mirror the
//! backend they stand in for: whole-document replacement with no
//! version check and no atomic array append, so interleaved
//! read-modify-write callers can lose an update (see the race test
//! below).
//!
//! `set_offline` simulates an unreachable backend; operations then
//! fail with `StoreUnavailable`.

use crate::pubsub::Publisher;
use async_trait::async_trait;
use chrono::Utc;
use scadcollab_core::error::{CollabError, Result};
use scadcollab_core::session::{
    CommentDraft, CommentStore, Session, SessionComment, SessionPatch, SessionStore,
};
use scadcollab_core::subscription::Subscription;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Maximum number of sessions returned by an owner listing.
const OWNER_LISTING_LIMIT: usize = 50;

/// In-memory `SessionStore` + `CommentStore` with push delivery.
pub struct MemoryDocumentStore {
    sessions: RwLock<HashMap<String, Session>>,
    comments: RwLock<HashMap<String, Vec<SessionComment>>>,
    session_events: Publisher<Option<Session>>,
    comment_events: Publisher<Vec<SessionComment>>,
    offline: AtomicBool,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            comments: RwLock::new(HashMap::new()),
            session_events: Publisher::new(),
            comment_events: Publisher::new(),
            offline: AtomicBool::new(false),
        }
    }

    /// Simulates losing (or regaining) the connection to the backend.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(CollabError::store_unavailable(
                "document store is unreachable",
            ));
        }
        Ok(())
    }

    fn sorted(mut comments: Vec<SessionComment>) -> Vec<SessionComment> {
        comments.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        comments
    }

    #[cfg(test)]
    async fn seed_comments(&self, session_id: &str, seeded: Vec<SessionComment>) {
        self.comments
            .write()
            .await
            .insert(session_id.to_string(), seeded);
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemoryDocumentStore {
    async fn create(&self, owner_id: &str, title: &str) -> Result<String> {
        self.ensure_online()?;
        let session = Session::new(Uuid::new_v4().to_string(), owner_id, title);
        let id = session.id.clone();
        self.sessions.write().await.insert(id.clone(), session);
        tracing::debug!("created session {id} for {owner_id}");
        Ok(id)
    }

    async fn get(&self, session_id: &str) -> Result<Option<Session>> {
        self.ensure_online()?;
        Ok(self.sessions.read().await.get(session_id).cloned())
    }

    async fn update(&self, session_id: &str, patch: SessionPatch) -> Result<()> {
        self.ensure_online()?;
        let snapshot = {
            let mut sessions = self.sessions.write().await;
            let session = sessions
                .get_mut(session_id)
                .ok_or_else(|| CollabError::not_found("session", session_id))?;

            if let Some(messages) = patch.messages {
                session.messages = messages;
            }
            if let Some(model_code) = patch.model_code {
                session.model_code = model_code;
            }
            if let Some(title) = patch.title {
                session.title = title;
            }
            if let Some(thumbnail) = patch.thumbnail {
                session.thumbnail = Some(thumbnail);
            }
            session.touch();
            session.clone()
        };

        self.session_events.publish(session_id, Some(snapshot));
        Ok(())
    }

    async fn replace(&self, session_id: &str, mut session: Session) -> Result<()> {
        self.ensure_online()?;
        let snapshot = {
            let mut sessions = self.sessions.write().await;
            if !sessions.contains_key(session_id) {
                return Err(CollabError::not_found("session", session_id));
            }
            session.touch();
            sessions.insert(session_id.to_string(), session.clone());
            session
        };

        self.session_events.publish(session_id, Some(snapshot));
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        self.ensure_online()?;
        self.sessions.write().await.remove(session_id);
        self.comments.write().await.remove(session_id);

        // Final absent notification, then complete the subscriptions.
        self.session_events.publish(session_id, None);
        self.session_events.close(session_id);
        self.comment_events.close(session_id);
        Ok(())
    }

    async fn subscribe(&self, session_id: &str) -> Subscription<Option<Session>> {
        // The read guard is held across registration: a write that is
        // not reflected in the snapshot cannot publish before the
        // subscriber is registered, so no mutation goes unobserved.
        let sessions = self.sessions.read().await;
        self.session_events
            .subscribe(session_id, sessions.get(session_id).cloned())
    }

    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Session>> {
        self.ensure_online()?;
        let mut sessions: Vec<Session> = self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| s.owner_id == owner_id)
            .cloned()
            .collect();

        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        sessions.truncate(OWNER_LISTING_LIMIT);
        Ok(sessions)
    }
}

#[async_trait]
impl CommentStore for MemoryDocumentStore {
    async fn post(&self, session_id: &str, draft: CommentDraft) -> Result<String> {
        self.ensure_online()?;
        let comment = SessionComment {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            user_id: draft.user_id,
            user_name: draft.user_name,
            content: draft.content,
            timestamp: Utc::now(),
            position: draft.position,
        };
        let id = comment.id.clone();

        let snapshot = {
            let mut comments = self.comments.write().await;
            let log = comments.entry(session_id.to_string()).or_default();
            log.push(comment);
            Self::sorted(log.clone())
        };

        self.comment_events.publish(session_id, snapshot);
        Ok(id)
    }

    async fn list(&self, session_id: &str) -> Result<Vec<SessionComment>> {
        self.ensure_online()?;
        Ok(Self::sorted(
            self.comments
                .read()
                .await
                .get(session_id)
                .cloned()
                .unwrap_or_default(),
        ))
    }

    async fn subscribe(&self, session_id: &str) -> Subscription<Vec<SessionComment>> {
        // Guard held across registration, same as the session path.
        let comments = self.comments.read().await;
        let snapshot = Self::sorted(comments.get(session_id).cloned().unwrap_or_default());
        self.comment_events.subscribe(session_id, snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use scadcollab_core::session::{ChatMessage, CollaboratorInfo};

    fn collaborator(user_id: &str) -> CollaboratorInfo {
        let now = Utc::now();
        CollaboratorInfo {
            user_id: user_id.to_string(),
            display_name: user_id.to_string(),
            email: format!("{user_id}@example.com"),
            color: "#64b5f6".to_string(),
            joined_at: now,
            last_active: now,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = MemoryDocumentStore::new();
        let id = store.create("owner", "My model").await.unwrap();

        let session = store.get(&id).await.unwrap().unwrap();
        assert_eq!(session.owner_id, "owner");
        assert_eq!(session.title, "My model");
        assert!(session.messages.is_empty());
        assert!(session.model_code.is_empty());
        assert!(!session.is_shared);
    }

    #[tokio::test]
    async fn test_get_absent_is_ok_none() {
        let store = MemoryDocumentStore::new();
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_merges_only_present_fields() {
        let store = MemoryDocumentStore::new();
        let id = store.create("owner", "Original title").await.unwrap();

        store
            .update(
                &id,
                SessionPatch {
                    model_code: Some("cube(10);".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let session = store.get(&id).await.unwrap().unwrap();
        assert_eq!(session.model_code, "cube(10);");
        // Absent patch fields are left untouched.
        assert_eq!(session.title, "Original title");
        assert!(session.updated_at >= session.created_at);
    }

    #[tokio::test]
    async fn test_update_missing_session_is_not_found() {
        let store = MemoryDocumentStore::new();
        let err = store
            .update("missing", SessionPatch::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_offline_store_is_unavailable() {
        let store = MemoryDocumentStore::new();
        store.set_offline(true);
        let err = store.create("owner", "t").await.unwrap_err();
        assert!(err.is_store_unavailable());

        store.set_offline(false);
        store.create("owner", "t").await.unwrap();
    }

    #[tokio::test]
    async fn test_subscribe_delivers_snapshot_changes_and_final_absent() {
        let store = MemoryDocumentStore::new();
        let id = store.create("owner", "t").await.unwrap();

        let mut sub = SessionStore::subscribe(&store, &id).await;
        let snapshot = sub.next().await.unwrap().unwrap();
        assert_eq!(snapshot.id, id);

        store
            .update(
                &id,
                SessionPatch {
                    title: Some("renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let changed = sub.next().await.unwrap().unwrap();
        assert_eq!(changed.title, "renamed");

        store.delete(&id).await.unwrap();
        assert_eq!(sub.next().await, Some(None));
        // The subscription completes after the final absent.
        assert_eq!(sub.next().await, None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_subscriber_registered_during_writes_sees_the_last_write() {
        use std::sync::Arc;
        use std::time::Duration;

        let store = Arc::new(MemoryDocumentStore::new());
        let id = store.create("owner", "t").await.unwrap();

        let writer = {
            let store = store.clone();
            let id = id.clone();
            tokio::spawn(async move {
                for i in 0..50 {
                    store
                        .update(
                            &id,
                            SessionPatch {
                                title: Some(format!("v{i}")),
                                ..Default::default()
                            },
                        )
                        .await
                        .unwrap();
                }
            })
        };

        // Registered while the writer is running: any write not in
        // the snapshot must still arrive as a notification.
        let mut sub = SessionStore::subscribe(store.as_ref(), &id).await;
        writer.await.unwrap();

        let converged = tokio::time::timeout(Duration::from_secs(1), async {
            loop {
                let session = sub.next().await.flatten().unwrap();
                if session.title == "v49" {
                    break;
                }
            }
        })
        .await;
        assert!(converged.is_ok(), "subscriber never saw the last write");
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let store = MemoryDocumentStore::new();
        let id = store.create("owner", "t").await.unwrap();

        let sub = SessionStore::subscribe(&store, &id).await;
        sub.unsubscribe();

        // Must not panic or deliver anywhere.
        store
            .update(
                &id,
                SessionPatch {
                    title: Some("x".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_append_message_is_read_modify_write() {
        let store = MemoryDocumentStore::new();
        let id = store.create("owner", "t").await.unwrap();

        store
            .append_message(&id, ChatMessage::user("make a gear"))
            .await
            .unwrap();
        store
            .append_message(&id, ChatMessage::assistant("cube(10);"))
            .await
            .unwrap();

        let session = store.get(&id).await.unwrap().unwrap();
        assert_eq!(session.messages.len(), 2);
    }

    /// Two clients that both read the document before either writes
    /// lose one of the two collaborator entries. This pins the
    /// documented whole-document-overwrite semantics; a fix would
    /// need an atomic merge primitive, not a retry.
    #[tokio::test]
    async fn test_concurrent_read_modify_write_loses_an_update() {
        let store = MemoryDocumentStore::new();
        let id = store.create("owner", "t").await.unwrap();

        // Both clients read the same snapshot.
        let read_a = store.get(&id).await.unwrap().unwrap();
        let read_b = store.get(&id).await.unwrap().unwrap();

        let mut write_a = read_a;
        write_a.collaborators.push(collaborator("alice"));
        let mut write_b = read_b;
        write_b.collaborators.push(collaborator("bob"));

        store.replace(&id, write_a).await.unwrap();
        store.replace(&id, write_b).await.unwrap();

        let final_state = store.get(&id).await.unwrap().unwrap();
        assert_eq!(final_state.collaborators.len(), 1);
        assert_eq!(final_state.collaborators[0].user_id, "bob");
    }

    #[tokio::test]
    async fn test_comments_are_delivered_in_timestamp_order() {
        let store = MemoryDocumentStore::new();
        let id = store.create("owner", "t").await.unwrap();

        // Seed a log whose arrival order disagrees with its
        // timestamps, as an out-of-order network delivery would. The
        // base sits in the past so a comment posted below genuinely
        // is the newest.
        let base = Utc::now() - Duration::seconds(60);
        let mut shuffled = Vec::new();
        for offset in [30i64, 10, 20] {
            shuffled.push(SessionComment {
                id: format!("c{offset}"),
                session_id: id.clone(),
                user_id: "alice".to_string(),
                user_name: "Alice".to_string(),
                content: format!("at +{offset}s"),
                timestamp: base + Duration::seconds(offset),
                position: None,
            });
        }
        store.seed_comments(&id, shuffled).await;

        let mut sub = CommentStore::subscribe(&store, &id).await;
        let snapshot = sub.next().await.unwrap();
        let offsets: Vec<_> = snapshot.iter().map(|c| c.id.clone()).collect();
        assert_eq!(offsets, vec!["c10", "c20", "c30"]);

        store
            .post(&id, CommentDraft::new("bob", "Bob", "newest"))
            .await
            .unwrap();
        let updated = sub.next().await.unwrap();
        assert_eq!(updated.len(), 4);
        assert!(
            updated
                .windows(2)
                .all(|w| w[0].timestamp <= w[1].timestamp)
        );
        assert_eq!(updated.last().unwrap().content, "newest");
    }

    #[tokio::test]
    async fn test_post_assigns_id_and_timestamp() {
        let store = MemoryDocumentStore::new();
        let id = store.create("owner", "t").await.unwrap();

        let comment_id = store
            .post(&id, CommentDraft::new("alice", "Alice", "hello"))
            .await
            .unwrap();
        assert!(!comment_id.is_empty());

        let comments = store.list(&id).await.unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].id, comment_id);
        assert_eq!(comments[0].session_id, id);
    }

    #[tokio::test]
    async fn test_list_for_owner_is_bounded_and_recent_first() {
        let store = MemoryDocumentStore::new();
        for i in 0..60 {
            let id = store.create("owner", &format!("s{i}")).await.unwrap();
            // Touch each one so updated_at strictly increases.
            store
                .update(
                    &id,
                    SessionPatch {
                        title: Some(format!("s{i}")),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
        }
        store.create("someone-else", "other").await.unwrap();

        let sessions = store.list_for_owner("owner").await.unwrap();
        assert_eq!(sessions.len(), 50);
        assert!(
            sessions
                .windows(2)
                .all(|w| w[0].updated_at >= w[1].updated_at)
        );
    }
}
