//! Collaborator presence bookkeeping.
//!
//! Layered on [`SessionStore`]: join/leave/heartbeat operate on the
//! `collaborators` list embedded in the session document via
//! read-modify-write, so two concurrent joins can race (documented
//! store behavior, reproduced by the store tests).
//!
//! There is no heartbeat expiry: entries persist until an explicit
//! `remove`. `last_active` lets callers grey out stale entries.

use crate::error::{CollabError, Result};
use crate::session::{CollaboratorInfo, CollaboratorProfile, SessionStore};
use chrono::Utc;
use std::sync::Arc;

/// Tracks collaborator join/leave/heartbeat for shared sessions.
pub struct PresenceTracker {
    store: Arc<dyn SessionStore>,
}

impl PresenceTracker {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Attaches a collaborator to a session.
    ///
    /// De-duplicates by `user_id` (drop-and-reinsert), adds the user
    /// to `shared_with`, and stamps `joined_at`/`last_active`.
    pub async fn add_collaborator(
        &self,
        session_id: &str,
        profile: CollaboratorProfile,
    ) -> Result<CollaboratorInfo> {
        let mut session = self
            .store
            .get(session_id)
            .await?
            .ok_or_else(|| CollabError::not_found("session", session_id))?;

        let info = profile.into_info(Utc::now());

        session.collaborators.retain(|c| c.user_id != info.user_id);
        session.collaborators.push(info.clone());
        if !session.shared_with.contains(&info.user_id) {
            session.shared_with.push(info.user_id.clone());
        }

        self.store.replace(session_id, session).await?;
        Ok(info)
    }

    /// Refreshes `last_active` for a collaborator.
    ///
    /// No-op if the session or the entry is absent. Failures are
    /// logged and swallowed so a heartbeat never disrupts editing.
    pub async fn touch(&self, session_id: &str, user_id: &str) {
        let session = match self.store.get(session_id).await {
            Ok(Some(session)) => session,
            Ok(None) => return,
            Err(err) => {
                tracing::warn!("presence heartbeat read failed for {session_id}: {err}");
                return;
            }
        };

        if !session.collaborators.iter().any(|c| c.user_id == user_id) {
            return;
        }

        let mut session = session;
        let now = Utc::now();
        for collaborator in &mut session.collaborators {
            if collaborator.user_id == user_id {
                collaborator.last_active = now;
            }
        }

        if let Err(err) = self.store.replace(session_id, session).await {
            tracing::warn!("presence heartbeat write failed for {session_id}: {err}");
        }
    }

    /// Drops a collaborator entry. No-op if the session or entry is
    /// absent.
    pub async fn remove(&self, session_id: &str, user_id: &str) -> Result<()> {
        let Some(mut session) = self.store.get(session_id).await? else {
            return Ok(());
        };

        let before = session.collaborators.len();
        session.collaborators.retain(|c| c.user_id != user_id);
        if session.collaborators.len() == before {
            return Ok(());
        }

        self.store.replace(session_id, session).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Session, SessionPatch};
    use crate::subscription::Subscription;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    // Mock SessionStore for testing
    struct MockSessionStore {
        sessions: Mutex<HashMap<String, Session>>,
    }

    impl MockSessionStore {
        fn with_session(session: Session) -> Arc<Self> {
            let mut sessions = HashMap::new();
            sessions.insert(session.id.clone(), session);
            Arc::new(Self {
                sessions: Mutex::new(sessions),
            })
        }

        fn get_sync(&self, id: &str) -> Session {
            self.sessions.lock().unwrap().get(id).cloned().unwrap()
        }
    }

    #[async_trait]
    impl SessionStore for MockSessionStore {
        async fn create(&self, owner_id: &str, title: &str) -> Result<String> {
            let session = Session::new(uuid::Uuid::new_v4().to_string(), owner_id, title);
            let id = session.id.clone();
            self.sessions.lock().unwrap().insert(id.clone(), session);
            Ok(id)
        }

        async fn get(&self, session_id: &str) -> Result<Option<Session>> {
            Ok(self.sessions.lock().unwrap().get(session_id).cloned())
        }

        async fn update(&self, session_id: &str, patch: SessionPatch) -> Result<()> {
            let mut sessions = self.sessions.lock().unwrap();
            let session = sessions
                .get_mut(session_id)
                .ok_or_else(|| CollabError::not_found("session", session_id))?;
            if let Some(messages) = patch.messages {
                session.messages = messages;
            }
            if let Some(code) = patch.model_code {
                session.model_code = code;
            }
            session.touch();
            Ok(())
        }

        async fn replace(&self, session_id: &str, mut session: Session) -> Result<()> {
            let mut sessions = self.sessions.lock().unwrap();
            if !sessions.contains_key(session_id) {
                return Err(CollabError::not_found("session", session_id));
            }
            session.touch();
            sessions.insert(session_id.to_string(), session);
            Ok(())
        }

        async fn delete(&self, session_id: &str) -> Result<()> {
            self.sessions.lock().unwrap().remove(session_id);
            Ok(())
        }

        async fn subscribe(&self, session_id: &str) -> Subscription<Option<Session>> {
            let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
            let _ = tx.send(self.sessions.lock().unwrap().get(session_id).cloned());
            Subscription::new(rx)
        }

        async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Session>> {
            Ok(self
                .sessions
                .lock()
                .unwrap()
                .values()
                .filter(|s| s.owner_id == owner_id)
                .cloned()
                .collect())
        }
    }

    fn profile(user_id: &str) -> CollaboratorProfile {
        CollaboratorProfile {
            user_id: user_id.to_string(),
            display_name: format!("User {user_id}"),
            email: format!("{user_id}@example.com"),
            color: None,
        }
    }

    #[tokio::test]
    async fn test_add_collaborator_stamps_and_grants_membership() {
        let store = MockSessionStore::with_session(Session::new("s1", "owner", "Test"));
        let tracker = PresenceTracker::new(store.clone());

        let info = tracker.add_collaborator("s1", profile("alice")).await.unwrap();
        assert!(!info.color.is_empty());

        let session = store.get_sync("s1");
        assert_eq!(session.collaborators.len(), 1);
        assert_eq!(session.shared_with, vec!["alice".to_string()]);
    }

    #[tokio::test]
    async fn test_add_collaborator_replaces_existing_entry() {
        let store = MockSessionStore::with_session(Session::new("s1", "owner", "Test"));
        let tracker = PresenceTracker::new(store.clone());

        tracker.add_collaborator("s1", profile("alice")).await.unwrap();
        tracker.add_collaborator("s1", profile("alice")).await.unwrap();

        let session = store.get_sync("s1");
        assert_eq!(session.collaborators.len(), 1);
        // Membership is a set: no duplicate grant either.
        assert_eq!(session.shared_with.len(), 1);
    }

    #[tokio::test]
    async fn test_touch_refreshes_last_active_only_for_present_user() {
        let store = MockSessionStore::with_session(Session::new("s1", "owner", "Test"));
        let tracker = PresenceTracker::new(store.clone());

        tracker.add_collaborator("s1", profile("alice")).await.unwrap();
        let before = store.get_sync("s1").collaborators[0].last_active;

        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        tracker.touch("s1", "alice").await;
        let after = store.get_sync("s1").collaborators[0].last_active;
        assert!(after > before);

        // Unknown user is a no-op, not an error.
        tracker.touch("s1", "nobody").await;
        assert_eq!(store.get_sync("s1").collaborators.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_drops_entry_and_tolerates_absence() {
        let store = MockSessionStore::with_session(Session::new("s1", "owner", "Test"));
        let tracker = PresenceTracker::new(store.clone());

        tracker.add_collaborator("s1", profile("alice")).await.unwrap();
        tracker.remove("s1", "alice").await.unwrap();
        assert!(store.get_sync("s1").collaborators.is_empty());

        // Absent entry and absent session are both no-ops.
        tracker.remove("s1", "alice").await.unwrap();
        tracker.remove("missing", "alice").await.unwrap();
    }
}
