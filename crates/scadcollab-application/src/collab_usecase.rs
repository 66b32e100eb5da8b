//! Collaboration use case.
//!
//! Coordinates the session service, presence tracking, the team-chat
//! channel and the generation pipeline into one per-user entry point:
//! attach to a session and get back everything a client needs to
//! drive it.

use crate::session_service::{BootstrapOutcome, SessionService};
use scadcollab_core::channel::{MessageChannel, UnreadTracker};
use scadcollab_core::error::Result;
use scadcollab_core::presence::PresenceTracker;
use scadcollab_core::session::{
    CollaboratorProfile, CommentStore, Session, SessionStore, random_presence_color,
};
use scadcollab_core::state::ClientStateRepository;
use scadcollab_core::subscription::Subscription;
use scadcollab_interaction::{GenerationOrchestrator, SourceEditor};
use std::sync::Arc;

/// Identity of the local user, carried through attach flows.
#[derive(Debug, Clone)]
pub struct UserIdentity {
    pub user_id: String,
    pub display_name: String,
    pub email: String,
}

impl UserIdentity {
    fn to_profile(&self) -> CollaboratorProfile {
        CollaboratorProfile {
            user_id: self.user_id.clone(),
            display_name: self.display_name.clone(),
            email: self.email.clone(),
            color: Some(random_presence_color()),
        }
    }
}

/// Everything a client needs to drive one attached session.
pub struct SessionWorkspace {
    pub session: Session,
    pub orchestrator: GenerationOrchestrator,
    /// Live updates for the session document.
    pub session_updates: Subscription<Option<Session>>,
    /// A prompt to pre-fill into the input field, if bootstrap found
    /// one pending.
    pub pending_input: Option<String>,
}

/// Composes store, chat, presence and generation for one user.
pub struct CollabUseCase {
    store: Arc<dyn SessionStore>,
    service: SessionService,
    presence: PresenceTracker,
    channel: MessageChannel,
    unread: UnreadTracker,
    user: UserIdentity,
    editor: Arc<dyn SourceEditor>,
}

impl CollabUseCase {
    pub fn new(
        store: Arc<dyn SessionStore>,
        comments: Arc<dyn CommentStore>,
        client_state: Arc<dyn ClientStateRepository>,
        editor: Arc<dyn SourceEditor>,
        user: UserIdentity,
    ) -> Self {
        Self {
            service: SessionService::new(store.clone(), client_state.clone()),
            presence: PresenceTracker::new(store.clone()),
            channel: MessageChannel::new(comments),
            unread: UnreadTracker::new(client_state, user.user_id.clone()),
            store,
            user,
            editor,
        }
    }

    pub fn service(&self) -> &SessionService {
        &self.service
    }

    pub fn presence(&self) -> &PresenceTracker {
        &self.presence
    }

    pub fn channel(&self) -> &MessageChannel {
        &self.channel
    }

    pub fn unread(&self) -> &UnreadTracker {
        &self.unread
    }

    /// Restores the active session on startup, attaching to it if one
    /// survives.
    pub async fn bootstrap(&self) -> Result<Option<SessionWorkspace>> {
        let BootstrapOutcome {
            session,
            pending_input,
        } = self.service.bootstrap(&self.user.user_id).await?;

        match session {
            Some(session) => {
                let mut workspace = self.attach(session).await?;
                workspace.pending_input = pending_input;
                Ok(Some(workspace))
            }
            None => Ok(None),
        }
    }

    /// Creates a new session owned by this user and attaches to it.
    pub async fn create(&self, title: &str) -> Result<SessionWorkspace> {
        let session = self
            .service
            .create_session(&self.user.user_id, title)
            .await?;
        self.attach(session).await
    }

    /// Opens an existing (possibly shared) session and attaches to it.
    pub async fn open(&self, session_id: &str) -> Result<SessionWorkspace> {
        let session = self
            .service
            .open_session(session_id, &self.user.user_id)
            .await?;
        self.attach(session).await
    }

    /// Detaches from a session, dropping this user's presence entry.
    pub async fn leave(&self, session_id: &str) -> Result<()> {
        self.presence.remove(session_id, &self.user.user_id).await
    }

    async fn attach(&self, session: Session) -> Result<SessionWorkspace> {
        self.presence
            .add_collaborator(&session.id, self.user.to_profile())
            .await?;

        let orchestrator = GenerationOrchestrator::new(self.editor.clone())
            .with_store(self.store.clone(), session.id.clone());
        orchestrator.set_transcript(session.messages.clone()).await;

        let session_updates = self.store.subscribe(&session.id).await;

        Ok(SessionWorkspace {
            session,
            orchestrator,
            session_updates,
            pending_input: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use scadcollab_core::session::CommentDraft;
    use scadcollab_infrastructure::{FileClientStateRepository, MemoryDocumentStore};
    use scadcollab_interaction::RenderOptions;
    use tempfile::TempDir;
    use tokio::sync::RwLock;

    struct StubEditor {
        source: RwLock<String>,
    }

    impl StubEditor {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                source: RwLock::new(String::new()),
            })
        }
    }

    #[async_trait]
    impl SourceEditor for StubEditor {
        async fn source(&self) -> String {
            self.source.read().await.clone()
        }

        async fn set_source(&self, source: &str) -> Result<()> {
            *self.source.write().await = source.to_string();
            Ok(())
        }

        async fn check_syntax(&self) -> Result<()> {
            Ok(())
        }

        async fn render(&self, _options: RenderOptions) -> Result<()> {
            Ok(())
        }

        async fn export(&self) -> Result<Vec<u8>> {
            Ok(Vec::new())
        }
    }

    fn user(id: &str) -> UserIdentity {
        UserIdentity {
            user_id: id.to_string(),
            display_name: format!("User {id}"),
            email: format!("{id}@example.com"),
        }
    }

    fn usecase_for(
        store: Arc<MemoryDocumentStore>,
        dir: &TempDir,
        user_id: &str,
    ) -> CollabUseCase {
        let client_state = Arc::new(FileClientStateRepository::new(
            dir.path().join(format!("{user_id}.json")),
        ));
        CollabUseCase::new(
            store.clone(),
            store,
            client_state,
            StubEditor::new(),
            user(user_id),
        )
    }

    #[tokio::test]
    async fn test_create_attaches_presence_and_subscription() {
        let store = Arc::new(MemoryDocumentStore::new());
        let dir = TempDir::new().unwrap();
        let usecase = usecase_for(store.clone(), &dir, "owner");

        let mut workspace = usecase.create("My model").await.unwrap();

        // Presence entry written before the snapshot was delivered.
        let snapshot = workspace.session_updates.next().await.unwrap().unwrap();
        assert_eq!(snapshot.collaborators.len(), 1);
        assert_eq!(snapshot.collaborators[0].user_id, "owner");
        assert!(workspace.pending_input.is_none());
    }

    #[tokio::test]
    async fn test_second_user_sees_first_users_comment() {
        let store = Arc::new(MemoryDocumentStore::new());
        let dir = TempDir::new().unwrap();
        let owner = usecase_for(store.clone(), &dir, "owner");
        let guest = usecase_for(store.clone(), &dir, "alice");

        let workspace = owner.create("t").await.unwrap();
        owner
            .service()
            .share_url(&workspace.session.id, "https://example.com")
            .await
            .unwrap();
        guest.open(&workspace.session.id).await.unwrap();

        owner
            .channel()
            .post(
                &workspace.session.id,
                CommentDraft::new("owner", "Owner", "hello"),
            )
            .await
            .unwrap();

        let mut comments = guest.channel().subscribe(&workspace.session.id).await;
        let list = comments.next().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(guest.unread().unread_count(&workspace.session.id, &list).await, 1);

        guest.unread().mark_read(&workspace.session.id).await.unwrap();
        assert_eq!(guest.unread().unread_count(&workspace.session.id, &list).await, 0);
    }

    #[tokio::test]
    async fn test_leave_drops_presence_entry() {
        let store = Arc::new(MemoryDocumentStore::new());
        let dir = TempDir::new().unwrap();
        let usecase = usecase_for(store.clone(), &dir, "owner");

        let workspace = usecase.create("t").await.unwrap();
        usecase.leave(&workspace.session.id).await.unwrap();

        let stored = store.get(&workspace.session.id).await.unwrap().unwrap();
        assert!(stored.collaborators.is_empty());
    }

    #[tokio::test]
    async fn test_bootstrap_restores_attached_workspace() {
        let store = Arc::new(MemoryDocumentStore::new());
        let dir = TempDir::new().unwrap();
        let usecase = usecase_for(store.clone(), &dir, "owner");

        let created = usecase.create("t").await.unwrap();
        let restored = usecase.bootstrap().await.unwrap().unwrap();
        assert_eq!(restored.session.id, created.session.id);
        assert_eq!(restored.orchestrator.transcript().await.len(), 0);
    }
}
