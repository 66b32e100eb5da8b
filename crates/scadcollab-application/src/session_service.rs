//! Session lifecycle service.
//!
//! Wires the store and the client-local state together: create/open/
//! switch/delete sessions, gate access to shared ones, restore the
//! active session on startup, and resolve a pending initial prompt
//! left over from a landing flow.

use scadcollab_core::error::{CollabError, Result};
use scadcollab_core::session::{MessageRole, Session, SessionPatch, SessionStore};
use scadcollab_core::share::ShareTokenManager;
use scadcollab_core::state::ClientStateRepository;
use std::sync::Arc;

/// Result of restoring client state on startup.
#[derive(Debug, Clone, Default)]
pub struct BootstrapOutcome {
    /// The restored active session, if one still exists.
    pub session: Option<Session>,
    /// A prompt to pre-fill into the input field, not to replay.
    pub pending_input: Option<String>,
}

/// Application-level session operations over store + client state.
pub struct SessionService {
    store: Arc<dyn SessionStore>,
    client_state: Arc<dyn ClientStateRepository>,
    sharing: ShareTokenManager,
}

impl SessionService {
    pub fn new(store: Arc<dyn SessionStore>, client_state: Arc<dyn ClientStateRepository>) -> Self {
        let sharing = ShareTokenManager::new(store.clone());
        Self {
            store,
            client_state,
            sharing,
        }
    }

    /// Creates a session and makes it the active one.
    pub async fn create_session(&self, owner_id: &str, title: &str) -> Result<Session> {
        let session_id = self.store.create(owner_id, title).await?;
        tracing::info!("created session {session_id} for {owner_id}");
        self.client_state
            .set_active_session(session_id.clone())
            .await?;

        self.store
            .get(&session_id)
            .await?
            .ok_or_else(|| CollabError::not_found("session", &session_id))
    }

    /// Opens a session as `user_id` and makes it the active one.
    ///
    /// Non-owners are admitted only when the session is shared or the
    /// user already holds membership; anything else is a security
    /// error, not a not-found. A non-owner's first successful attach
    /// is recorded as membership so revoking `is_shared` later does
    /// not lock out existing collaborators.
    pub async fn open_session(&self, session_id: &str, user_id: &str) -> Result<Session> {
        let mut session = self
            .store
            .get(session_id)
            .await?
            .ok_or_else(|| CollabError::not_found("session", session_id))?;

        let is_owner = session.owner_id == user_id;
        let is_member = session.shared_with.iter().any(|id| id == user_id);
        if !is_owner && !session.is_shared && !is_member {
            return Err(CollabError::security(format!(
                "user {user_id} is not allowed to open session {session_id}"
            )));
        }

        if !is_owner && !is_member {
            session.shared_with.push(user_id.to_string());
            self.store.replace(session_id, session.clone()).await?;
        }

        self.client_state
            .set_active_session(session_id.to_string())
            .await?;
        Ok(session)
    }

    /// Restores the active session at startup and resolves a pending
    /// initial prompt.
    ///
    /// If the stored transcript ends in a lone unanswered user turn
    /// while an initial-prompt marker is set, that turn was captured
    /// but never sent: it is removed from the stored transcript and
    /// surfaced as pending input instead of being replayed.
    pub async fn bootstrap(&self, user_id: &str) -> Result<BootstrapOutcome> {
        let Some(session_id) = self.client_state.get_active_session().await else {
            return Ok(BootstrapOutcome::default());
        };

        let session = match self.open_session(&session_id, user_id).await {
            Ok(session) => session,
            Err(err) if err.is_not_found() => {
                // The session was deleted elsewhere; start fresh.
                self.client_state.clear_active_session().await?;
                return Ok(BootstrapOutcome::default());
            }
            Err(err) => return Err(err),
        };

        let pending = self.client_state.get_initial_prompt().await;
        let Some(prompt) = pending else {
            return Ok(BootstrapOutcome {
                session: Some(session),
                pending_input: None,
            });
        };

        let session = self.drop_stale_user_turn(session).await?;
        self.client_state.clear_initial_prompt().await?;

        Ok(BootstrapOutcome {
            session: Some(session),
            pending_input: Some(prompt),
        })
    }

    /// Removes a trailing unanswered user turn so the next real send
    /// does not duplicate it.
    async fn drop_stale_user_turn(&self, mut session: Session) -> Result<Session> {
        let ends_in_user_turn = session
            .last_message()
            .is_some_and(|message| message.role == MessageRole::User);
        if !ends_in_user_turn {
            return Ok(session);
        }

        session.messages.pop();
        self.store
            .update(
                &session.id,
                SessionPatch {
                    messages: Some(session.messages.clone()),
                    ..Default::default()
                },
            )
            .await?;
        Ok(session)
    }

    /// Switches the active session. Same access gate as
    /// [`open_session`](Self::open_session).
    pub async fn switch_session(&self, session_id: &str, user_id: &str) -> Result<Session> {
        self.open_session(session_id, user_id).await
    }

    /// Deletes a session, clearing the active pointer if it pointed
    /// here.
    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        self.store.delete(session_id).await?;
        tracing::info!("deleted session {session_id}");

        if self.client_state.get_active_session().await.as_deref() == Some(session_id) {
            self.client_state.clear_active_session().await?;
        }
        Ok(())
    }

    /// Lists the user's own sessions, most recently updated first.
    pub async fn list_sessions(&self, owner_id: &str) -> Result<Vec<Session>> {
        self.store.list_for_owner(owner_id).await
    }

    /// Enables sharing and returns a shareable URL for the session.
    pub async fn share_url(&self, session_id: &str, base_url: &str) -> Result<String> {
        let token = self.sharing.mint_share_token(session_id).await?;
        Ok(ShareTokenManager::share_url(base_url, &token))
    }
}
