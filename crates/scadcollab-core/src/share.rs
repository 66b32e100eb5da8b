//! Session sharing and share tokens.

use crate::error::{CollabError, Result};
use crate::session::SessionStore;
use std::sync::Arc;

/// Toggles session visibility and mints share identifiers.
///
/// The share token is the session's own id rather than a separate
/// secret, so possession of a share link is equivalent to possession
/// of the session id. That keeps links stable and the scheme stateless;
/// deployments needing revocable links should wrap this with their own
/// token layer.
pub struct ShareTokenManager {
    store: Arc<dyn SessionStore>,
}

impl ShareTokenManager {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Marks the session as shared and bumps `updated_at`.
    pub async fn enable_sharing(&self, session_id: &str) -> Result<()> {
        let mut session = self
            .store
            .get(session_id)
            .await?
            .ok_or_else(|| CollabError::not_found("session", session_id))?;

        session.is_shared = true;
        self.store.replace(session_id, session).await
    }

    /// Enables sharing and returns the share token (the session id).
    pub async fn mint_share_token(&self, session_id: &str) -> Result<String> {
        self.enable_sharing(session_id).await?;
        Ok(session_id.to_string())
    }

    /// Assembles a shareable URL from a base and a token.
    pub fn share_url(base_url: &str, token: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), token)
    }
}
