//! Client state repository trait.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Persistence for client-local state (active session pointer,
/// pending initial prompt, last-read marks).
///
/// Getters return `Option` directly; read failures are treated as
/// "nothing stored" by implementations.
#[async_trait]
pub trait ClientStateRepository: Send + Sync {
    /// Returns the id of the currently active session.
    async fn get_active_session(&self) -> Option<String>;

    /// Sets the currently active session.
    async fn set_active_session(&self, session_id: String) -> Result<()>;

    /// Clears the active session pointer.
    async fn clear_active_session(&self) -> Result<()>;

    /// Returns the pending initial prompt, if any.
    async fn get_initial_prompt(&self) -> Option<String>;

    /// Records a prompt to surface on the next bootstrap.
    async fn set_initial_prompt(&self, prompt: String) -> Result<()>;

    /// Clears the pending initial prompt.
    async fn clear_initial_prompt(&self) -> Result<()>;

    /// Returns the last-read mark for a (session, user) pair.
    async fn get_last_read(&self, session_id: &str, user_id: &str) -> Option<DateTime<Utc>>;

    /// Stores the last-read mark for a (session, user) pair.
    async fn set_last_read(
        &self,
        session_id: &str,
        user_id: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<()>;
}
