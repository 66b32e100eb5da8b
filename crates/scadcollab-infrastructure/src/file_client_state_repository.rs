//! JSON-file-backed client state.
//!
//! The whole [`ClientState`] is serialized to a single JSON file after
//! every mutation, like a browser's local storage: small, synchronous
//! in spirit, last-writer-wins. Read failures (missing file, bad JSON)
//! fall back to the default state rather than failing startup.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scadcollab_core::error::{CollabError, Result};
use scadcollab_core::state::{ClientState, ClientStateRepository, last_read_key};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// File-backed [`ClientStateRepository`].
pub struct FileClientStateRepository {
    path: PathBuf,
    state: RwLock<ClientState>,
}

impl FileClientStateRepository {
    /// Opens the repository at `path`, loading existing state if the
    /// file is present and readable.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let state = Self::load(&path);
        Self {
            path,
            state: RwLock::new(state),
        }
    }

    /// Default location under the user config directory.
    pub fn default_location() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CollabError::config("could not determine config directory"))?;
        Ok(config_dir.join("scadcollab").join("client_state.json"))
    }

    fn load(path: &Path) -> ClientState {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(state) => state,
                Err(err) => {
                    tracing::warn!("ignoring malformed client state at {}: {err}", path.display());
                    ClientState::default()
                }
            },
            Err(_) => ClientState::default(),
        }
    }

    async fn persist(&self, state: &ClientState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(state)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl ClientStateRepository for FileClientStateRepository {
    async fn get_active_session(&self) -> Option<String> {
        self.state.read().await.active_session_id.clone()
    }

    async fn set_active_session(&self, session_id: String) -> Result<()> {
        let mut state = self.state.write().await;
        state.active_session_id = Some(session_id);
        self.persist(&state).await
    }

    async fn clear_active_session(&self) -> Result<()> {
        let mut state = self.state.write().await;
        state.active_session_id = None;
        self.persist(&state).await
    }

    async fn get_initial_prompt(&self) -> Option<String> {
        self.state.read().await.initial_prompt.clone()
    }

    async fn set_initial_prompt(&self, prompt: String) -> Result<()> {
        let mut state = self.state.write().await;
        state.initial_prompt = Some(prompt);
        self.persist(&state).await
    }

    async fn clear_initial_prompt(&self) -> Result<()> {
        let mut state = self.state.write().await;
        state.initial_prompt = None;
        self.persist(&state).await
    }

    async fn get_last_read(&self, session_id: &str, user_id: &str) -> Option<DateTime<Utc>> {
        self.state
            .read()
            .await
            .last_read
            .get(&last_read_key(session_id, user_id))
            .copied()
    }

    async fn set_last_read(
        &self,
        session_id: &str,
        user_id: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .last_read
            .insert(last_read_key(session_id, user_id), timestamp);
        self.persist(&state).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn state_path(dir: &TempDir) -> PathBuf {
        dir.path().join("client_state.json")
    }

    #[tokio::test]
    async fn test_starts_empty_when_no_file() {
        let dir = TempDir::new().unwrap();
        let repo = FileClientStateRepository::new(state_path(&dir));

        assert_eq!(repo.get_active_session().await, None);
        assert_eq!(repo.get_initial_prompt().await, None);
        assert_eq!(repo.get_last_read("s1", "alice").await, None);
    }

    #[tokio::test]
    async fn test_state_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = state_path(&dir);

        let repo = FileClientStateRepository::new(&path);
        repo.set_active_session("s1".to_string()).await.unwrap();
        repo.set_initial_prompt("make a gear".to_string())
            .await
            .unwrap();
        let mark = Utc::now();
        repo.set_last_read("s1", "alice", mark).await.unwrap();

        let reopened = FileClientStateRepository::new(&path);
        assert_eq!(reopened.get_active_session().await, Some("s1".to_string()));
        assert_eq!(
            reopened.get_initial_prompt().await,
            Some("make a gear".to_string())
        );
        assert_eq!(reopened.get_last_read("s1", "alice").await, Some(mark));
    }

    #[tokio::test]
    async fn test_clear_removes_values() {
        let dir = TempDir::new().unwrap();
        let repo = FileClientStateRepository::new(state_path(&dir));

        repo.set_active_session("s1".to_string()).await.unwrap();
        repo.set_initial_prompt("hello".to_string()).await.unwrap();

        repo.clear_active_session().await.unwrap();
        repo.clear_initial_prompt().await.unwrap();

        assert_eq!(repo.get_active_session().await, None);
        assert_eq!(repo.get_initial_prompt().await, None);
    }

    #[tokio::test]
    async fn test_last_read_is_scoped_per_session_and_user() {
        let dir = TempDir::new().unwrap();
        let repo = FileClientStateRepository::new(state_path(&dir));

        let mark = Utc::now();
        repo.set_last_read("s1", "alice", mark).await.unwrap();

        assert_eq!(repo.get_last_read("s1", "alice").await, Some(mark));
        assert_eq!(repo.get_last_read("s1", "bob").await, None);
        assert_eq!(repo.get_last_read("s2", "alice").await, None);
    }

    #[tokio::test]
    async fn test_malformed_file_falls_back_to_default() {
        let dir = TempDir::new().unwrap();
        let path = state_path(&dir);
        std::fs::write(&path, "{ not json").unwrap();

        let repo = FileClientStateRepository::new(&path);
        assert_eq!(repo.get_active_session().await, None);

        // A write recovers the file.
        repo.set_active_session("s1".to_string()).await.unwrap();
        let reopened = FileClientStateRepository::new(&path);
        assert_eq!(reopened.get_active_session().await, Some("s1".to_string()));
    }
}
