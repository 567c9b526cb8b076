//! State manager implementation
//!
//! Holds the extraction state behind an async lock and persists it with
//! atomic tmp-rename writes when a path is configured. In-memory mode
//! backs normal server runs, where the state arrives and leaves inline
//! with the event.

use super::types::ExtractionState;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// State manager for persisting and loading extraction state
#[derive(Debug, Clone)]
pub struct StateManager {
    path: Option<PathBuf>,
    state: Arc<RwLock<ExtractionState>>,
}

impl StateManager {
    /// Create an in-memory state manager (no file persistence)
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: Arc::new(RwLock::new(ExtractionState::default())),
        }
    }

    /// Create a manager seeded from an existing state value
    pub fn with_state(state: ExtractionState) -> Self {
        Self {
            path: None,
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Create a state manager from inline JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let state: ExtractionState = serde_json::from_str(json)
            .map_err(|e| Error::state(format!("Failed to parse state JSON: {e}")))?;
        Ok(Self::with_state(state))
    }

    /// Create a state manager from a file, loading existing state if present
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| Error::state(format!("Failed to read state file: {e}")))?;
            serde_json::from_str(&contents)
                .map_err(|e| Error::state(format!("Failed to parse state file: {e}")))?
        } else {
            ExtractionState::default()
        };

        Ok(Self {
            path: Some(path),
            state: Arc::new(RwLock::new(state)),
        })
    }

    /// Read a snapshot of the current state
    pub async fn snapshot(&self) -> ExtractionState {
        self.state.read().await.clone()
    }

    /// Apply a mutation to the state
    pub async fn update<F: FnOnce(&mut ExtractionState)>(&self, f: F) {
        let mut state = self.state.write().await;
        f(&mut state);
    }

    /// Serialize the current state to JSON
    pub async fn to_json(&self) -> Result<String> {
        let state = self.state.read().await;
        serde_json::to_string_pretty(&*state)
            .map_err(|e| Error::state(format!("Failed to serialize state: {e}")))
    }

    /// Save current state to the configured file, if any
    pub async fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(()); // In-memory mode
        };

        let contents = self.to_json().await?;

        // Write to temp file first, then rename for atomicity
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::state(format!("Failed to write state file: {e}")))?;
        tokio::fs::rename(&temp_path, path)
            .await
            .map_err(|e| Error::state(format!("Failed to rename state file: {e}")))?;

        Ok(())
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[cfg(test)]
mod manager_tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_update_and_snapshot() {
        let manager = StateManager::in_memory();
        manager
            .update(|s| {
                s.users.completed = true;
                s.cards.before = Some("c9".into());
            })
            .await;

        let snapshot = manager.snapshot().await;
        assert!(snapshot.users.completed);
        assert_eq!(snapshot.cards.before.as_deref(), Some("c9"));
    }

    #[tokio::test]
    async fn test_from_json() {
        let manager =
            StateManager::from_json(r#"{"users":{"completed":true},"cards":{"before":"c1"}}"#)
                .unwrap();
        let snapshot = manager.snapshot().await;
        assert!(snapshot.users.completed);
        assert_eq!(snapshot.cards.before.as_deref(), Some("c1"));

        assert!(StateManager::from_json("not json").is_err());
    }

    #[tokio::test]
    async fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let manager = StateManager::from_file(&path).unwrap();
        manager.update(|s| s.attachments.completed = true).await;
        manager.save().await.unwrap();

        let reloaded = StateManager::from_file(&path).unwrap();
        assert!(reloaded.snapshot().await.attachments.completed);
    }
}
