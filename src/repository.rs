//! State persistence contract and the two shipped reference drivers.
//!
//! `save` is an idempotent upsert keyed by `run_id`. A repository must give
//! read-your-writes consistency for a single run id; the core needs nothing
//! stronger. Retention is a repository concern — the engine never deletes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::state::{WorkflowState, WorkflowStatus};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Stored state corrupted: {0}")]
    Corrupted(String),
}

#[async_trait]
pub trait StateRepository: Send + Sync {
    async fn save(&self, state: &WorkflowState) -> Result<(), RepositoryError>;
    async fn find(&self, run_id: &str) -> Result<Option<WorkflowState>, RepositoryError>;
    async fn find_by_status(
        &self,
        status: WorkflowStatus,
    ) -> Result<Vec<WorkflowState>, RepositoryError>;
}

/// In-process repository, suitable for tests and single-process durability.
#[derive(Default)]
pub struct MemoryStateRepository {
    data: tokio::sync::RwLock<HashMap<String, WorkflowState>>,
}

impl MemoryStateRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateRepository for MemoryStateRepository {
    async fn save(&self, state: &WorkflowState) -> Result<(), RepositoryError> {
        self.data
            .write()
            .await
            .insert(state.run_id.clone(), state.clone());
        Ok(())
    }

    async fn find(&self, run_id: &str) -> Result<Option<WorkflowState>, RepositoryError> {
        Ok(self.data.read().await.get(run_id).cloned())
    }

    async fn find_by_status(
        &self,
        status: WorkflowStatus,
    ) -> Result<Vec<WorkflowState>, RepositoryError> {
        Ok(self
            .data
            .read()
            .await
            .values()
            .filter(|s| s.status == status)
            .cloned()
            .collect())
    }
}

/// One JSON file per run id under a directory.
pub struct FileStateRepository {
    dir: PathBuf,
}

impl FileStateRepository {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|e| RepositoryError::StorageError(e.to_string()))?;
        Ok(Self { dir })
    }

    fn path_for(&self, run_id: &str) -> PathBuf {
        self.dir.join(format!("{}.state.json", run_id))
    }
}

#[async_trait]
impl StateRepository for FileStateRepository {
    async fn save(&self, state: &WorkflowState) -> Result<(), RepositoryError> {
        let path = self.path_for(&state.run_id);
        let bytes = serde_json::to_vec(state)
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;
        tokio::fs::write(path, bytes)
            .await
            .map_err(|e| RepositoryError::StorageError(e.to_string()))
    }

    async fn find(&self, run_id: &str) -> Result<Option<WorkflowState>, RepositoryError> {
        let path = self.path_for(run_id);
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(RepositoryError::StorageError(e.to_string())),
        };
        let state = serde_json::from_slice::<WorkflowState>(&bytes)
            .map_err(|e| RepositoryError::Corrupted(e.to_string()))?;
        Ok(Some(state))
    }

    async fn find_by_status(
        &self,
        status: WorkflowStatus,
    ) -> Result<Vec<WorkflowState>, RepositoryError> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| RepositoryError::StorageError(e.to_string()))?;
        let mut states = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| RepositoryError::StorageError(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|e| RepositoryError::StorageError(e.to_string()))?;
            match serde_json::from_slice::<WorkflowState>(&bytes) {
                Ok(state) if state.status == status => states.push(state),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable state file");
                }
            }
        }
        Ok(states)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paused_state(run_id: &str) -> WorkflowState {
        WorkflowState::start("wf", run_id, Some("ask".into())).pause("waiting")
    }

    #[tokio::test]
    async fn test_memory_repository_save_find() {
        let repo = MemoryStateRepository::new();
        let state = paused_state("run-1");

        repo.save(&state).await.unwrap();
        let found = repo.find("run-1").await.unwrap().unwrap();
        assert_eq!(found.status, WorkflowStatus::Paused);
        assert!(repo.find("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_repository_save_is_upsert() {
        let repo = MemoryStateRepository::new();
        let state = paused_state("run-1");
        repo.save(&state).await.unwrap();
        repo.save(&state.clone().resume().complete()).await.unwrap();

        let found = repo.find("run-1").await.unwrap().unwrap();
        assert_eq!(found.status, WorkflowStatus::Completed);
        assert_eq!(repo.find_by_status(WorkflowStatus::Paused).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_memory_repository_find_by_status() {
        let repo = MemoryStateRepository::new();
        repo.save(&paused_state("run-1")).await.unwrap();
        repo.save(&paused_state("run-2")).await.unwrap();
        repo.save(&WorkflowState::start("wf", "run-3", None).complete())
            .await
            .unwrap();

        let paused = repo.find_by_status(WorkflowStatus::Paused).await.unwrap();
        assert_eq!(paused.len(), 2);
        let completed = repo.find_by_status(WorkflowStatus::Completed).await.unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].run_id, "run-3");
    }

    #[tokio::test]
    async fn test_file_repository_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileStateRepository::new(dir.path()).unwrap();
        let state = paused_state("run-1");

        repo.save(&state).await.unwrap();
        let found = repo.find("run-1").await.unwrap().unwrap();
        assert_eq!(found.run_id, "run-1");
        assert_eq!(found.current_node.as_deref(), Some("ask"));
        assert!(repo.find("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_repository_find_by_status() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileStateRepository::new(dir.path()).unwrap();
        repo.save(&paused_state("run-1")).await.unwrap();
        repo.save(&WorkflowState::start("wf", "run-2", None).complete())
            .await
            .unwrap();

        let paused = repo.find_by_status(WorkflowStatus::Paused).await.unwrap();
        assert_eq!(paused.len(), 1);
        assert_eq!(paused[0].run_id, "run-1");
    }

    #[tokio::test]
    async fn test_file_repository_corrupt_file_is_an_error_on_find() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileStateRepository::new(dir.path()).unwrap();
        tokio::fs::write(dir.path().join("bad.state.json"), b"not json")
            .await
            .unwrap();

        let err = repo.find("bad").await.unwrap_err();
        assert!(matches!(err, RepositoryError::Corrupted(_)));
    }
}
