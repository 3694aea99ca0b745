//! Visitor state persisted as `{data_dir}/visitor.json`.

use std::path::{Path, PathBuf};

use leadline_core::identity::{VisitorState, VisitorStore};
use leadline_types::error::RepositoryError;

const VISITOR_FILE: &str = "visitor.json";

/// File-backed [`VisitorStore`]. One visitor per data directory.
#[derive(Debug, Clone)]
pub struct FileVisitorStore {
    path: PathBuf,
}

impl FileVisitorStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(VISITOR_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn io_error(err: std::io::Error) -> RepositoryError {
    RepositoryError::Query(err.to_string())
}

impl VisitorStore for FileVisitorStore {
    async fn load(&self) -> Result<Option<VisitorState>, RepositoryError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(io_error(err)),
        };

        match serde_json::from_str::<VisitorState>(&content) {
            Ok(state) => Ok(Some(state)),
            Err(err) => {
                tracing::warn!("Ignoring unreadable {}: {err}", self.path.display());
                Ok(None)
            }
        }
    }

    async fn save(&self, state: &VisitorState) -> Result<(), RepositoryError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
        }
        let json = serde_json::to_string_pretty(state)
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        tokio::fs::write(&self.path, json).await.map_err(io_error)
    }

    async fn clear(&self) -> Result<(), RepositoryError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadline_types::lead::LeadUid;
    use tempfile::tempdir;

    fn state() -> VisitorState {
        VisitorState {
            uid: LeadUid::from("lead_abc"),
            email: "ada@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn load_without_file_is_none() {
        let dir = tempdir().unwrap();
        let store = FileVisitorStore::new(dir.path());
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = tempdir().unwrap();
        let store = FileVisitorStore::new(&dir.path().join("nested"));
        store.save(&state()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(state()));
    }

    #[tokio::test]
    async fn clear_removes_state_and_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = FileVisitorStore::new(dir.path());
        store.save(&state()).await.unwrap();
        store.clear().await.unwrap();
        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_file_reads_as_no_visitor() {
        let dir = tempdir().unwrap();
        let store = FileVisitorStore::new(dir.path());
        tokio::fs::write(store.path(), "{not json").await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }
}
