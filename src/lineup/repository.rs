//! Lineup persistence.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

use crate::models::{Lineup, LineupId};
use crate::storage::{JsonlReader, JsonlWriter, StorageError};

/// Errors from a lineup repository.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Lineup {0} already exists")]
    Duplicate(LineupId),

    #[error("Repository unavailable: {0}")]
    Unavailable(String),
}

/// Destination for finished lineups.
#[async_trait]
pub trait LineupRepository: Send + Sync {
    /// Identifier for logging.
    fn name(&self) -> &'static str;

    /// Persist a new lineup. Single-shot: no retry on failure.
    async fn create(&self, lineup: &Lineup) -> Result<LineupId, RepositoryError>;

    /// Every stored lineup, oldest first.
    async fn list(&self) -> Result<Vec<Lineup>, RepositoryError>;
}

/// Append-only JSONL lineup store.
pub struct JsonlLineupRepository {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlLineupRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    fn reader(&self) -> JsonlReader<Lineup> {
        JsonlReader::new(self.path.clone())
    }
}

#[async_trait]
impl LineupRepository for JsonlLineupRepository {
    fn name(&self) -> &'static str {
        "jsonl"
    }

    async fn create(&self, lineup: &Lineup) -> Result<LineupId, RepositoryError> {
        let _guard = self.write_lock.lock().await;

        if !self.reader().read_where(|l| l.id == lineup.id)?.is_empty() {
            return Err(RepositoryError::Duplicate(lineup.id.clone()));
        }

        JsonlWriter::new(self.path.clone()).append(lineup)?;
        info!("Stored lineup {} in {:?}", lineup.id, self.path);
        Ok(lineup.id.clone())
    }

    async fn list(&self) -> Result<Vec<Lineup>, RepositoryError> {
        Ok(self.reader().read_all()?)
    }
}

/// Process-local lineup store.
#[derive(Default)]
pub struct InMemoryLineupRepository {
    lineups: Mutex<Vec<Lineup>>,
}

impl InMemoryLineupRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LineupRepository for InMemoryLineupRepository {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn create(&self, lineup: &Lineup) -> Result<LineupId, RepositoryError> {
        let mut lineups = self.lineups.lock().await;
        if lineups.iter().any(|l| l.id == lineup.id) {
            return Err(RepositoryError::Duplicate(lineup.id.clone()));
        }
        lineups.push(lineup.clone());
        Ok(lineup.id.clone())
    }

    async fn list(&self) -> Result<Vec<Lineup>, RepositoryError> {
        Ok(self.lineups.lock().await.clone())
    }
}
