//! Filesystem storage.
//!
//! - Read-only JSON fixtures (events, matches, players)
//! - Append-only JSONL lineup store

use std::path::PathBuf;
use thiserror::Error;

mod fixtures;
mod jsonl;

pub use fixtures::*;
pub use jsonl::*;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse {path}: {source}")]
    Fixture {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub fixtures_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf, fixtures_dir: PathBuf) -> Self {
        Self {
            data_dir,
            fixtures_dir,
        }
    }

    /// Fixtures live in `<data_dir>/fixtures`.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        let fixtures_dir = data_dir.join("fixtures");
        Self::new(data_dir, fixtures_dir)
    }

    pub fn events_path(&self) -> PathBuf {
        self.fixtures_dir.join("events.json")
    }

    pub fn matches_path(&self) -> PathBuf {
        self.fixtures_dir.join("matches.json")
    }

    pub fn players_path(&self) -> PathBuf {
        self.fixtures_dir.join("players.json")
    }

    pub fn lineups_path(&self) -> PathBuf {
        self.data_dir.join("lineups").join("lineups.jsonl")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::with_data_dir(PathBuf::from("./data"))
    }
}
