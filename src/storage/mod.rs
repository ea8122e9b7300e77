//! JSON-file persistence for analysis results and accuracy records
//!
//! Layout under the data directory:
//! - `analysis_results.json`: channel id -> latest [`StoredAnalysis`]
//! - `historical_accuracy.json`: channel id -> [`AccuracyRecord`]
//!
//! Files are created on first write. A missing file reads as an empty map.

use crate::config::UserConfig;
use crate::models::AnalysisResult;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

const RESULTS_FILE: &str = "analysis_results.json";
const ACCURACY_FILE: &str = "historical_accuracy.json";

/// Accuracy assumed for channels without a record
pub const DEFAULT_HISTORICAL_ACCURACY: f64 = 50.0;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Corrupt data in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Historical accuracy must be a number between 0 and 100, got {0}")]
    InvalidAccuracy(f64),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// An analysis result plus the time it was saved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAnalysis {
    #[serde(flatten)]
    pub result: AnalysisResult,
    pub analyzed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccuracyRecord {
    pub accuracy: f64,
    pub updated_at: DateTime<Utc>,
}

/// Keyed store rooted at a data directory
#[derive(Debug, Clone)]
pub struct ResultStore {
    dir: PathBuf,
}

impl ResultStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_config(config: &UserConfig) -> Self {
        Self::new(config.data_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn results_path(&self) -> PathBuf {
        self.dir.join(RESULTS_FILE)
    }

    fn accuracy_path(&self) -> PathBuf {
        self.dir.join(ACCURACY_FILE)
    }

    /// Store `result` under its channel id, replacing any earlier analysis.
    pub fn save_result(&self, result: &AnalysisResult) -> StorageResult<StoredAnalysis> {
        let path = self.results_path();
        let mut results: BTreeMap<String, StoredAnalysis> = read_map(&path)?;
        let stored = StoredAnalysis {
            result: result.clone(),
            analyzed_at: Utc::now(),
        };
        results.insert(result.channel_id.clone(), stored.clone());
        write_map(&path, &results)?;
        debug!("Saved analysis for {} to {}", result.channel_id, path.display());
        Ok(stored)
    }

    pub fn get_result(&self, channel_id: &str) -> StorageResult<Option<StoredAnalysis>> {
        let mut results: BTreeMap<String, StoredAnalysis> = read_map(&self.results_path())?;
        Ok(results.remove(channel_id))
    }

    pub fn list_results(&self) -> StorageResult<BTreeMap<String, StoredAnalysis>> {
        read_map(&self.results_path())
    }

    /// Record the verified prediction accuracy (0-100) for a channel.
    pub fn save_historical_accuracy(
        &self,
        channel_id: &str,
        accuracy: f64,
    ) -> StorageResult<AccuracyRecord> {
        if !accuracy.is_finite() || !(0.0..=100.0).contains(&accuracy) {
            return Err(StorageError::InvalidAccuracy(accuracy));
        }

        let path = self.accuracy_path();
        let mut records: BTreeMap<String, AccuracyRecord> = read_map(&path)?;
        let record = AccuracyRecord {
            accuracy,
            updated_at: Utc::now(),
        };
        records.insert(channel_id.to_string(), record);
        write_map(&path, &records)?;
        Ok(record)
    }

    /// Recorded accuracy for a channel, or [`DEFAULT_HISTORICAL_ACCURACY`].
    pub fn historical_accuracy(&self, channel_id: &str) -> StorageResult<f64> {
        let records: BTreeMap<String, AccuracyRecord> = read_map(&self.accuracy_path())?;
        Ok(records
            .get(channel_id)
            .map(|r| r.accuracy)
            .unwrap_or(DEFAULT_HISTORICAL_ACCURACY))
    }

    pub fn list_accuracy(&self) -> StorageResult<BTreeMap<String, AccuracyRecord>> {
        read_map(&self.accuracy_path())
    }
}

fn read_map<T: DeserializeOwned>(path: &Path) -> StorageResult<BTreeMap<String, T>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let content = std::fs::read_to_string(path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if content.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    serde_json::from_str(&content).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn write_map<T: Serialize>(path: &Path, map: &BTreeMap<String, T>) -> StorageResult<()> {
    let io_err = |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let json = serde_json::to_string_pretty(map).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, json).map_err(io_err)
}
