//! File-backed history persistence
//!
//! Stores the undo/redo history as pretty-printed JSON (default:
//! armflow.history.json). The lineage identifier ties saves from one
//! editing session together.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::history::{Snapshot, TemplateHistory};

/// Errors that can occur when loading or saving a history file
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unsupported history file version: {0}")]
    UnsupportedVersion(u32),
}

/// Persisted shape of a history session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryFile {
    /// History file format version
    pub version: u32,
    /// Identifies one editing session lineage
    pub lineage: String,
    #[serde(rename = "savedAt")]
    pub saved_at: DateTime<Utc>,
    /// Cursor into `snapshots`; absent when the history is empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<usize>,
    pub snapshots: Vec<Snapshot>,
}

impl HistoryFile {
    /// Current history file format version
    pub const CURRENT_VERSION: u32 = 1;
}

/// Loads and saves a [`TemplateHistory`] at a fixed path
pub struct HistoryStore {
    path: PathBuf,
    lineage: String,
}

impl HistoryStore {
    /// Default history file name
    pub const DEFAULT_FILE: &'static str = "armflow.history.json";

    /// Create a store at the default path in the current directory
    pub fn new() -> Self {
        Self::with_path(PathBuf::from(Self::DEFAULT_FILE))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            lineage: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lineage(&self) -> &str {
        &self.lineage
    }

    /// Load a saved history; `None` when no file exists yet.
    ///
    /// Adopts the file's lineage so subsequent saves continue the session.
    pub fn load(&mut self) -> Result<Option<TemplateHistory>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        let file: HistoryFile = serde_json::from_str(&content)?;

        if file.version > HistoryFile::CURRENT_VERSION {
            return Err(StoreError::UnsupportedVersion(file.version));
        }

        self.lineage = file.lineage;
        Ok(Some(TemplateHistory::restore(file.snapshots, file.cursor)))
    }

    pub fn save(&self, history: &TemplateHistory) -> Result<(), StoreError> {
        let file = HistoryFile {
            version: HistoryFile::CURRENT_VERSION,
            lineage: self.lineage.clone(),
            saved_at: Utc::now(),
            cursor: history.cursor(),
            snapshots: history.snapshots().to_vec(),
        };

        let content = serde_json::to_string_pretty(&file)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use armflow_core::template::ArmTemplate;
    use tempfile::tempdir;

    fn template(version: &str) -> ArmTemplate {
        ArmTemplate::parse(&format!(
            r#"{{ "$schema": "s", "contentVersion": "{version}" }}"#
        ))
        .unwrap()
    }

    #[test]
    fn load_without_file_is_none() {
        let dir = tempdir().unwrap();
        let mut store = HistoryStore::with_path(dir.path().join("history.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");

        let mut history = TemplateHistory::new();
        history.push(template("1"));
        history.push(template("2"));
        history.undo();

        let store = HistoryStore::with_path(path.clone());
        store.save(&history).unwrap();

        let mut reloaded_store = HistoryStore::with_path(path);
        let reloaded = reloaded_store.load().unwrap().unwrap();

        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.position(), 1);
        assert_eq!(
            reloaded.current().unwrap().content_version.as_deref(),
            Some("1")
        );
        assert!(reloaded.can_redo());
    }

    #[test]
    fn load_adopts_the_saved_lineage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");

        let store = HistoryStore::with_path(path.clone());
        let original_lineage = store.lineage().to_string();
        store.save(&TemplateHistory::new()).unwrap();

        let mut reloaded_store = HistoryStore::with_path(path);
        assert_ne!(reloaded_store.lineage(), original_lineage);
        reloaded_store.load().unwrap();
        assert_eq!(reloaded_store.lineage(), original_lineage);
    }

    #[test]
    fn future_version_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(
            &path,
            r#"{ "version": 99, "lineage": "x", "savedAt": "2026-01-01T00:00:00Z", "snapshots": [] }"#,
        )
        .unwrap();

        let mut store = HistoryStore::with_path(path);
        assert!(matches!(
            store.load(),
            Err(StoreError::UnsupportedVersion(99))
        ));
    }
}
