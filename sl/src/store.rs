//! Progress snapshot persistence

use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use tracing::{debug, info};

use studycore::ProgressSnapshot;

/// JSON file holding the last completed chapter per subject
#[derive(Debug, Clone)]
pub struct ProgressStore {
    path: PathBuf,
}

impl ProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the snapshot; a missing file is an empty snapshot
    pub fn load(&self) -> Result<ProgressSnapshot> {
        debug!(path = %self.path.display(), "ProgressStore::load: called");
        if !self.path.exists() {
            debug!("ProgressStore::load: no progress file yet");
            return Ok(ProgressSnapshot::default());
        }

        let content =
            fs::read_to_string(&self.path).context(format!("Failed to read progress from {}", self.path.display()))?;
        serde_json::from_str(&content).context(format!("Failed to parse progress file {}", self.path.display()))
    }

    /// Write the snapshot atomically
    pub fn save(&self, snapshot: &ProgressSnapshot) -> Result<()> {
        debug!(path = %self.path.display(), subjects = snapshot.completed.len(), "ProgressStore::save: called");
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context(format!("Failed to create directory {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(snapshot).context("Failed to serialize progress")?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).context(format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path).context(format!("Failed to replace {}", self.path.display()))?;

        info!("Saved progress to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_is_default() {
        let temp = TempDir::new().unwrap();
        let store = ProgressStore::new(temp.path().join("progress.json"));
        assert_eq!(store.load().unwrap(), ProgressSnapshot::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let store = ProgressStore::new(temp.path().join("nested").join("progress.json"));

        let mut snapshot = ProgressSnapshot::default();
        snapshot.completed.insert("Math".to_string(), "Fractions".to_string());
        store.save(&snapshot).unwrap();

        assert!(store.path().exists());
        assert!(!store.path().with_extension("json.tmp").exists());
        assert_eq!(store.load().unwrap(), snapshot);
    }

    #[test]
    fn test_snapshot_file_format() {
        let temp = TempDir::new().unwrap();
        let store = ProgressStore::new(temp.path().join("progress.json"));

        let mut snapshot = ProgressSnapshot::default();
        snapshot.completed.insert("Histoire".to_string(), "La Grande Guerre".to_string());
        store.save(&snapshot).unwrap();

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(json["completed"]["Histoire"], "La Grande Guerre");
        assert!(json.get("updated-at").is_none());
    }

    #[test]
    fn test_load_corrupt_file_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("progress.json");
        fs::write(&path, "{not json").unwrap();

        let err = ProgressStore::new(&path).load().unwrap_err();
        assert!(err.to_string().contains("Failed to parse progress file"));
    }
}
