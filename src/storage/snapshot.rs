//! JSON snapshot persistence.
//!
//! The whole mapping is serialized on every save and swapped into place with a
//! rename, so readers of the file see either the old or the new snapshot.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};

use crate::errors::{Result, TinylinkerError};

pub trait SnapshotStore<T>: Send + Sync {
    /// Reads the snapshot. Never fails: a missing or unreadable snapshot yields
    /// an empty mapping.
    fn load(&self) -> HashMap<String, T>;

    /// Replaces the snapshot with `entries`.
    fn save(&self, entries: &HashMap<String, T>) -> Result<()>;

    fn describe(&self) -> String;
}

pub struct FileSnapshotStore {
    path: PathBuf,
    label: &'static str,
    announced: AtomicBool,
}

impl FileSnapshotStore {
    pub fn new(path: impl AsRef<Path>, label: &'static str) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            label,
            announced: AtomicBool::new(false),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(suffix);
        PathBuf::from(name)
    }

    /// Moves an unparseable snapshot out of the way so the next save does not
    /// destroy it.
    fn quarantine(&self) {
        let target = self.sibling(&format!(
            ".corrupt-{}",
            chrono::Utc::now().format("%Y%m%d%H%M%S")
        ));
        match fs::rename(&self.path, &target) {
            Ok(()) => warn!(
                "Unreadable {} snapshot moved to {}",
                self.label,
                target.display()
            ),
            Err(e) => error!(
                "Failed to move unreadable {} snapshot aside: {}",
                self.label, e
            ),
        }
    }

    fn write_atomically(&self, content: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.sibling(".tmp");
        {
            let mut file = File::create(&tmp_path)?;
            file.write_all(content)?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)
    }
}

impl<T> SnapshotStore<T> for FileSnapshotStore
where
    T: Serialize + DeserializeOwned,
{
    fn load(&self) -> HashMap<String, T> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                if !self.announced.swap(true, Ordering::Relaxed) {
                    info!(
                        "No {} snapshot at {}, starting empty; it will be created on the first change",
                        self.label,
                        self.path.display()
                    );
                }
                return HashMap::new();
            }
            Err(e) => {
                error!(
                    "Failed to read {} snapshot {}: {}; continuing with empty state",
                    self.label,
                    self.path.display(),
                    e
                );
                return HashMap::new();
            }
        };

        match serde_json::from_str::<HashMap<String, T>>(&content) {
            Ok(entries) => {
                info!(
                    "Loaded {} {} entries from {}",
                    entries.len(),
                    self.label,
                    self.path.display()
                );
                entries
            }
            Err(e) => {
                error!(
                    "Failed to parse {} snapshot {}: {}; continuing with empty state",
                    self.label,
                    self.path.display(),
                    e
                );
                self.quarantine();
                HashMap::new()
            }
        }
    }

    fn save(&self, entries: &HashMap<String, T>) -> Result<()> {
        let json = serde_json::to_vec_pretty(entries)?;
        self.write_atomically(&json).map_err(|e| {
            TinylinkerError::persistence_degraded(format!(
                "Failed to write {} snapshot {}: {}",
                self.label,
                self.path.display(),
                e
            ))
        })?;
        debug!(
            "Saved {} {} entries to {}",
            entries.len(),
            self.label,
            self.path.display()
        );
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

/// Store without a medium: loads nothing, saves nowhere.
pub struct NullSnapshotStore;

impl<T> SnapshotStore<T> for NullSnapshotStore {
    fn load(&self) -> HashMap<String, T> {
        HashMap::new()
    }

    fn save(&self, _entries: &HashMap<String, T>) -> Result<()> {
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::UrlRecord;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> FileSnapshotStore {
        FileSnapshotStore::new(dir.path().join("links.json"), "links")
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let loaded: HashMap<String, UrlRecord> = store.load();
        assert!(loaded.is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let mut entries = HashMap::new();
        entries.insert("b2xVn2".to_string(), UrlRecord::new("http://example.com", None));

        store.save(&entries).unwrap();

        assert!(store.path().exists());
        assert!(!dir.path().join("links.json.tmp").exists());
    }

    #[test]
    fn test_snapshot_is_human_readable_json() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let mut entries = HashMap::new();
        entries.insert(
            "9sm5xK".to_string(),
            UrlRecord::new("http://www.google.com", Some("aJ48lW".to_string())),
        );
        store.save(&entries).unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["9sm5xK"]["long_url"], "http://www.google.com");
        assert_eq!(value["9sm5xK"]["owner_id"], "aJ48lW");
        assert_eq!(value["9sm5xK"]["deleted"], false);
        assert!(text.contains('\n'));
    }

    #[test]
    fn test_corrupt_file_degrades_and_is_quarantined() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "{ not json").unwrap();

        let loaded: HashMap<String, UrlRecord> = store.load();
        assert!(loaded.is_empty());
        assert!(!store.path().exists());

        let quarantined = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .any(|e| e.file_name().to_string_lossy().contains(".corrupt-"));
        assert!(quarantined);
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("nested/data/links.json"), "links");
        let entries: HashMap<String, UrlRecord> = HashMap::new();
        store.save(&entries).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_save_failure_is_persistence_degraded() {
        let dir = TempDir::new().unwrap();
        // the target path is an existing directory, so the rename cannot succeed
        let blocked = dir.path().join("blocked");
        fs::create_dir_all(blocked.join("inner")).unwrap();
        let store = FileSnapshotStore::new(&blocked, "links");

        let entries: HashMap<String, UrlRecord> = HashMap::new();
        let err = store.save(&entries).unwrap_err();
        assert!(matches!(err, TinylinkerError::PersistenceDegraded(_)));
    }
}
