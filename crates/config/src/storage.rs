// Local device storage
// A flat string key/value map, persisted to ~/.config/codenest/storage.json

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use thiserror::Error;

/// Session token key.
pub const KEY_TOKEN: &str = "token";
/// Serialized user object key.
pub const KEY_USER: &str = "user";
/// `"true"` while a session is stored.
pub const KEY_IS_AUTHENTICATED: &str = "isAuthenticated";
/// Editor settings blob.
pub const KEY_EDITOR_SETTINGS: &str = "codenest.editorSettings";
/// UI layout settings blob.
pub const KEY_UI_SETTINGS: &str = "codenest.uiSettings";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read storage {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write storage {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize storage: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Synchronous key/value storage shared by the settings stores and the session.
///
/// Writes are last-write-wins. Nothing coordinates two processes sharing a file.
pub trait LocalStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// JSON-file backed storage.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Default location of the storage file
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("codenest")
            .join("storage.json")
    }

    /// Open storage at `path`. A missing file is an empty map; a corrupt one is
    /// discarded with a warning.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|source| StorageError::Read {
                path: path.clone(),
                source,
            })?;
            match serde_json::from_str::<BTreeMap<String, String>>(&contents) {
                Ok(map) => map,
                Err(e) => {
                    log::warn!("Ignoring corrupt storage file {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let payload = serde_json::to_string_pretty(entries)?;

        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, payload.as_bytes()).map_err(|source| StorageError::Write {
            path: tmp_path.clone(),
            source,
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&tmp_path, permissions).map_err(|source| StorageError::Write {
                path: tmp_path.clone(),
                source,
            })?;
        }

        fs::rename(&tmp_path, &self.path).map_err(|source| StorageError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

impl LocalStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock();
        let mut next = entries.clone();
        next.insert(key.to_string(), value.to_string());
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock();
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(key);
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }
}

/// In-memory storage (tests, guest sessions)
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl LocalStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_persists_across_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let storage = FileStorage::open(&path).unwrap();
        assert_eq!(storage.get(KEY_TOKEN).unwrap(), None);
        storage.set(KEY_TOKEN, "abc").unwrap();
        storage.set(KEY_IS_AUTHENTICATED, "true").unwrap();

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get(KEY_TOKEN).unwrap().as_deref(), Some("abc"));
        assert_eq!(reopened.get(KEY_IS_AUTHENTICATED).unwrap().as_deref(), Some("true"));
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_file_storage_remove() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let storage = FileStorage::open(&path).unwrap();
        storage.set(KEY_USER, "{}").unwrap();
        storage.remove(KEY_USER).unwrap();
        // Removing a missing key is fine
        storage.remove(KEY_USER).unwrap();

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get(KEY_USER).unwrap(), None);
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "{ not json").unwrap();

        let storage = FileStorage::open(&path).unwrap();
        assert_eq!(storage.get(KEY_TOKEN).unwrap(), None);
        storage.set(KEY_TOKEN, "t").unwrap();
        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get(KEY_TOKEN).unwrap().as_deref(), Some("t"));
    }

    #[test]
    fn test_failed_write_leaves_map_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("storage.json");
        let storage = FileStorage::open(&good).unwrap();
        storage.set(KEY_USER, "{}").unwrap();

        // Parent of the storage file is a regular file, so every write fails
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let broken = FileStorage::open(blocker.join("storage.json")).unwrap();
        assert!(broken.set(KEY_TOKEN, "tok").is_err());
        assert_eq!(broken.get(KEY_TOKEN).unwrap(), None);

        broken.entries.lock().insert(KEY_USER.to_string(), "{}".to_string());
        assert!(broken.remove(KEY_USER).is_err());
        assert_eq!(broken.get(KEY_USER).unwrap().as_deref(), Some("{}"));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_storage_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let storage = FileStorage::open(&path).unwrap();
        storage.set(KEY_TOKEN, "secret").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::new();
        assert!(storage.is_empty());
        storage.set("a", "1").unwrap();
        storage.set("a", "2").unwrap();
        assert_eq!(storage.len(), 1);
        assert_eq!(storage.get("a").unwrap().as_deref(), Some("2"));
        storage.remove("a").unwrap();
        assert!(storage.is_empty());
    }
}
