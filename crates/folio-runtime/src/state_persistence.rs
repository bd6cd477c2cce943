//! Preference persistence across sessions.
//!
//! ```text
//! PreferenceStore  (in-memory cache + dirty flag)
//!        │
//!        ▼
//! StorageBackend   MemoryStorage | FileStorage (JSON, `state-persistence`)
//! ```
//!
//! Storage failures never panic. A missing file is a first run; a file with
//! an unknown format version is ignored with a warning. File writes go to a
//! temporary sibling first and are renamed into place.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    /// JSON encode or decode failure.
    Serialization(String),
    Corruption(String),
    Unavailable(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "I/O error: {e}"),
            StorageError::Serialization(msg) => write!(f, "serialization error: {msg}"),
            StorageError::Corruption(msg) => write!(f, "storage corruption: {msg}"),
            StorageError::Unavailable(msg) => write!(f, "storage unavailable: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// One stored preference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredEntry {
    pub key: String,
    /// Schema version of `value`, chosen by the writer.
    pub version: u32,
    pub value: serde_json::Value,
}

/// Pluggable persistence for [`PreferenceStore`].
pub trait StorageBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Every stored entry. A backend with nothing stored returns an empty map.
    fn load_all(&self) -> StorageResult<HashMap<String, StoredEntry>>;

    /// Replace everything stored with `entries`.
    fn save_all(&self, entries: &HashMap<String, StoredEntry>) -> StorageResult<()>;

    /// Whether loads and saves can succeed at all.
    fn is_available(&self) -> bool {
        true
    }
}

/// Process-local storage; contents vanish with the process.
#[derive(Default)]
pub struct MemoryStorage {
    data: RwLock<HashMap<String, StoredEntry>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn name(&self) -> &str {
        "MemoryStorage"
    }

    fn load_all(&self) -> StorageResult<HashMap<String, StoredEntry>> {
        let guard = self
            .data
            .read()
            .map_err(|_| StorageError::Corruption("memory lock poisoned".into()))?;
        Ok(guard.clone())
    }

    fn save_all(&self, entries: &HashMap<String, StoredEntry>) -> StorageResult<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| StorageError::Corruption("memory lock poisoned".into()))?;
        guard.clone_from(entries);
        Ok(())
    }
}

#[cfg(feature = "state-persistence")]
mod file_storage {
    use super::*;
    use std::fs::{self, File};
    use std::io::{BufReader, BufWriter, Write};
    use std::path::{Path, PathBuf};

    #[derive(Serialize, Deserialize)]
    struct StateFile {
        format_version: u32,
        entries: HashMap<String, FileEntry>,
    }

    impl StateFile {
        const FORMAT_VERSION: u32 = 1;
    }

    #[derive(Serialize, Deserialize)]
    struct FileEntry {
        version: u32,
        value: serde_json::Value,
    }

    /// JSON file storage with write-then-rename saves.
    #[derive(Debug, Clone)]
    pub struct FileStorage {
        path: PathBuf,
    }

    impl FileStorage {
        /// The file is created on first save.
        #[must_use]
        pub fn new(path: impl AsRef<Path>) -> Self {
            Self {
                path: path.as_ref().to_path_buf(),
            }
        }

        /// `$XDG_STATE_HOME/<app>/state.json`, falling back to
        /// `~/.local/state/<app>/state.json`, then the working directory.
        #[must_use]
        pub fn default_for_app(app_name: &str) -> Self {
            Self::new(state_dir().join(app_name).join("state.json"))
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        fn temp_path(&self) -> PathBuf {
            let mut tmp = self.path.clone();
            tmp.set_extension("json.tmp");
            tmp
        }
    }

    fn state_dir() -> PathBuf {
        if let Some(state_home) = std::env::var_os("XDG_STATE_HOME").filter(|v| !v.is_empty()) {
            return PathBuf::from(state_home);
        }
        if let Some(home) = std::env::var_os("HOME").filter(|v| !v.is_empty()) {
            return PathBuf::from(home).join(".local").join("state");
        }
        PathBuf::from(".")
    }

    impl StorageBackend for FileStorage {
        fn name(&self) -> &str {
            "FileStorage"
        }

        fn load_all(&self) -> StorageResult<HashMap<String, StoredEntry>> {
            if !self.path.exists() {
                return Ok(HashMap::new());
            }
            let reader = BufReader::new(File::open(&self.path)?);
            let state_file: StateFile = serde_json::from_reader(reader).map_err(|e| {
                StorageError::Serialization(format!("failed to parse {}: {e}", self.path.display()))
            })?;

            if state_file.format_version != StateFile::FORMAT_VERSION {
                tracing::warn!(
                    target: "folio.state",
                    stored = state_file.format_version,
                    expected = StateFile::FORMAT_VERSION,
                    "state file format version mismatch, ignoring stored preferences"
                );
                return Ok(HashMap::new());
            }

            Ok(state_file
                .entries
                .into_iter()
                .map(|(key, entry)| {
                    let stored = StoredEntry {
                        key: key.clone(),
                        version: entry.version,
                        value: entry.value,
                    };
                    (key, stored)
                })
                .collect())
        }

        fn save_all(&self, entries: &HashMap<String, StoredEntry>) -> StorageResult<()> {
            if let Some(parent) = self.path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent)?;
            }

            let state_file = StateFile {
                format_version: StateFile::FORMAT_VERSION,
                entries: entries
                    .iter()
                    .map(|(key, e)| {
                        (
                            key.clone(),
                            FileEntry {
                                version: e.version,
                                value: e.value.clone(),
                            },
                        )
                    })
                    .collect(),
            };

            let tmp_path = self.temp_path();
            {
                let mut writer = BufWriter::new(File::create(&tmp_path)?);
                serde_json::to_writer_pretty(&mut writer, &state_file)?;
                writer.flush()?;
                writer.get_ref().sync_all()?;
            }
            fs::rename(&tmp_path, &self.path)?;

            tracing::debug!(
                target: "folio.state",
                path = %self.path.display(),
                entries = entries.len(),
                "preferences written"
            );
            Ok(())
        }

        /// A directory sitting where the file should be can never be written.
        fn is_available(&self) -> bool {
            !self.path.is_dir()
        }
    }
}

#[cfg(feature = "state-persistence")]
pub use file_storage::FileStorage;

/// Cached key/value preferences over a [`StorageBackend`].
///
/// Writes only touch the cache and mark it dirty; [`flush`](Self::flush)
/// persists. All methods take `&self` so the store can be shared via `Arc`.
pub struct PreferenceStore {
    backend: Box<dyn StorageBackend>,
    cache: RwLock<HashMap<String, StoredEntry>>,
    dirty: RwLock<bool>,
}

impl fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreferenceStore")
            .field("backend", &self.backend.name())
            .field("len", &self.len())
            .field("dirty", &self.is_dirty())
            .finish()
    }
}

impl PreferenceStore {
    /// Does not read the backend; call [`load`](Self::load).
    #[must_use]
    pub fn new(backend: Box<dyn StorageBackend>) -> Self {
        Self {
            backend,
            cache: RwLock::new(HashMap::new()),
            dirty: RwLock::new(false),
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStorage::new()))
    }

    #[cfg(feature = "state-persistence")]
    #[must_use]
    pub fn with_file(path: impl AsRef<std::path::Path>) -> Self {
        Self::new(Box::new(FileStorage::new(path)))
    }

    #[must_use]
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Replace the cache with the backend's contents. Returns the entry count.
    pub fn load(&self) -> StorageResult<usize> {
        self.check_available()?;
        let entries = self.backend.load_all()?;
        let count = entries.len();
        *self
            .cache
            .write()
            .map_err(|_| StorageError::Corruption("cache lock poisoned".into()))? = entries;
        self.set_dirty(false)?;
        tracing::debug!(target: "folio.state", backend = self.backend.name(), count, "preferences loaded");
        Ok(count)
    }

    /// Persist if anything changed. `Ok(true)` when data was written.
    pub fn flush(&self) -> StorageResult<bool> {
        if !self.is_dirty() {
            return Ok(false);
        }
        self.check_available()?;
        {
            let cache = self
                .cache
                .read()
                .map_err(|_| StorageError::Corruption("cache lock poisoned".into()))?;
            self.backend.save_all(&cache)?;
        }
        self.set_dirty(false)?;
        Ok(true)
    }

    fn check_available(&self) -> StorageResult<()> {
        if self.backend.is_available() {
            Ok(())
        } else {
            Err(StorageError::Unavailable(self.backend.name().to_owned()))
        }
    }

    fn set_dirty(&self, value: bool) -> StorageResult<()> {
        *self
            .dirty
            .write()
            .map_err(|_| StorageError::Corruption("dirty lock poisoned".into()))? = value;
        Ok(())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<StoredEntry> {
        self.cache.read().ok()?.get(key).cloned()
    }

    /// Typed read. Missing keys, version mismatches, and undecodable values yield `None`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str, version: u32) -> Option<T> {
        let entry = self.get(key)?;
        if entry.version != version {
            tracing::debug!(
                target: "folio.state",
                key,
                stored = entry.version,
                expected = version,
                "preference version mismatch"
            );
            return None;
        }
        match serde_json::from_value(entry.value) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(target: "folio.state", key, error = %e, "undecodable preference");
                None
            }
        }
    }

    /// Store a raw value. Marks the store dirty only if the value changed.
    pub fn set(&self, key: impl Into<String>, version: u32, value: serde_json::Value) {
        let key = key.into();
        let Ok(mut cache) = self.cache.write() else {
            return;
        };
        let entry = StoredEntry {
            key: key.clone(),
            version,
            value,
        };
        if cache.get(&key) == Some(&entry) {
            return;
        }
        cache.insert(key, entry);
        drop(cache);
        let _ = self.set_dirty(true);
    }

    /// Typed write.
    pub fn set_as<T: Serialize>(&self, key: impl Into<String>, version: u32, value: &T) -> StorageResult<()> {
        let value = serde_json::to_value(value)?;
        self.set(key, version, value);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.read().map(|d| *d).unwrap_or(false)
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }
}
