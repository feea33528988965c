use std::collections::HashMap;
use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

/// Key holding the creator collection.
pub const CREATORS_KEY: &str = "creators";
/// Key holding the brand shortlist.
pub const SAVED_CREATORS_KEY: &str = "savedCreators";

/// Whole-value key/value persistence. No partial updates, no cross-key transactions.
pub trait KeyValueStore: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<Value>, StoreError>;
    fn write(&self, key: &str, value: &Value) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid store key '{0}'")]
    InvalidKey(String),
    #[error("stored value for '{key}' is not valid JSON: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("store io failure for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
}

/// One `<key>.json` document per key under a directory; writes go through a
/// temp file and rename so readers never observe a half-written value.
#[derive(Debug)]
pub struct JsonFileStore {
    root: PathBuf,
}

static SHARED_FILE_STORE: OnceLock<Arc<JsonFileStore>> = OnceLock::new();

impl JsonFileStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StoreError::Io {
            key: root.display().to_string(),
            source,
        })?;
        Ok(Self { root })
    }

    /// Process-wide instance. The first caller picks the directory; later
    /// callers receive the same store regardless of the path they pass.
    pub fn shared(root: impl Into<PathBuf>) -> Result<Arc<Self>, StoreError> {
        if let Some(existing) = SHARED_FILE_STORE.get() {
            return Ok(existing.clone());
        }

        let store = Arc::new(Self::open(root)?);
        let shared = SHARED_FILE_STORE.get_or_init(|| store);
        debug!(root = %shared.root.display(), "shared record store initialized");
        Ok(shared.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl KeyValueStore for JsonFileStore {
    fn read(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let path = self.path_for(key)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io {
                    key: key.to_string(),
                    source,
                })
            }
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StoreError::Malformed {
                key: key.to_string(),
                source,
            })
    }

    fn write(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let bytes = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Malformed {
            key: key.to_string(),
            source,
        })?;
        write_atomic(&path, &bytes).map_err(|source| StoreError::Io {
            key: key.to_string(),
            source,
        })
    }
}

pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no parent"))?;
    fs::create_dir_all(parent)?;
    let tmp = parent.join(format!(
        ".{}.tmp.{}",
        path.file_name().and_then(|s| s.to_str()).unwrap_or("record"),
        Uuid::new_v4().simple()
    ));
    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)
}

/// In-process store holding raw serialized text, so tests can plant values the
/// JSON parser rejects.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn insert_raw(&self, key: &str, raw: impl Into<String>) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), raw.into());
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let raw = self.raw(key);
        raw.map(|text| {
            serde_json::from_str(&text).map_err(|source| StoreError::Malformed {
                key: key.to_string(),
                source,
            })
        })
        .transpose()
    }

    fn write(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        self.insert_raw(key, value.to_string());
        Ok(())
    }
}
