// =============================================================================
// STORE MODULE
// =============================================================================
// Best-effort persistence of the three collections in a string key-value
// medium.
//
// NOTES:
// - `KeyValueStore` is the medium: get/set of text under a key
// - `Store` wraps a medium, adds the namespace prefix and JSON encoding
// - Reads that fail (absent, unreadable, malformed) yield the caller's default
// - Writes that fail are logged and counted; in-memory state stays the
//   source of truth for the rest of the session
// - There is no transaction across keys
// =============================================================================

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::metrics;

// -----------------------------------------------------------------------------
// KEYS
// -----------------------------------------------------------------------------
pub const TONERS_KEY: &str = "toners";
pub const ENTRIES_KEY: &str = "entries";
pub const EXITS_KEY: &str = "exits";

/// Prefix applied to every key.
pub const DEFAULT_NAMESPACE: &str = "toner-manager-";

// =============================================================================
// MEDIUM
// =============================================================================
/// A string-keyed text store.
pub trait KeyValueStore {
    /// Read the value under `key`; `Ok(None)` if nothing is stored.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Create or replace the value under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

// -----------------------------------------------------------------------------
// IN-MEMORY MEDIUM
// -----------------------------------------------------------------------------
/// `HashMap` behind a `RwLock`. Data is lost when the store is dropped.
///
/// An optional quota caps the total bytes held (keys plus values); a write
/// that would exceed it fails with [`StoreError::QuotaExceeded`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
            quota: Some(quota),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self
            .values
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self
            .values
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?;

        if let Some(quota) = self.quota {
            let others: usize = values
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > quota {
                return Err(StoreError::QuotaExceeded { needed, quota });
            }
        }

        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// FILE MEDIUM
// -----------------------------------------------------------------------------
/// One `<key>.json` file per key under a directory.
///
/// Writes land in a temporary file first and are renamed into place, so a
/// reader sees either the old or the new value.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

// =============================================================================
// STORE ADAPTER
// =============================================================================
/// Namespaced JSON persistence over a [`KeyValueStore`].
#[derive(Debug)]
pub struct Store<S> {
    backend: S,
    namespace: String,
}

impl<S: KeyValueStore> Store<S> {
    pub fn new(backend: S, namespace: impl Into<String>) -> Self {
        Self {
            backend,
            namespace: namespace.into(),
        }
    }

    /// The key actually used in the medium, e.g. `toner-manager-toners`.
    pub fn storage_key(&self, key: &str) -> String {
        format!("{}{}", self.namespace, key)
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    // -------------------------------------------------------------------------
    // LOAD
    // -------------------------------------------------------------------------
    /// Value stored under `key`, or `default` if it is absent, unreadable or
    /// malformed. Failures are logged, never returned.
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let start = Instant::now();
        let storage_key = self.storage_key(key);

        let value = match self.backend.get(&storage_key) {
            Ok(Some(text)) => match serde_json::from_str(&text) {
                Ok(value) => {
                    debug!(key = %storage_key, bytes = text.len(), "Loaded from store");
                    value
                }
                Err(e) => {
                    warn!(
                        key = %storage_key,
                        error = %e,
                        "Stored value is malformed, using default"
                    );
                    metrics::record_store_failure("load");
                    default
                }
            },
            Ok(None) => {
                debug!(key = %storage_key, "Nothing stored, using default");
                default
            }
            Err(e) => {
                warn!(key = %storage_key, error = %e, "Store read failed, using default");
                metrics::record_store_failure("load");
                default
            }
        };

        metrics::record_store_operation("load", start.elapsed().as_secs_f64());
        value
    }

    // -------------------------------------------------------------------------
    // SAVE
    // -------------------------------------------------------------------------
    /// Serialize `value` under `key`. Failures are logged, never returned.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let start = Instant::now();
        let storage_key = self.storage_key(key);

        let result = serde_json::to_string(value)
            .map_err(StoreError::from)
            .and_then(|text| self.backend.set(&storage_key, &text).map(|()| text.len()));

        match result {
            Ok(bytes) => debug!(key = %storage_key, bytes, "Saved to store"),
            Err(e) => {
                warn!(
                    key = %storage_key,
                    error = %e,
                    "Store write failed, keeping in-memory state"
                );
                metrics::record_store_failure("save");
            }
        }

        metrics::record_store_operation("save", start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Entry, Exit, Toner};
    use crate::seed;

    #[test]
    fn test_save_then_load_round_trip() {
        let store = Store::new(MemoryStore::new(), DEFAULT_NAMESPACE);
        let toners = seed::toners();
        let entries = seed::entries();
        let exits = seed::exits();

        store.save(TONERS_KEY, &toners);
        store.save(ENTRIES_KEY, &entries);
        store.save(EXITS_KEY, &exits);

        assert_eq!(store.load(TONERS_KEY, Vec::<Toner>::new()), toners);
        assert_eq!(store.load(ENTRIES_KEY, Vec::<Entry>::new()), entries);
        assert_eq!(store.load(EXITS_KEY, Vec::<Exit>::new()), exits);
    }

    #[test]
    fn test_keys_are_namespaced() {
        let store = Store::new(MemoryStore::new(), DEFAULT_NAMESPACE);
        store.save(TONERS_KEY, &Vec::<u32>::new());

        assert_eq!(store.storage_key(TONERS_KEY), "toner-manager-toners");
        assert_eq!(
            store.backend().get("toner-manager-toners").unwrap().as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn test_missing_value_returns_default() {
        let store = Store::new(MemoryStore::new(), DEFAULT_NAMESPACE);
        let default = seed::toners();
        assert_eq!(store.load(TONERS_KEY, default.clone()), default);
    }

    #[test]
    fn test_corrupted_value_returns_default() {
        let store = Store::new(MemoryStore::new(), DEFAULT_NAMESPACE);
        store
            .backend()
            .set(&store.storage_key(TONERS_KEY), "{not json")
            .unwrap();

        let default = seed::toners();
        assert_eq!(store.load(TONERS_KEY, default.clone()), default);
    }

    #[test]
    fn test_save_over_quota_is_swallowed() {
        let store = Store::new(MemoryStore::with_quota(16), DEFAULT_NAMESPACE);

        store.save(TONERS_KEY, &seed::toners());

        assert!(store
            .backend()
            .get(&store.storage_key(TONERS_KEY))
            .unwrap()
            .is_none());
        assert!(store.load(TONERS_KEY, Vec::<Toner>::new()).is_empty());
    }

    #[test]
    fn test_quota_counts_replaced_value_once() {
        let backend = MemoryStore::with_quota(10);
        backend.set("k", "12345678").unwrap();
        // replacing the same key does not double count
        backend.set("k", "87654321").unwrap();
        assert!(matches!(
            backend.set("other", "x"),
            Err(StoreError::QuotaExceeded { .. })
        ));
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(FileStore::new(dir.path()), DEFAULT_NAMESPACE);
        let entries = seed::entries();

        store.save(ENTRIES_KEY, &entries);

        assert!(dir.path().join("toner-manager-entries.json").exists());
        assert!(!dir.path().join("toner-manager-entries.json.tmp").exists());
        assert_eq!(store.load(ENTRIES_KEY, Vec::<Entry>::new()), entries);
    }

    #[test]
    fn test_file_store_missing_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileStore::new(dir.path().join("not-created-yet"));
        assert_eq!(backend.dir(), dir.path().join("not-created-yet").as_path());
        assert!(backend.get("toner-manager-toners").unwrap().is_none());
    }
}
