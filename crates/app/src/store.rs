//! Persisted client state.
//!
//! The moral equivalent of browser local storage: a small key/value cache
//! of JSON entries. Single writer at a time, convenience only — never a
//! transactional store.

use std::{
    collections::BTreeMap,
    fs, io,
    path::PathBuf,
    sync::{Mutex, MutexGuard, PoisonError},
};

use mockall::automock;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

/// Storage keys for persisted client state.
pub mod keys {
    /// The signed-in session mirror.
    pub const USER: &str = "user";

    /// The cart snapshot.
    pub const CART: &str = "cart";

    /// The in-progress checkout draft.
    pub const CHECKOUT_FORM: &str = "checkout_form_data";

    /// The most recently placed order.
    pub const LAST_ORDER: &str = "last_order";
}

/// Errors related to persisted client state.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The state file could not be read or written.
    #[error("state file error")]
    Io(#[from] io::Error),

    /// A stored entry is not valid JSON for the requested type.
    #[error("state entry is not valid JSON")]
    Serde(#[from] serde_json::Error),
}

/// Client-side key/value cache.
#[automock]
pub trait StateStore: Send + Sync {
    /// Read a raw entry.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the underlying storage fails.
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Write a raw entry, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the underlying storage fails.
    fn put(&self, key: &str, value: Value) -> Result<(), StoreError>;

    /// Delete an entry. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the underlying storage fails.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Read and deserialize an entry.
///
/// # Errors
///
/// Returns a [`StoreError`] on storage failure or a shape mismatch.
pub fn get_typed<T: DeserializeOwned>(
    store: &dyn StateStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    store
        .get(key)?
        .map(|value| serde_json::from_value(value).map_err(StoreError::from))
        .transpose()
}

/// Serialize and write an entry.
///
/// # Errors
///
/// Returns a [`StoreError`] on storage or serialization failure.
pub fn put_typed<T: Serialize>(
    store: &dyn StateStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    store.put(key, serde_json::to_value(value)?)
}

/// File-backed store: one JSON object per state file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Create a store over the given file. The file is created lazily on
    /// the first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn read_entries(&self) -> Result<BTreeMap<String, Value>, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(error) => Err(error.into()),
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, Value>) -> Result<(), StoreError> {
        fs::write(&self.path, serde_json::to_vec_pretty(entries)?)?;

        Ok(())
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl StateStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let _guard = self.guard();

        Ok(self.read_entries()?.remove(key))
    }

    fn put(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let _guard = self.guard();

        let mut entries = self.read_entries()?;
        entries.insert(key.to_owned(), value);

        self.write_entries(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.guard();

        let mut entries = self.read_entries()?;

        if entries.remove(key).is_some() {
            self.write_entries(&entries)?;
        }

        Ok(())
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, Value>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Value>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.lock().get(key).cloned())
    }

    fn put(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.lock().insert(key.to_owned(), value);

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.lock().remove(key);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn json_file_store_round_trips_entries() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = JsonFileStore::new(dir.path().join("state.json"));

        store.put(keys::CART, json!({"items": []}))?;
        store.put(keys::USER, json!({"name": "Asha"}))?;

        assert_eq!(store.get(keys::CART)?, Some(json!({"items": []})));
        assert_eq!(store.get(keys::USER)?, Some(json!({"name": "Asha"})));

        Ok(())
    }

    #[test]
    fn json_file_store_missing_file_reads_empty() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = JsonFileStore::new(dir.path().join("state.json"));

        assert_eq!(store.get(keys::LAST_ORDER)?, None);

        Ok(())
    }

    #[test]
    fn json_file_store_remove_deletes_only_that_key() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = JsonFileStore::new(dir.path().join("state.json"));

        store.put(keys::CART, json!(1))?;
        store.put(keys::USER, json!(2))?;
        store.remove(keys::CART)?;

        assert_eq!(store.get(keys::CART)?, None);
        assert_eq!(store.get(keys::USER)?, Some(json!(2)));

        Ok(())
    }

    #[test]
    fn removing_a_missing_key_is_not_an_error() -> TestResult {
        let store = MemoryStore::new();

        store.remove("absent")?;

        Ok(())
    }

    #[test]
    fn typed_helpers_round_trip() -> TestResult {
        let store = MemoryStore::new();

        put_typed(&store, keys::CHECKOUT_FORM, &vec!["a".to_owned()])?;

        let value: Option<Vec<String>> = get_typed(&store, keys::CHECKOUT_FORM)?;

        assert_eq!(value, Some(vec!["a".to_owned()]));

        Ok(())
    }

    #[test]
    fn typed_get_with_wrong_shape_is_an_error() -> TestResult {
        let store = MemoryStore::new();

        store.put(keys::CART, json!("not a map"))?;

        let result: Result<Option<Vec<String>>, _> = get_typed(&store, keys::CART);

        assert!(
            matches!(result, Err(StoreError::Serde(_))),
            "expected Serde error, got {result:?}"
        );

        Ok(())
    }
}
