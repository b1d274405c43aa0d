//! In-memory key-value store

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use serde_json::Value;

use crate::error::{AuthflowError, Result};
use crate::store::KeyValueStore;

/// Process-local [`KeyValueStore`] backed by a `HashMap`.
///
/// Nothing survives the process. `set_all` holds the write lock for the
/// whole batch, which makes it atomic with respect to readers.
///
/// # Examples
///
/// ```
/// use authflow::store::{KeyValueStore, MemoryStore};
/// use serde_json::json;
///
/// let store = MemoryStore::new();
/// store.set("accessToken", json!("tok")).unwrap();
/// assert_eq!(store.get_string("accessToken").unwrap().as_deref(), Some("tok"));
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including after lock poisoning.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` when the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> anyhow::Error {
    AuthflowError::Storage("memory store lock poisoned".to_string()).into()
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.insert(key.to_string(), value);
        Ok(())
    }

    fn set_all(&self, batch: &[(&str, Value)]) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        for (key, value) in batch {
            entries.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.clear();
        Ok(())
    }
}
