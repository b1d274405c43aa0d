//! Durable key-value store backed by `sled`
//!
//! Each value is serialized to JSON bytes. Batches go through
//! [`sled::Batch`] so a token commit is never half-written, and every
//! mutation is flushed before returning so a CLI invocation that exits
//! right after `login` still leaves the pending request on disk.

use std::path::{Path, PathBuf};

use anyhow::Context;
use directories::ProjectDirs;
use serde_json::Value;

use crate::error::{AuthflowError, Result};
use crate::store::KeyValueStore;

/// On-disk [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    /// Opens (or creates) the store at `path`.
    ///
    /// Parent directories are created as needed.
    ///
    /// # Errors
    ///
    /// Returns [`AuthflowError::Storage`] if the directory cannot be created
    /// or `sled` refuses to open the database (for example because another
    /// process holds the lock).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use authflow::store::SledStore;
    ///
    /// let store = SledStore::open("/tmp/authflow/session.db").unwrap();
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for session store")
                .map_err(|e| AuthflowError::Storage(e.to_string()))?;
        }

        let db = sled::open(path)
            .with_context(|| format!("Failed to open session store at {}", path.display()))
            .map_err(|e| AuthflowError::Storage(format!("{e:#}")))?;

        tracing::debug!("Opened session store at {}", path.display());
        Ok(Self { db })
    }

    /// Opens a throw-away store that lives only in memory.
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(|e| AuthflowError::Storage(e.to_string()))?;
        Ok(Self { db })
    }

    /// Default location of the session database in the user's data
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns [`AuthflowError::Storage`] if the platform data directory
    /// cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "authflow", "authflow")
            .ok_or_else(|| AuthflowError::Storage("Could not determine data directory".into()))?;
        Ok(proj_dirs.data_dir().join("session.db"))
    }

    fn flush(&self) -> Result<()> {
        self.db
            .flush()
            .map_err(|e| AuthflowError::Storage(format!("flush failed: {e}")))?;
        Ok(())
    }
}

fn encode(value: &Value) -> Result<Vec<u8>> {
    serde_json::to_vec(value)
        .map_err(|e| AuthflowError::Storage(format!("failed to encode value: {e}")).into())
}

impl KeyValueStore for SledStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let raw = self
            .db
            .get(key)
            .map_err(|e| AuthflowError::Storage(e.to_string()))?;

        match raw {
            Some(bytes) => {
                let value = serde_json::from_slice(&bytes).map_err(|e| {
                    AuthflowError::Storage(format!("corrupt value under '{key}': {e}"))
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        self.db
            .insert(key, encode(&value)?)
            .map_err(|e| AuthflowError::Storage(e.to_string()))?;
        self.flush()
    }

    fn set_all(&self, entries: &[(&str, Value)]) -> Result<()> {
        let mut batch = sled::Batch::default();
        for (key, value) in entries {
            batch.insert(key.as_bytes(), encode(value)?);
        }
        self.db
            .apply_batch(batch)
            .map_err(|e| AuthflowError::Storage(e.to_string()))?;
        self.flush()
    }

    fn clear(&self) -> Result<()> {
        self.db
            .clear()
            .map_err(|e| AuthflowError::Storage(e.to_string()))?;
        self.flush()
    }
}
