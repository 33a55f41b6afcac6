//! Persisted key-value parameter store.
//!
//! The whole map is serialized as one JSON snapshot and written wholesale
//! on every requested save; at startup the snapshot is read back in one
//! piece. No partial writes, no per-key files.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::info;

use crate::error::ParamError;

/// A flat map of named parameters, mirrored to a single snapshot file.
pub struct ParamStore {
    path: PathBuf,
    params: RwLock<HashMap<String, Value>>,
}

impl ParamStore {
    /// Creates an empty store backed by the given snapshot path. Call
    /// [`load`](Self::load) before first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            params: RwLock::new(HashMap::new()),
        }
    }

    /// Reads the snapshot from disk, replacing the in-memory map.
    ///
    /// When the file does not exist yet, an empty snapshot is persisted
    /// first so later saves never surprise the filesystem.
    pub async fn load(&self) -> Result<(), ParamError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let snapshot: HashMap<String, Value> = serde_json::from_slice(&bytes)?;
                let count = snapshot.len();
                *self.params.write() = snapshot;
                info!(path = %self.path.display(), params = count, "Parameter snapshot loaded");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No parameter snapshot, creating an empty one");
                self.save().await
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Writes the whole map to the snapshot file.
    pub async fn save(&self) -> Result<(), ParamError> {
        let snapshot = {
            let params = self.params.read();
            serde_json::to_vec_pretty(&*params)?
        };
        tokio::fs::write(&self.path, snapshot).await?;
        Ok(())
    }

    /// Sets `key` to `default` only if it is absent (first write wins),
    /// persisting when the write happened.
    pub async fn add(&self, key: &str, default: impl Serialize) -> Result<(), ParamError> {
        let inserted = {
            let mut params = self.params.write();
            if params.contains_key(key) {
                false
            } else {
                params.insert(key.to_string(), serde_json::to_value(default)?);
                true
            }
        };
        if inserted {
            self.save().await?;
        }
        Ok(())
    }

    /// Overwrites `key`, persisting the snapshot when `persist` is set.
    pub async fn set(
        &self,
        key: &str,
        value: impl Serialize,
        persist: bool,
    ) -> Result<(), ParamError> {
        {
            let mut params = self.params.write();
            params.insert(key.to_string(), serde_json::to_value(value)?);
        }
        if persist {
            self.save().await?;
        }
        Ok(())
    }

    /// Reads `key`, deserializing into the requested type.
    ///
    /// A missing key is a hard [`ParamError::NotFound`]; the store never
    /// substitutes defaults on read.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, ParamError> {
        let params = self.params.read();
        let value = params
            .get(key)
            .ok_or_else(|| ParamError::NotFound(key.to_string()))?;
        Ok(T::deserialize(value)?)
    }

    /// Whether `key` currently has a value.
    pub fn contains(&self, key: &str) -> bool {
        self.params.read().contains_key(key)
    }

    /// Number of stored parameters.
    pub fn len(&self) -> usize {
        self.params.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.params.read().is_empty()
    }
}
