//! Key-value persistence port and error types.
//!
//! The dashboard only ever needs a handful of named records, so the port is
//! a plain string-to-string map. `MemoryStore` stands in when no durable
//! storage is available.

use std::collections::HashMap;

use parking_lot::Mutex;
use skydeck_core::{AppError, StorageError};
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backing storage could not be opened.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A record could not be read.
    #[error("Read failed: {0}")]
    Read(String),

    /// A record could not be written or removed.
    #[error("Write failed: {0}")]
    Write(String),
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn read(message: impl Into<String>) -> Self {
        Self::Read(message.into())
    }

    pub fn write(message: impl Into<String>) -> Self {
        Self::Write(message.into())
    }
}

impl From<StoreError> for StorageError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => StorageError::Unavailable(msg),
            StoreError::Read(msg) => StorageError::ReadFailed(msg),
            StoreError::Write(msg) => StorageError::WriteFailed(msg),
        }
    }
}

impl From<StorageError> for StoreError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Unavailable(msg) => StoreError::Unavailable(msg),
            StorageError::ReadFailed(msg) => StoreError::Read(msg),
            StorageError::WriteFailed(msg) => StoreError::Write(msg),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Storage(err.into())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Durable string records addressed by key.
///
/// Implementations must be shareable across tasks; interior locking is
/// their own concern.
pub trait KeyValueStore: Send + Sync {
    /// Returns `None` when the record has never been written or was removed.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Create or overwrite a record.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Delete a record. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> StoreResult<()>;

    /// Whether a record exists for `key`.
    fn contains(&self, key: &str) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// Non-durable store; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.records.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.records
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.records.lock().remove(key);
        Ok(())
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        (**self).remove(key)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        (**self).remove(key)
    }
}
