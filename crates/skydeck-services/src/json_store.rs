use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::kv::{KeyValueStore, StoreError, StoreResult};

/// File-backed store. Each record lives in `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open<P: AsRef<Path>>(dir: P) -> StoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| {
            StoreError::unavailable(format!("Failed to create {}: {}", dir.display(), e))
        })?;
        tracing::debug!("Opened JSON store at {:?}", dir);
        Ok(Self { dir })
    }

    fn record_path(&self, key: &str) -> StoreResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::write(format!("Invalid record key: {:?}", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.record_path(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::read(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let path = self.record_path(key)?;
        // Atomic replace via a sibling temp file
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)
            .and_then(|_| fs::rename(&tmp, &path))
            .map_err(|e| StoreError::write(format!("Failed to write {}: {}", path.display(), e)))?;
        tracing::debug!("Stored record {} at {:?}", key, path);
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let path = self.record_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!("Deleted record {}", key);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::write(format!(
                "Failed to delete {}: {}",
                path.display(),
                e
            ))),
        }
    }
}
