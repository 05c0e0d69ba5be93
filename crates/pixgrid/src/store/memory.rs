use crate::store::{KeyValueStore, StorageError, validate_key};
use std::collections::HashMap;
use tracing::trace;

/// Keeps everything in a map; nothing outlives the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, Vec<u8>>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later `save` fail, the way a full or revoked browser store does.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn with_entry(mut self, key: &str, value: impl Into<Vec<u8>>) -> Self {
        self.entries.insert(key.to_string(), value.into());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        validate_key(key)?;
        trace!("Looking up {:?} in memory store", key);
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        validate_key(key)?;
        if self.fail_writes {
            return Err(StorageError::Unavailable(format!(
                "memory store refused write to {key:?}"
            )));
        }
        trace!("Storing {} bytes under {:?} in memory store", value.len(), key);
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}
