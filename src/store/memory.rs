use std::collections::HashMap;
use std::sync::Mutex;

use super::KeyValueStore;
use crate::error::{RecommendError, RecommendResult};

/// Process-local store, mostly for tests and one-shot CLI runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> RecommendResult<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| RecommendError::Storage(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> RecommendResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| RecommendError::Storage(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
