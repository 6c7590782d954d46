use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::KeyValueStore;
use crate::error::{RecommendError, RecommendResult};

/// Preferences kept as one JSON object of string values on disk
///
/// A missing file reads as empty. Every write rewrites the whole file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> RecommendResult<Map<String, Value>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(RecommendError::Storage(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(entries)) => Ok(entries),
            Ok(_) => Err(RecommendError::Storage(format!(
                "{} does not contain a JSON object",
                self.path.display()
            ))),
            Err(e) => Err(RecommendError::Storage(format!(
                "Failed to parse {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> RecommendResult<Option<String>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|e| RecommendError::Storage(e.to_string()))?;
        let entries = self.load()?;
        // Non-string values are left for the caller's validation to reject
        Ok(entries.get(key).map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }))
    }

    fn write(&self, key: &str, value: &str) -> RecommendResult<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|e| RecommendError::Storage(e.to_string()))?;
        // A corrupt file is replaced rather than blocking every future write
        let mut entries = self.load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Discarding unreadable preferences file");
            Map::new()
        });
        entries.insert(key.to_string(), Value::String(value.to_string()));

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                RecommendError::Storage(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let json = serde_json::to_string_pretty(&Value::Object(entries))
            .map_err(|e| RecommendError::Storage(format!("Serialization error: {}", e)))?;
        fs::write(&self.path, json).map_err(|e| {
            RecommendError::Storage(format!("Failed to write {}: {}", self.path.display(), e))
        })?;

        tracing::debug!(path = %self.path.display(), key = %key, "Persisted preference");
        Ok(())
    }
}
