pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::sync::Arc;

use crate::{error::RecommendResult, models::GenderAffinity};

/// Key under which the selected gender affinity is persisted
pub const GENDER_AFFINITY_KEY: &str = "scently_selected_sex";

/// Minimal string key-value persistence
pub trait KeyValueStore: Send + Sync {
    fn read(&self, key: &str) -> RecommendResult<Option<String>>;

    fn write(&self, key: &str, value: &str) -> RecommendResult<()>;
}

/// Persisted gender affinity preference
///
/// Reads are validated: a missing, unreadable or unrecognized stored value
/// yields the caller's default instead of an error.
#[derive(Clone)]
pub struct GenderPreference {
    store: Arc<dyn KeyValueStore>,
}

impl GenderPreference {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn get(&self, default: GenderAffinity) -> GenderAffinity {
        let stored = match self.store.read(GENDER_AFFINITY_KEY) {
            Ok(Some(value)) => value,
            Ok(None) => return default,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored gender affinity");
                return default;
            }
        };

        match stored.parse() {
            Ok(affinity) => affinity,
            Err(e) => {
                tracing::warn!(error = %e, fallback = %default, "Ignoring corrupt stored preference");
                default
            }
        }
    }

    /// Same as [`get`](Self::get), with the store read moved off the async workers
    pub async fn load(&self, default: GenderAffinity) -> GenderAffinity {
        let preference = self.clone();
        match tokio::task::spawn_blocking(move || preference.get(default)).await {
            Ok(affinity) => affinity,
            Err(e) => {
                tracing::warn!(error = %e, "Preference read task failed");
                default
            }
        }
    }

    pub fn set(&self, value: GenderAffinity) -> RecommendResult<()> {
        self.store.write(GENDER_AFFINITY_KEY, value.as_str())?;
        tracing::debug!(gender_affinity = %value, "Stored gender affinity");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecommendError;

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn read(&self, _key: &str) -> RecommendResult<Option<String>> {
            Err(RecommendError::Storage("disk on fire".to_string()))
        }

        fn write(&self, _key: &str, _value: &str) -> RecommendResult<()> {
            Err(RecommendError::Storage("disk on fire".to_string()))
        }
    }

    #[test]
    fn test_get_falls_back_when_absent() {
        let preference = GenderPreference::in_memory();
        assert_eq!(preference.get(GenderAffinity::Unisex), GenderAffinity::Unisex);
        assert_eq!(preference.get(GenderAffinity::Male), GenderAffinity::Male);
    }

    #[test]
    fn test_set_then_get() {
        let preference = GenderPreference::in_memory();
        preference.set(GenderAffinity::Female).unwrap();
        assert_eq!(preference.get(GenderAffinity::Unisex), GenderAffinity::Female);
    }

    #[test]
    fn test_corrupt_value_falls_back() {
        let store = Arc::new(MemoryStore::new());
        store.write(GENDER_AFFINITY_KEY, "Мужской").unwrap();
        let preference = GenderPreference::new(store);
        assert_eq!(preference.get(GenderAffinity::Unisex), GenderAffinity::Unisex);
    }

    #[test]
    fn test_read_failure_falls_back_and_write_failure_propagates() {
        let preference = GenderPreference::new(Arc::new(BrokenStore));
        assert_eq!(preference.get(GenderAffinity::Male), GenderAffinity::Male);
        assert!(matches!(
            preference.set(GenderAffinity::Male),
            Err(RecommendError::Storage(_))
        ));
    }

    #[tokio::test]
    async fn test_load_reads_off_the_runtime() {
        let preference = GenderPreference::in_memory();
        assert_eq!(preference.load(GenderAffinity::Unisex).await, GenderAffinity::Unisex);

        preference.set(GenderAffinity::Male).unwrap();
        assert_eq!(preference.load(GenderAffinity::Unisex).await, GenderAffinity::Male);

        let broken = GenderPreference::new(Arc::new(BrokenStore));
        assert_eq!(broken.load(GenderAffinity::Female).await, GenderAffinity::Female);
    }
}
