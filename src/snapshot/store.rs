//! Loading, saving and validating the persisted snapshot.

use super::backends::StorageBackend;
use super::model::Snapshot;
use crate::typebook::Category;
use crate::{RiasecError, RiasecResult};

/// Default storage key of the snapshot document.
pub const DEFAULT_KEY: &str = "hollandDatabase";

/// Persists one snapshot document under a fixed key.
pub struct SnapshotStore {
    backend: Box<dyn StorageBackend>,
    key: String,
}

impl SnapshotStore {
    pub fn new(backend: Box<dyn StorageBackend>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn describe(&self) -> String {
        self.backend.describe()
    }

    /// Reads the stored snapshot.
    ///
    /// Missing, unreadable and unparsable documents all come back as `None`.
    /// The caller still has to [`validate`](Self::validate) the result.
    pub fn load(&self) -> Option<Snapshot> {
        let raw = match self.backend.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(key = %self.key, "No stored snapshot");
                return None;
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to read stored snapshot");
                return None;
            }
        };

        match serde_json::from_str::<Snapshot>(&raw) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Stored snapshot is corrupt");
                None
            }
        }
    }

    /// Writes the snapshot, replacing any previous one.
    ///
    /// # Errors
    ///
    /// `StorageWriteFailed` when serialization or the backend write fails.
    pub fn save(&self, snapshot: &Snapshot) -> RiasecResult<()> {
        let json = serde_json::to_string(snapshot)
            .map_err(|e| RiasecError::StorageWriteFailed(e.to_string()))?;

        self.backend.set(&self.key, &json).map_err(|e| match e {
            RiasecError::StorageWriteFailed(_) => e,
            other => RiasecError::StorageWriteFailed(other.to_string()),
        })?;

        tracing::debug!(
            key = %self.key,
            version = %snapshot.version,
            backend = %self.backend.describe(),
            "Snapshot saved"
        );
        Ok(())
    }

    /// Whether the snapshot can be trusted.
    pub fn validate(snapshot: &Snapshot) -> bool {
        Self::check(snapshot).is_ok()
    }

    /// Like [`validate`](Self::validate), reporting the first problem found.
    pub fn check(snapshot: &Snapshot) -> RiasecResult<()> {
        if snapshot.version.trim().is_empty() {
            return Err(RiasecError::ValidationFailed("missing version".to_string()));
        }

        let missing: Vec<&str> = Category::ALL
            .iter()
            .filter(|c| !snapshot.per_category.contains_key(c))
            .map(|c| c.code())
            .collect();
        if !missing.is_empty() {
            return Err(RiasecError::ValidationFailed(format!(
                "missing categories: {}",
                missing.join(", ")
            )));
        }

        let sum: usize = snapshot.per_category.values().map(Vec::len).sum();
        if sum != snapshot.total_questions {
            return Err(RiasecError::ValidationFailed(format!(
                "totalQuestions is {} but categories hold {}",
                snapshot.total_questions, sum
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::backends::MemoryBackend;
    use crate::snapshot::bundled_snapshot;

    struct FailingBackend;

    impl StorageBackend for FailingBackend {
        fn get(&self, _key: &str) -> RiasecResult<Option<String>> {
            Err(RiasecError::other("disk gone"))
        }

        fn set(&self, _key: &str, _value: &str) -> RiasecResult<()> {
            Err(RiasecError::other("disk full"))
        }

        fn describe(&self) -> String {
            "failing".to_string()
        }
    }

    fn memory_store() -> SnapshotStore {
        SnapshotStore::new(Box::new(MemoryBackend::new()), DEFAULT_KEY)
    }

    #[test]
    fn test_load_missing_is_none() {
        assert!(memory_store().load().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let store = memory_store();
        let snapshot = bundled_snapshot().unwrap();

        store.save(&snapshot).unwrap();
        assert_eq!(store.load(), Some(snapshot));
    }

    #[test]
    fn test_corrupt_document_is_none() {
        let backend = MemoryBackend::new();
        backend.set(DEFAULT_KEY, "{not json").unwrap();
        let store = SnapshotStore::new(Box::new(backend), DEFAULT_KEY);

        assert!(store.load().is_none());
    }

    #[test]
    fn test_backend_errors() {
        let store = SnapshotStore::new(Box::new(FailingBackend), DEFAULT_KEY);
        assert!(store.load().is_none());

        let err = store.save(&bundled_snapshot().unwrap()).unwrap_err();
        assert!(matches!(err, RiasecError::StorageWriteFailed(_)));
    }

    #[test]
    fn test_validate_count_mismatch() {
        let mut snapshot = bundled_snapshot().unwrap();
        assert!(SnapshotStore::validate(&snapshot));

        snapshot.total_questions += 1;
        assert!(!SnapshotStore::validate(&snapshot));
    }

    #[test]
    fn test_validate_missing_category() {
        let mut snapshot = bundled_snapshot().unwrap();
        let removed = snapshot.per_category.remove(&Category::A).unwrap_or_default();
        snapshot.total_questions -= removed.len();

        let err = SnapshotStore::check(&snapshot).unwrap_err();
        assert!(err.to_string().contains('A'));
    }

    #[test]
    fn test_validate_missing_version() {
        let mut snapshot = bundled_snapshot().unwrap();
        snapshot.version = String::new();
        assert!(!SnapshotStore::validate(&snapshot));
    }
}
