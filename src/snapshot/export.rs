//! Export/import of snapshots as standalone JSON files.
//!
//! Lets a snapshot built on one machine be shipped to another, or pinned
//! as the bundled default.

use std::path::Path;

use super::model::Snapshot;
use super::store::SnapshotStore;
use crate::{RiasecError, RiasecResult};

/// Writes `snapshot` to `path` as pretty JSON.
pub fn export_snapshot(snapshot: &Snapshot, path: &Path) -> RiasecResult<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(path, json)?;

    tracing::info!(
        path = %path.display(),
        version = %snapshot.version,
        total_questions = snapshot.total_questions,
        "Snapshot exported"
    );

    Ok(())
}

/// Reads a snapshot from `path`.
///
/// # Errors
///
/// `ValidationFailed` if the file is not a valid snapshot document.
pub fn import_snapshot(path: &Path) -> RiasecResult<Snapshot> {
    let json = std::fs::read_to_string(path)?;
    let snapshot: Snapshot = serde_json::from_str(&json)
        .map_err(|e| RiasecError::ValidationFailed(format!("{}: {}", path.display(), e)))?;

    SnapshotStore::check(&snapshot)?;

    tracing::info!(
        path = %path.display(),
        version = %snapshot.version,
        "Snapshot imported"
    );

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::bundled_snapshot;
    use tempfile::tempdir;

    #[test]
    fn test_export_import() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        let snapshot = bundled_snapshot().unwrap();

        export_snapshot(&snapshot, &path).unwrap();
        let imported = import_snapshot(&path).unwrap();

        assert_eq!(imported, snapshot);
    }

    #[test]
    fn test_import_rejects_inconsistent_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        let mut snapshot = bundled_snapshot().unwrap();
        snapshot.total_questions = 999;
        std::fs::write(&path, serde_json::to_string(&snapshot).unwrap()).unwrap();

        let err = import_snapshot(&path).unwrap_err();
        assert!(matches!(err, RiasecError::ValidationFailed(_)));
    }

    #[test]
    fn test_import_rejects_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        assert!(matches!(
            import_snapshot(&path),
            Err(RiasecError::ValidationFailed(_))
        ));
    }
}
