//! Default snapshot shipped inside the binary.

use super::model::Snapshot;
use super::store::SnapshotStore;
use crate::RiasecResult;

const BUNDLED_JSON: &str = include_str!("../../data/default_snapshot.json");

/// Parses and validates the bundled default snapshot.
pub fn bundled_snapshot() -> RiasecResult<Snapshot> {
    let snapshot: Snapshot = serde_json::from_str(BUNDLED_JSON)?;
    SnapshotStore::check(&snapshot)?;
    Ok(snapshot)
}
