//! Lifecycle states and the read-only status view.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::CacheStats;
use crate::typebook::Category;

/// Engine lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    Uninitialized,
    Initializing,
    Ready,
    Rebuilding,
    /// A rebuild failed; the previous (or bundled) snapshot is still served.
    Degraded,
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EngineState::Uninitialized => "uninitialized",
            EngineState::Initializing => "initializing",
            EngineState::Ready => "ready",
            EngineState::Rebuilding => "rebuilding",
            EngineState::Degraded => "degraded",
        };
        f.write_str(s)
    }
}

/// Where the active snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotSource {
    /// Loaded from storage.
    Cache,
    /// Freshly built from the provider.
    Provider,
    /// The default snapshot shipped with the binary.
    Bundled,
    /// Imported from a file.
    Imported,
}

impl std::fmt::Display for SnapshotSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SnapshotSource::Cache => "cache",
            SnapshotSource::Provider => "provider",
            SnapshotSource::Bundled => "bundled",
            SnapshotSource::Imported => "imported",
        };
        f.write_str(s)
    }
}

/// Point-in-time view of the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStatus {
    pub is_initialized: bool,
    pub state: EngineState,
    pub total_questions: usize,
    pub per_category_counts: BTreeMap<Category, usize>,
    pub last_updated: Option<DateTime<Utc>>,
    pub version: Option<String>,
    pub source: Option<SnapshotSource>,
    pub last_error: Option<String>,
    /// The active snapshot was classified with a different keyword set.
    pub keywords_stale: bool,
    pub storage: String,
    pub cache: Option<CacheStats>,
}

/// What a rebuild ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebuildOutcome {
    /// A new snapshot replaced the previous one.
    Rebuilt {
        version: String,
        total_questions: usize,
    },
    /// The build failed; `serving_version` stays active.
    Failed {
        serving_version: String,
        error: String,
    },
}

impl RebuildOutcome {
    pub fn is_rebuilt(&self) -> bool {
        matches!(self, RebuildOutcome::Rebuilt { .. })
    }
}
