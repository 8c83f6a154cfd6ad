//! Engine facade.
//!
//! The [`Engine`] is an explicitly constructed service: create one per
//! configuration and share it (typically behind an `Arc`) with whatever
//! needs to analyse feeds.

mod facade;
mod status;

pub use facade::Engine;
pub use status::{EngineState, EngineStatus, RebuildOutcome, SnapshotSource};
