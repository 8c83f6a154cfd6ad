//! LRU cache of feed analyses.
//!
//! Repeated feeds against the same snapshot are answered without rescoring.

mod lru;

pub use lru::{AnalysisCache, CacheStats};
