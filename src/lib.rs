//! # riasec
//!
//! Holland (RIASEC) interest classification and feed scoring.
//!
//! A versioned [`Snapshot`](snapshot::Snapshot) of questionnaire items is
//! built once from an external provider, each item classified into one of the
//! six interest categories by keyword overlap. Free-text feeds are then scored
//! against that snapshot to produce per-category scores, recommended skills
//! and experience points.
//!
//! ## Modules
//!
//! - [`typebook`] - The six categories with their keywords, descriptions and skills
//! - [`classifier`] - Keyword classification of question texts
//! - [`provider`] - Questionnaire providers (CareerNet HTTP API, files, fixed data)
//! - [`snapshot`] - Snapshot model, builder, storage backends and export/import
//! - [`matching`] - Feed matching and score aggregation
//! - [`cache`] - LRU cache of feed analyses
//! - [`engine`] - Facade owning the snapshot lifecycle
//! - [`cli`] - Command-line interface
//! - [`types`] - Configuration and errors
//!
//! ## Example
//!
//! ```no_run
//! use riasec::{Config, Engine};
//!
//! # async fn run() -> riasec::RiasecResult<()> {
//! let engine = Engine::from_config(&Config::load_or_default())?;
//! let analysis = engine.analyze_feed("오늘 고장난 노트북을 고쳤다").await?;
//! println!("{:?} earned {} XP", analysis.top_category, analysis.total_xp());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod classifier;
#[cfg(feature = "cli")]
pub mod cli;
pub mod engine;
pub mod matching;
pub mod provider;
pub mod snapshot;
pub mod typebook;
pub mod types;

pub use engine::Engine;
pub use types::config::Config;
pub use types::errors::{RiasecError, RiasecResult};
