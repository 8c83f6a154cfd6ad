//! Feed scoring: text normalisation, per-question matching and aggregation.

mod aggregator;
mod matcher;
mod text;

pub use aggregator::{base_xp, FeedAnalysis, ScoreAggregator};
pub use matcher::{keyword_score, MatchResult, Matcher, TOP_K};
pub use text::{jaccard, normalize, token_set};
