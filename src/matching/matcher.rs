//! Scores a feed against every question of a snapshot.

use serde::{Deserialize, Serialize};

use super::text::{jaccard, normalize, token_set};
use crate::snapshot::{QuestionItem, Snapshot};

/// Number of matches kept per analysis.
pub const TOP_K: usize = 5;

const KEYWORD_WEIGHT: f64 = 0.7;
const TEXT_WEIGHT: f64 = 0.3;

/// One scored question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub question: QuestionItem,
    /// Raw similarity in `[0, 1]`.
    pub similarity: f64,
    /// `similarity * confidence * weight`.
    pub weighted_score: f64,
}

/// Stateless matcher; safe to share across threads.
#[derive(Debug, Clone, Copy)]
pub struct Matcher {
    top_k: usize,
}

impl Default for Matcher {
    fn default() -> Self {
        Self { top_k: TOP_K }
    }
}

impl Matcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scores `feed` against all questions and returns the best
    /// `min(top_k, total)` of them, highest similarity first.
    ///
    /// A feed that normalises to nothing yields no matches.
    pub fn top_matches(&self, feed: &str, snapshot: &Snapshot) -> Vec<MatchResult> {
        let normalized = normalize(feed);
        if normalized.is_empty() {
            return Vec::new();
        }
        let feed_tokens = token_set(&normalized);

        let mut scored: Vec<MatchResult> = snapshot
            .questions()
            .map(|question| {
                let question_text = normalize(&question.original_text);
                let text_score = jaccard(&feed_tokens, &token_set(&question_text));
                let similarity = KEYWORD_WEIGHT * keyword_score(&normalized, question)
                    + TEXT_WEIGHT * text_score;

                MatchResult {
                    question: question.clone(),
                    similarity,
                    weighted_score: similarity * question.confidence * question.weight,
                }
            })
            .collect();

        // sort_by is stable: equal similarities keep build order.
        scored.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        scored.truncate(self.top_k);
        scored
    }
}

/// Fraction of the question's matched keywords present in the normalised feed.
pub fn keyword_score(normalized_feed: &str, question: &QuestionItem) -> f64 {
    if question.matched_keywords.is_empty() {
        return 0.0;
    }
    let hits = question
        .matched_keywords
        .iter()
        .filter(|kw| normalized_feed.contains(kw.as_str()))
        .count();
    hits as f64 / question.matched_keywords.len() as f64
}
