//! Keyword classifier for questionnaire items.
//!
//! Assigns a raw question to the category whose keyword list it covers best.
//! `confidence = |matched| / |keywords|`; ties and the all-zero case go to the
//! first category in enumeration order (R, I, A, S, E, C).

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::typebook::{Category, TypeBook};

/// Result of classifying one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub category: Category,
    /// Share of the category's keywords found in the text, in `[0, 1]`.
    pub confidence: f64,
    /// Matched keywords, in keyword-list order.
    pub matched_keywords: Vec<String>,
}

/// Pure, deterministic keyword classifier.
#[derive(Debug, Clone)]
pub struct Classifier {
    typebook: Arc<TypeBook>,
}

impl Classifier {
    /// Creates a classifier over a registry.
    pub fn new(typebook: Arc<TypeBook>) -> Self {
        Self { typebook }
    }

    /// Classifier over the standard registry.
    pub fn standard() -> Self {
        Self::new(Arc::new(TypeBook::standard()))
    }

    /// The registry in use.
    pub fn typebook(&self) -> &Arc<TypeBook> {
        &self.typebook
    }

    /// Classifies a question.
    pub fn classify(&self, question: &str) -> Classification {
        let text = question.to_lowercase();

        let mut best = Classification {
            category: Category::ALL[0],
            confidence: 0.0,
            matched_keywords: Vec::new(),
        };

        for category in Category::ALL {
            let (confidence, matched) = self.score_category(&text, category);

            // Strictly greater: earlier categories win ties.
            if confidence > best.confidence {
                best = Classification {
                    category,
                    confidence,
                    matched_keywords: matched,
                };
            }
        }

        best
    }

    /// Confidence and matched keywords of one category against lower-cased text.
    ///
    /// Keywords are compared as written, so a keyword with upper-case letters
    /// never matches.
    pub fn score_category(&self, lowered_text: &str, category: Category) -> (f64, Vec<String>) {
        let keywords = self.typebook.keywords(category);
        if keywords.is_empty() {
            return (0.0, Vec::new());
        }

        let matched: Vec<String> = keywords
            .iter()
            .filter(|k| lowered_text.contains(k.as_str()))
            .cloned()
            .collect();

        (matched.len() as f64 / keywords.len() as f64, matched)
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::standard()
    }
}
