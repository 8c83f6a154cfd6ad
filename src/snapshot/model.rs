//! Snapshot document types.
//!
//! Field names follow the persisted JSON document
//! (`version`, `lastUpdated`, `totalQuestions`, `hollandDatabase`, `metadata`).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::classifier::Classification;
use crate::provider::{ProviderRecord, DEFAULT_GROUP};
use crate::typebook::{Category, KeywordSet};

/// A classified reference question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionItem {
    pub id: String,
    pub original_text: String,
    /// Assigned category.
    #[serde(rename = "type")]
    pub category: Category,
    /// Classification strength in `[0, 1]`.
    pub confidence: f64,
    pub matched_keywords: Vec<String>,
    /// Provider-side grouping label.
    #[serde(rename = "category", default = "default_group")]
    pub group: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_group() -> String {
    DEFAULT_GROUP.to_string()
}

fn default_weight() -> f64 {
    1.0
}

impl QuestionItem {
    /// Builds an item from a provider record and its classification.
    pub fn classified(record: ProviderRecord, classification: Classification) -> Self {
        Self {
            id: record.id,
            original_text: record.text,
            category: classification.category,
            confidence: classification.confidence,
            matched_keywords: classification.matched_keywords,
            group: record.group,
            weight: default_weight(),
        }
    }
}

/// Where a snapshot came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    pub source: String,
    pub test_type: String,
    pub test_number: u32,
    /// Keyword set the questions were classified with.
    #[serde(default)]
    pub keywords: KeywordSet,
    #[serde(default)]
    pub keyword_fingerprint: Option<String>,
}

/// Immutable, versioned bundle of classified questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: String,
    #[serde(rename = "lastUpdated")]
    pub built_at: DateTime<Utc>,
    pub total_questions: usize,
    #[serde(rename = "hollandDatabase")]
    pub per_category: BTreeMap<Category, Vec<QuestionItem>>,
    pub metadata: Provenance,
}

impl Snapshot {
    /// Assembles a snapshot from grouped questions, filling every category
    /// and deriving `total_questions`.
    pub fn assemble(
        version: impl Into<String>,
        built_at: DateTime<Utc>,
        mut per_category: BTreeMap<Category, Vec<QuestionItem>>,
        metadata: Provenance,
    ) -> Self {
        for category in Category::ALL {
            per_category.entry(category).or_default();
        }
        let total_questions = per_category.values().map(Vec::len).sum();

        Self {
            version: version.into(),
            built_at,
            total_questions,
            per_category,
            metadata,
        }
    }

    /// Version string derived from the build timestamp plus a short digest
    /// of the grouped questions, e.g. `20250301093015042-1f0c9a7e`.
    pub fn derive_version(
        built_at: DateTime<Utc>,
        per_category: &BTreeMap<Category, Vec<QuestionItem>>,
    ) -> String {
        let mut hasher = Sha256::new();
        for (category, items) in per_category {
            for item in items {
                hasher.update(category.code().as_bytes());
                hasher.update(item.id.as_bytes());
                hasher.update([0u8]);
                hasher.update(item.original_text.as_bytes());
                hasher.update([0u8]);
            }
        }
        let digest = hex::encode(hasher.finalize());

        format!("{}-{}", built_at.format("%Y%m%d%H%M%S%3f"), &digest[..8])
    }

    /// All questions in build order (category order, then provider order).
    pub fn questions(&self) -> impl Iterator<Item = &QuestionItem> {
        self.per_category.values().flatten()
    }

    /// Questions of one category.
    pub fn questions_in(&self, category: Category) -> &[QuestionItem] {
        self.per_category
            .get(&category)
            .map(|q| q.as_slice())
            .unwrap_or(&[])
    }

    /// Number of questions per category, all six present.
    pub fn category_counts(&self) -> BTreeMap<Category, usize> {
        Category::ALL
            .iter()
            .map(|c| (*c, self.questions_in(*c).len()))
            .collect()
    }

    /// Whether the snapshot was classified with a different keyword set.
    ///
    /// Snapshots without a recorded fingerprint are never reported stale.
    pub fn is_stale_for(&self, fingerprint: &str) -> bool {
        self.metadata
            .keyword_fingerprint
            .as_deref()
            .is_some_and(|recorded| recorded != fingerprint)
    }
}
