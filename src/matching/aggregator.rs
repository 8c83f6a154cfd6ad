//! Turns ranked matches into scores, recommended skills and XP.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::matcher::MatchResult;
use crate::typebook::{Category, TypeBook};

/// Categories whose skills are recommended.
const SKILL_CATEGORIES: usize = 3;
const MIN_BASE_XP: f64 = 10.0;
const MAX_BASE_XP: f64 = 100.0;

/// Result of analysing one feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedAnalysis {
    pub id: Uuid,
    pub feed_text: String,
    pub top_matches: Vec<MatchResult>,
    /// Sum of weighted scores of the top matches, all six categories present.
    pub per_category_score: BTreeMap<Category, f64>,
    pub total_score: f64,
    pub recommended_skills: Vec<String>,
    pub per_category_xp: BTreeMap<Category, u32>,
    /// Highest-scoring category; `None` when every score is zero.
    pub top_category: Option<Category>,
    pub snapshot_version: String,
    pub analyzed_at: DateTime<Utc>,
}

impl FeedAnalysis {
    pub fn total_xp(&self) -> u32 {
        self.per_category_xp.values().sum()
    }

    /// Same analysis for an equivalent feed, under a fresh id and timestamp.
    pub(crate) fn reissued(&self, feed_text: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            feed_text: feed_text.to_string(),
            analyzed_at: Utc::now(),
            ..self.clone()
        }
    }
}

/// XP earned by one match before the confidence multiplier.
pub fn base_xp(similarity: f64) -> f64 {
    (similarity * 100.0).clamp(MIN_BASE_XP, MAX_BASE_XP).round()
}

/// Aggregates matches using the skill lists of a [`TypeBook`].
#[derive(Debug, Clone)]
pub struct ScoreAggregator {
    typebook: Arc<TypeBook>,
}

impl ScoreAggregator {
    pub fn new(typebook: Arc<TypeBook>) -> Self {
        Self { typebook }
    }

    pub fn aggregate(
        &self,
        feed_text: &str,
        top_matches: Vec<MatchResult>,
        snapshot_version: &str,
    ) -> FeedAnalysis {
        let mut per_category_score: BTreeMap<Category, f64> =
            Category::ALL.iter().map(|c| (*c, 0.0)).collect();
        let mut per_category_xp: BTreeMap<Category, u32> =
            Category::ALL.iter().map(|c| (*c, 0)).collect();

        for m in &top_matches {
            let category = m.question.category;
            *per_category_score.entry(category).or_default() += m.weighted_score;

            // Every top match earns at least the base floor, scaled by confidence.
            let xp = (base_xp(m.similarity) * m.question.confidence).round() as u32;
            *per_category_xp.entry(category).or_default() += xp;
        }

        let total_score = per_category_score.values().sum();
        let ranked = rank_categories(&per_category_score);
        let top_category = ranked.first().copied();
        let recommended_skills = self.recommended_skills(&ranked);

        FeedAnalysis {
            id: Uuid::new_v4(),
            feed_text: feed_text.to_string(),
            top_matches,
            per_category_score,
            total_score,
            recommended_skills,
            per_category_xp,
            top_category,
            snapshot_version: snapshot_version.to_string(),
            analyzed_at: Utc::now(),
        }
    }

    fn recommended_skills(&self, ranked: &[Category]) -> Vec<String> {
        let mut skills: Vec<String> = Vec::new();
        for category in ranked.iter().take(SKILL_CATEGORIES) {
            for skill in self.typebook.skills(*category) {
                if !skills.iter().any(|s| s == skill) {
                    skills.push(skill.to_string());
                }
            }
        }
        skills
    }
}

/// Categories with a positive score, best first; ties keep R..C order.
fn rank_categories(scores: &BTreeMap<Category, f64>) -> Vec<Category> {
    let mut ranked: Vec<(Category, f64)> = scores
        .iter()
        .filter(|(_, score)| **score > 0.0)
        .map(|(c, s)| (*c, *s))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.into_iter().map(|(c, _)| c).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::QuestionItem;

    fn matched(category: Category, similarity: f64, confidence: f64) -> MatchResult {
        MatchResult {
            question: QuestionItem {
                id: format!("{}-{}", category, similarity),
                original_text: "text".to_string(),
                category,
                confidence,
                matched_keywords: vec![],
                group: "일반".to_string(),
                weight: 1.0,
            },
            similarity,
            weighted_score: similarity * confidence,
        }
    }

    fn aggregator() -> ScoreAggregator {
        ScoreAggregator::new(Arc::new(TypeBook::standard()))
    }

    #[test]
    fn test_base_xp_is_clamped() {
        assert_eq!(base_xp(0.01), 10.0);
        assert_eq!(base_xp(0.456), 46.0);
        assert_eq!(base_xp(1.0), 100.0);
        assert_eq!(base_xp(1.5), 100.0);
    }

    #[test]
    fn test_scores_and_xp() {
        let analysis = aggregator().aggregate(
            "feed",
            vec![
                matched(Category::R, 0.5, 0.5),
                matched(Category::R, 0.05, 1.0),
                matched(Category::E, 0.2, 0.5),
                matched(Category::C, 0.0, 0.5),
            ],
            "v1",
        );

        assert!((analysis.per_category_score[&Category::R] - 0.3).abs() < 1e-12);
        assert!((analysis.per_category_score[&Category::E] - 0.1).abs() < 1e-12);
        assert_eq!(analysis.per_category_score[&Category::C], 0.0);
        assert!((analysis.total_score - 0.4).abs() < 1e-12);

        // R: round(50 * 0.5) + round(10 * 1.0); E: round(20 * 0.5); C: floor, round(10 * 0.5).
        assert_eq!(analysis.per_category_xp[&Category::R], 35);
        assert_eq!(analysis.per_category_xp[&Category::E], 10);
        assert_eq!(analysis.per_category_xp[&Category::C], 5);
        assert_eq!(analysis.total_xp(), 50);
        assert_eq!(analysis.top_category, Some(Category::R));
        assert_eq!(analysis.snapshot_version, "v1");
    }

    #[test]
    fn test_recommended_skills_skip_zero_categories() {
        let typebook = TypeBook::standard();
        let analysis = aggregator().aggregate("feed", vec![matched(Category::S, 0.4, 0.5)], "v1");

        let expected: Vec<String> = typebook
            .skills(Category::S)
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(analysis.recommended_skills, expected);
    }

    #[test]
    fn test_recommended_skills_top_three_deduplicated() {
        let analysis = aggregator().aggregate(
            "feed",
            vec![
                matched(Category::I, 0.9, 0.5),
                matched(Category::A, 0.8, 0.5),
                matched(Category::E, 0.7, 0.5),
                matched(Category::C, 0.6, 0.5),
            ],
            "v1",
        );

        let mut seen = std::collections::HashSet::new();
        assert!(analysis.recommended_skills.iter().all(|s| seen.insert(s.clone())));

        let typebook = TypeBook::standard();
        for skill in typebook.skills(Category::C) {
            let elsewhere = [Category::I, Category::A, Category::E]
                .iter()
                .any(|c| typebook.skills(*c).contains(skill));
            assert_eq!(analysis.recommended_skills.contains(&skill.to_string()), elsewhere);
        }
    }

    #[test]
    fn test_no_matches_is_all_zero() {
        let analysis = aggregator().aggregate("", vec![], "v1");

        assert_eq!(analysis.per_category_score.len(), 6);
        assert_eq!(analysis.total_score, 0.0);
        assert_eq!(analysis.total_xp(), 0);
        assert!(analysis.recommended_skills.is_empty());
        assert_eq!(analysis.top_category, None);
    }
}
