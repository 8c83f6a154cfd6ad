//! Builds fresh snapshots from a questionnaire provider.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use super::model::{Provenance, QuestionItem, Snapshot};
use crate::classifier::Classifier;
use crate::provider::{ProviderRecord, QuestionProvider};
use crate::typebook::Category;
use crate::{RiasecError, RiasecResult};

/// Builder of classified snapshots.
///
/// Does not persist anything; the engine decides what to store.
pub struct DatabaseBuilder {
    provider: Arc<dyn QuestionProvider>,
    classifier: Classifier,
    timeout: Duration,
}

impl DatabaseBuilder {
    /// Creates a builder.
    pub fn new(provider: Arc<dyn QuestionProvider>, classifier: Classifier) -> Self {
        Self {
            provider,
            classifier,
            timeout: Duration::from_secs(30),
        }
    }

    /// Bounds the whole provider fetch.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The classifier in use.
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// The provider in use.
    pub fn provider(&self) -> &Arc<dyn QuestionProvider> {
        &self.provider
    }

    /// Fetches, classifies and assembles a new snapshot.
    ///
    /// # Errors
    ///
    /// - `ProviderUnavailable` when the provider fails or exceeds the timeout
    /// - `EmptyResultSet` when the provider succeeds with zero records
    pub async fn build(&self) -> RiasecResult<Snapshot> {
        tracing::info!(provider = self.provider.name(), "Building snapshot");

        let records = match tokio::time::timeout(self.timeout, self.provider.fetch_questions()).await
        {
            Ok(Ok(records)) => records,
            Ok(Err(e @ RiasecError::ProviderUnavailable(_))) => return Err(e),
            Ok(Err(e)) => return Err(RiasecError::provider(e.to_string())),
            Err(_) => {
                return Err(RiasecError::provider(format!(
                    "{} did not answer within {}s",
                    self.provider.name(),
                    self.timeout.as_secs()
                )))
            }
        };

        self.assemble(records)
    }

    /// Classifies records and groups them by category, keeping provider
    /// order inside each group.
    pub fn assemble(&self, records: Vec<ProviderRecord>) -> RiasecResult<Snapshot> {
        if records.is_empty() {
            return Err(RiasecError::EmptyResultSet);
        }

        let mut grouped: BTreeMap<Category, Vec<QuestionItem>> = BTreeMap::new();
        for record in records {
            let classification = self.classifier.classify(&record.text);
            grouped
                .entry(classification.category)
                .or_default()
                .push(QuestionItem::classified(record, classification));
        }

        let typebook = self.classifier.typebook();
        let metadata = Provenance {
            source: self.provider.source().to_string(),
            test_type: self.provider.test_type().to_string(),
            test_number: self.provider.test_number(),
            keywords: typebook.keyword_set().clone(),
            keyword_fingerprint: Some(typebook.fingerprint()),
        };

        let built_at = Utc::now();
        let version = Snapshot::derive_version(built_at, &grouped);
        let snapshot = Snapshot::assemble(version, built_at, grouped, metadata);

        for (category, count) in snapshot.category_counts() {
            tracing::debug!(
                category = %category,
                description = typebook.profile(category).description,
                count,
                "Classified questions"
            );
        }
        tracing::info!(
            version = %snapshot.version,
            total_questions = snapshot.total_questions,
            "Snapshot built"
        );

        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::StaticProvider;

    fn builder(provider: StaticProvider) -> DatabaseBuilder {
        DatabaseBuilder::new(Arc::new(provider), Classifier::standard())
    }

    #[tokio::test]
    async fn test_build_groups_by_category_in_provider_order() {
        let provider = StaticProvider::from_pairs([
            ("1", "공구와 장비를 사용해 물건을 제작한다"),
            ("2", "과학 실험을 설계하고 가설을 검증한다"),
            ("3", "고장난 기계나 전기 제품을 직접 수리한다"),
        ]);

        let snapshot = builder(provider).build().await.unwrap();

        assert_eq!(snapshot.total_questions, 3);
        let r_ids: Vec<_> = snapshot
            .questions_in(Category::R)
            .iter()
            .map(|q| q.id.as_str())
            .collect();
        assert_eq!(r_ids, vec!["1", "3"]);
        assert_eq!(snapshot.questions_in(Category::I)[0].id, "2");
        assert_eq!(snapshot.metadata.source, "static");
        assert!(snapshot.metadata.keyword_fingerprint.is_some());
    }

    #[tokio::test]
    async fn test_empty_provider_is_empty_result_set() {
        let err = builder(StaticProvider::new(vec![])).build().await.unwrap_err();
        assert!(matches!(err, RiasecError::EmptyResultSet));
    }

    #[tokio::test]
    async fn test_provider_failure_is_unavailable() {
        let err = builder(StaticProvider::unavailable("offline"))
            .build()
            .await
            .unwrap_err();
        assert!(matches!(err, RiasecError::ProviderUnavailable(_)));
    }

    #[tokio::test]
    async fn test_stalled_provider_fails_fast() {
        let provider = StaticProvider::from_pairs([("1", "수리")]).with_delay(Duration::from_secs(10));
        let err = builder(provider)
            .with_timeout(Duration::from_millis(50))
            .build()
            .await
            .unwrap_err();

        assert!(matches!(err, RiasecError::ProviderUnavailable(_)));
    }

    #[test]
    fn test_items_carry_classification() {
        let provider = StaticProvider::new(vec![]);
        let snapshot = builder(provider)
            .assemble(vec![ProviderRecord::new("9", "문서와 자료를 체계적으로 정리한다")])
            .unwrap();

        let item = &snapshot.questions_in(Category::C)[0];
        assert_eq!(item.weight, 1.0);
        assert!(item.confidence > 0.0);
        assert!(item.matched_keywords.contains(&"정리".to_string()));
    }
}
