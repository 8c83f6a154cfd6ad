//! Integration tests for the engine lifecycle.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use riasec::classifier::Classifier;
use riasec::engine::{Engine, EngineState, RebuildOutcome, SnapshotSource};
use riasec::provider::{ProviderRecord, QuestionProvider, StaticProvider};
use riasec::snapshot::{
    bundled_snapshot, DatabaseBuilder, FileBackend, MemoryBackend, SnapshotStore, StorageBackend,
    DEFAULT_KEY,
};
use riasec::typebook::{Category, KeywordSet, TypeBook};
use riasec::{RiasecError, RiasecResult};

enum Step {
    Records(Duration, Vec<ProviderRecord>),
    Fail(&'static str),
}

/// Provider answering each call with the next scripted step; the last step repeats.
struct ScriptedProvider {
    steps: Vec<Step>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            steps,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuestionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn source(&self) -> &str {
        "scripted"
    }

    fn test_type(&self) -> &str {
        "fixture"
    }

    fn test_number(&self) -> u32 {
        0
    }

    async fn fetch_catalog(&self) -> RiasecResult<Value> {
        Ok(json!({}))
    }

    async fn fetch_questions(&self) -> RiasecResult<Vec<ProviderRecord>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.steps[call.min(self.steps.len() - 1)] {
            Step::Records(delay, records) => {
                if !delay.is_zero() {
                    tokio::time::sleep(*delay).await;
                }
                Ok(records.clone())
            }
            Step::Fail(reason) => Err(RiasecError::provider(*reason)),
        }
    }
}

fn records(pairs: &[(&str, &str)]) -> Vec<ProviderRecord> {
    pairs
        .iter()
        .map(|(id, text)| ProviderRecord::new(*id, *text))
        .collect()
}

fn batch_one() -> Vec<ProviderRecord> {
    records(&[
        ("a1", "고장난 기계를 수리한다"),
        ("a2", "실험 가설을 검증한다"),
    ])
}

fn batch_two() -> Vec<ProviderRecord> {
    records(&[
        ("b1", "회계 장부를 기록한다"),
        ("b2", "팀 프로젝트의 리더를 맡는다"),
        ("b3", "음악을 창작한다"),
    ])
}

fn keyword_set(entries: Vec<(Category, Vec<&str>)>) -> KeywordSet {
    let mut set: KeywordSet = BTreeMap::new();
    for (category, words) in entries {
        set.insert(category, words.into_iter().map(String::from).collect());
    }
    set
}

fn engine_with(
    provider: Arc<dyn QuestionProvider>,
    typebook: TypeBook,
    backend: Box<dyn StorageBackend>,
) -> Engine {
    let builder = DatabaseBuilder::new(provider, Classifier::new(Arc::new(typebook)))
        .with_timeout(Duration::from_secs(30));
    Engine::new(builder, SnapshotStore::new(backend, DEFAULT_KEY))
}

fn standard_engine(provider: Arc<dyn QuestionProvider>) -> Engine {
    engine_with(provider, TypeBook::standard(), Box::new(MemoryBackend::new()))
}

struct FailingWrites;

impl StorageBackend for FailingWrites {
    fn get(&self, _key: &str) -> RiasecResult<Option<String>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> RiasecResult<()> {
        Err(RiasecError::StorageWriteFailed("read-only".to_string()))
    }

    fn describe(&self) -> String {
        "read-only".to_string()
    }
}

mod scenarios {
    use super::*;

    #[tokio::test]
    async fn test_repair_feed_ranks_realistic_first() {
        let typebook = TypeBook::with_keywords(keyword_set(vec![
            (Category::R, vec!["고장", "노트북"]),
            (Category::I, vec!["실험", "가설"]),
            (Category::A, vec!["그림"]),
            (Category::S, vec!["상담"]),
            (Category::E, vec!["영업"]),
            (Category::C, vec!["회계"]),
        ]));
        let provider = Arc::new(StaticProvider::from_pairs([
            ("i1", "실험 가설을 세운다"),
            ("r1", "노트북 고장을 점검한다"),
            ("a1", "그림을 그린다"),
            ("r2", "고장난 노트북을 수리한다"),
            ("c1", "회계 장부를 본다"),
        ]));
        let engine = engine_with(provider, typebook, Box::new(MemoryBackend::new()));

        let analysis = engine.analyze_feed("오늘 고장난 노트북을 고쳤다").await.unwrap();

        assert_eq!(analysis.top_matches.len(), 5);
        assert_eq!(analysis.top_matches[0].question.category, Category::R);
        assert_eq!(analysis.top_matches[1].question.category, Category::R);
        assert_eq!(analysis.top_category, Some(Category::R));
        assert!(analysis.per_category_xp[&Category::R] > 0);
    }

    #[tokio::test]
    async fn test_empty_keyword_list_reduces_to_text_similarity() {
        let typebook = TypeBook::with_keywords(keyword_set(vec![
            (Category::R, vec![]),
            (Category::S, vec!["상담"]),
        ]));
        let provider = Arc::new(StaticProvider::from_pairs([
            ("s1", "청소년을 상담한다"),
            ("x1", "아무 관련 없는 문장"),
        ]));
        let engine = engine_with(provider, typebook, Box::new(MemoryBackend::new()));

        let analysis = engine.analyze_feed("아무 관련 없는 문장").await.unwrap();
        let top = &analysis.top_matches[0];

        assert_eq!(top.question.id, "x1");
        assert_eq!(top.question.category, Category::R);
        assert!(top.question.matched_keywords.is_empty());
        assert!((top.similarity - 0.3).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_empty_provider_reaches_ready_with_bundled() {
        let engine = standard_engine(Arc::new(StaticProvider::new(vec![])));
        engine.initialize().await.unwrap();

        let status = engine.status();
        assert!(status.is_initialized);
        assert_eq!(status.state, EngineState::Ready);
        assert_eq!(status.source, Some(SnapshotSource::Bundled));
        assert_eq!(
            status.total_questions,
            bundled_snapshot().unwrap().total_questions
        );
        assert!(status.last_error.is_some());
    }

    #[tokio::test]
    async fn test_second_rebuild_fully_replaces_first() {
        let provider = ScriptedProvider::new(vec![
            Step::Records(Duration::ZERO, batch_one()),
            Step::Records(Duration::ZERO, batch_two()),
        ]);
        let engine = standard_engine(provider.clone());

        let first = engine.rebuild().await.unwrap();
        let second = engine.rebuild().await.unwrap();
        assert!(first.is_rebuilt());
        assert!(second.is_rebuilt());

        let snapshot = engine.snapshot().unwrap();
        let ids: Vec<_> = snapshot.questions().map(|q| q.id.clone()).collect();
        assert_eq!(snapshot.total_questions, 3);
        assert!(ids.iter().all(|id| id.starts_with('b')));
        assert_eq!(provider.calls(), 2);
    }
}

mod lifecycle {
    use super::*;

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let provider = ScriptedProvider::new(vec![Step::Records(Duration::ZERO, batch_one())]);
        let engine = standard_engine(provider.clone());

        engine.initialize().await.unwrap();
        let version = engine.status().version;
        engine.initialize().await.unwrap();

        assert_eq!(provider.calls(), 1);
        assert_eq!(engine.status().version, version);
    }

    #[tokio::test]
    async fn test_concurrent_initialize_builds_once() {
        let provider = ScriptedProvider::new(vec![Step::Records(
            Duration::from_millis(50),
            batch_one(),
        )]);
        let engine = standard_engine(provider.clone());

        let (a, b, c) = tokio::join!(engine.initialize(), engine.initialize(), engine.initialize());
        assert!(a.is_ok() && b.is_ok() && c.is_ok());

        assert_eq!(provider.calls(), 1);
        assert_eq!(engine.state(), EngineState::Ready);
    }

    #[tokio::test]
    async fn test_stored_snapshot_is_reused() {
        let dir = tempfile::tempdir().unwrap();

        let first = engine_with(
            Arc::new(StaticProvider::from_pairs([("1", "문서를 정리한다")])),
            TypeBook::standard(),
            Box::new(FileBackend::new(dir.path()).unwrap()),
        );
        first.initialize().await.unwrap();
        let built = first.status();
        assert_eq!(built.source, Some(SnapshotSource::Provider));

        let second = engine_with(
            Arc::new(StaticProvider::unavailable("offline")),
            TypeBook::standard(),
            Box::new(FileBackend::new(dir.path()).unwrap()),
        );
        second.initialize().await.unwrap();
        let loaded = second.status();

        assert_eq!(loaded.source, Some(SnapshotSource::Cache));
        assert_eq!(loaded.version, built.version);
        assert_eq!(loaded.total_questions, 1);
    }

    #[tokio::test]
    async fn test_invalid_stored_snapshot_is_rebuilt() {
        let backend = MemoryBackend::new();
        let mut broken = bundled_snapshot().unwrap();
        broken.total_questions += 7;
        backend
            .set(DEFAULT_KEY, &serde_json::to_string(&broken).unwrap())
            .unwrap();

        let engine = engine_with(
            ScriptedProvider::new(vec![Step::Records(Duration::ZERO, batch_one())]),
            TypeBook::standard(),
            Box::new(backend),
        );
        engine.initialize().await.unwrap();

        let status = engine.status();
        assert_eq!(status.source, Some(SnapshotSource::Provider));
        assert_eq!(status.total_questions, 2);
    }

    #[tokio::test]
    async fn test_storage_write_failure_is_not_fatal() {
        let engine = engine_with(
            ScriptedProvider::new(vec![Step::Records(Duration::ZERO, batch_one())]),
            TypeBook::standard(),
            Box::new(FailingWrites),
        );
        engine.initialize().await.unwrap();

        let status = engine.status();
        assert_eq!(status.state, EngineState::Ready);
        assert_eq!(status.source, Some(SnapshotSource::Provider));
        assert_eq!(status.total_questions, 2);
    }

    #[tokio::test]
    async fn test_keyword_change_is_reported_stale() {
        let backend = MemoryBackend::new();
        backend
            .set(
                DEFAULT_KEY,
                &serde_json::to_string(&bundled_snapshot().unwrap()).unwrap(),
            )
            .unwrap();
        let typebook = TypeBook::with_keywords(keyword_set(vec![(Category::R, vec!["수리"])]));

        let engine = engine_with(
            Arc::new(StaticProvider::unavailable("offline")),
            typebook,
            Box::new(backend),
        );
        engine.initialize().await.unwrap();

        let status = engine.status();
        assert_eq!(status.source, Some(SnapshotSource::Cache));
        assert!(status.keywords_stale);
    }

    #[tokio::test]
    async fn test_questions_by_category() {
        let engine = standard_engine(ScriptedProvider::new(vec![Step::Records(
            Duration::ZERO,
            batch_two(),
        )]));

        let conventional = engine.questions_by_category(Category::C).await.unwrap();
        assert_eq!(conventional.len(), 1);
        assert_eq!(conventional[0].id, "b1");
        assert!(engine
            .questions_by_category(Category::S)
            .await
            .unwrap()
            .is_empty());
    }
}

mod rebuild {
    use super::*;

    #[tokio::test]
    async fn test_failed_rebuild_keeps_previous_snapshot() {
        let provider = ScriptedProvider::new(vec![
            Step::Records(Duration::ZERO, batch_one()),
            Step::Fail("upstream down"),
        ]);
        let engine = standard_engine(provider);
        engine.initialize().await.unwrap();
        let before = engine.status().version;

        let outcome = engine.rebuild().await.unwrap();

        match outcome {
            RebuildOutcome::Failed {
                serving_version,
                error,
            } => {
                assert_eq!(Some(serving_version), before);
                assert!(error.contains("upstream down"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        let status = engine.status();
        assert_eq!(status.state, EngineState::Ready);
        assert_eq!(status.source, Some(SnapshotSource::Provider));
        assert!(status.last_error.is_some_and(|e| e.contains("upstream down")));
        assert_eq!(status.version, before);
        assert!(engine.analyze_feed("기계를 수리했다").await.is_ok());
    }

    #[tokio::test]
    async fn test_rebuild_while_rebuilding_is_rejected() {
        let provider = ScriptedProvider::new(vec![Step::Records(
            Duration::from_millis(300),
            batch_one(),
        )]);
        let engine = Arc::new(standard_engine(provider));

        let running = {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { engine.rebuild().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(engine.state(), EngineState::Rebuilding);
        let err = engine.rebuild().await.unwrap_err();
        assert!(matches!(err, RiasecError::RebuildInProgress));

        let outcome = running.await.unwrap().unwrap();
        assert!(outcome.is_rebuilt());
        assert_eq!(engine.state(), EngineState::Ready);
    }

    #[tokio::test]
    async fn test_cancelled_rebuild_leaves_snapshot_untouched() {
        let provider = ScriptedProvider::new(vec![
            Step::Records(Duration::ZERO, batch_one()),
            Step::Records(Duration::from_secs(10), batch_two()),
        ]);
        let engine = standard_engine(provider);
        engine.initialize().await.unwrap();
        let before = engine.status();

        let cancelled = tokio::time::timeout(Duration::from_millis(50), engine.rebuild()).await;
        assert!(cancelled.is_err());

        let after = engine.status();
        assert_eq!(after.state, EngineState::Ready);
        assert_eq!(after.version, before.version);
        assert_eq!(after.total_questions, 2);
    }

    #[tokio::test]
    async fn test_analyses_continue_during_rebuild() {
        let provider = ScriptedProvider::new(vec![
            Step::Records(Duration::ZERO, batch_one()),
            Step::Records(Duration::from_millis(100), batch_two()),
        ]);
        let engine = Arc::new(standard_engine(provider));
        engine.initialize().await.unwrap();
        let first_version = engine.status().version.unwrap();

        let rebuild = {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { engine.rebuild().await })
        };

        let mut analyses = Vec::new();
        for i in 0..20 {
            let engine = Arc::clone(&engine);
            analyses.push(tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(i * 10)).await;
                engine.analyze_feed("기계를 수리하고 장부를 기록했다").await
            }));
        }

        let outcome = rebuild.await.unwrap().unwrap();
        let second_version = match outcome {
            RebuildOutcome::Rebuilt { version, .. } => version,
            other => panic!("unexpected outcome: {:?}", other),
        };

        for handle in analyses {
            let analysis = handle.await.unwrap().unwrap();
            assert!(
                analysis.snapshot_version == first_version
                    || analysis.snapshot_version == second_version
            );
        }
    }
}
