//! The engine facade: lifecycle, fallback policy and feed analysis.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use super::status::{EngineState, EngineStatus, RebuildOutcome, SnapshotSource};
use crate::cache::AnalysisCache;
use crate::classifier::Classifier;
use crate::matching::{FeedAnalysis, Matcher, ScoreAggregator};
use crate::provider::{CareerNetProvider, QuestionProvider};
use crate::snapshot::{
    bundled_snapshot, import_snapshot, open_backend, DatabaseBuilder, QuestionItem, Snapshot,
    SnapshotStore,
};
use crate::typebook::Category;
use crate::types::config::Config;
use crate::{RiasecError, RiasecResult};

struct Inner {
    state: EngineState,
    active: Option<Arc<Snapshot>>,
    source: Option<SnapshotSource>,
    last_error: Option<String>,
}

/// Puts the previous state back if a transition is abandoned midway,
/// e.g. when the future driving it is dropped.
struct TransitionGuard<'a> {
    inner: &'a RwLock<Inner>,
    previous: EngineState,
    armed: bool,
}

impl<'a> TransitionGuard<'a> {
    fn enter(inner: &'a RwLock<Inner>, next: EngineState) -> Self {
        let mut guard = inner.write().unwrap_or_else(PoisonError::into_inner);
        let previous = guard.state;
        guard.state = next;
        Self {
            inner,
            previous,
            armed: true,
        }
    }

    fn complete(mut self) {
        self.armed = false;
    }
}

impl Drop for TransitionGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            guard.state = self.previous;
            tracing::warn!(state = %self.previous, "Snapshot transition abandoned");
        }
    }
}

/// Owns the active snapshot and answers feed analyses against it.
///
/// Analyses take a reference to the snapshot that is active when they start
/// and never block on a rebuild. Builds are serialized: only one
/// initialization or rebuild runs at a time.
pub struct Engine {
    builder: DatabaseBuilder,
    store: SnapshotStore,
    matcher: Matcher,
    aggregator: ScoreAggregator,
    fingerprint: String,
    inner: RwLock<Inner>,
    build_lock: tokio::sync::Mutex<()>,
    cache: Option<Mutex<AnalysisCache>>,
}

impl Engine {
    pub fn new(builder: DatabaseBuilder, store: SnapshotStore) -> Self {
        let typebook = Arc::clone(builder.classifier().typebook());
        Self {
            fingerprint: typebook.fingerprint(),
            aggregator: ScoreAggregator::new(typebook),
            matcher: Matcher::new(),
            builder,
            store,
            inner: RwLock::new(Inner {
                state: EngineState::Uninitialized,
                active: None,
                source: None,
                last_error: None,
            }),
            build_lock: tokio::sync::Mutex::new(()),
            cache: None,
        }
    }

    /// Enables the analysis cache.
    #[must_use]
    pub fn with_cache(mut self, cache: AnalysisCache) -> Self {
        self.cache = Some(Mutex::new(cache));
        self
    }

    /// Composes an engine from configuration using the CareerNet provider.
    pub fn from_config(config: &Config) -> RiasecResult<Self> {
        let provider = CareerNetProvider::from_config(&config.provider);
        Self::from_config_with_provider(config, Arc::new(provider))
    }

    /// Composes an engine from configuration with an explicit provider.
    pub fn from_config_with_provider(
        config: &Config,
        provider: Arc<dyn QuestionProvider>,
    ) -> RiasecResult<Self> {
        let backend = open_backend(&config.storage)?;
        let store = SnapshotStore::new(backend, config.storage.key.clone());
        // Catalog plus questionnaire request, each bounded by the provider timeout.
        let builder = DatabaseBuilder::new(provider, Classifier::standard())
            .with_timeout(config.provider.timeout() * 2);

        let engine = Self::new(builder, store);
        Ok(match AnalysisCache::from_config(&config.cache) {
            Some(cache) => engine.with_cache(cache),
            None => engine,
        })
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn install(
        &self,
        snapshot: Arc<Snapshot>,
        source: SnapshotSource,
        state: EngineState,
        last_error: Option<String>,
    ) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.active = Some(snapshot);
        inner.source = Some(source);
        inner.state = state;
        inner.last_error = last_error;
    }

    /// The snapshot analyses currently run against.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.read().active.clone()
    }

    pub fn state(&self) -> EngineState {
        self.read().state
    }

    /// Makes a snapshot available: stored, freshly built, or bundled, in
    /// that order of preference.
    ///
    /// Calling it again once a snapshot is active does nothing. Provider
    /// and validation failures are not errors here; they end in the bundled
    /// snapshot and show up in [`status`](Self::status).
    pub async fn initialize(&self) -> RiasecResult<()> {
        if self.snapshot().is_some() {
            return Ok(());
        }

        let _build = self.build_lock.lock().await;
        if self.snapshot().is_some() {
            return Ok(());
        }

        let transition = TransitionGuard::enter(&self.inner, EngineState::Initializing);
        let (snapshot, source, last_error) = self.bootstrap().await?;

        tracing::info!(
            source = %source,
            version = %snapshot.version,
            total_questions = snapshot.total_questions,
            "Engine ready"
        );
        self.install(snapshot, source, EngineState::Ready, last_error);
        transition.complete();

        Ok(())
    }

    async fn bootstrap(&self) -> RiasecResult<(Arc<Snapshot>, SnapshotSource, Option<String>)> {
        if let Some(stored) = self.store.load() {
            match SnapshotStore::check(&stored) {
                Ok(()) => return Ok((Arc::new(stored), SnapshotSource::Cache, None)),
                Err(e) => tracing::warn!(error = %e, "Stored snapshot rejected"),
            }
        }

        match self.build_fresh().await {
            Ok(snapshot) => Ok((snapshot, SnapshotSource::Provider, None)),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    recoverable = e.is_recoverable(),
                    "Falling back to bundled snapshot"
                );
                let bundled = bundled_snapshot()?;
                Ok((Arc::new(bundled), SnapshotSource::Bundled, Some(e.to_string())))
            }
        }
    }

    /// Builds, validates and persists a new snapshot. A failed save only
    /// logs; the built snapshot is still returned.
    async fn build_fresh(&self) -> RiasecResult<Arc<Snapshot>> {
        let snapshot = self.builder.build().await?;
        SnapshotStore::check(&snapshot)?;

        if let Err(e) = self.store.save(&snapshot) {
            tracing::warn!(
                error = %e,
                storage = %self.store.describe(),
                "Snapshot kept in memory only"
            );
        }

        Ok(Arc::new(snapshot))
    }

    /// Rebuilds from the provider, bypassing the stored snapshot.
    ///
    /// On success the new snapshot replaces the active one wholesale. On
    /// failure the active or stored snapshot keeps serving and the engine
    /// stays [`EngineState::Ready`] with `last_error` set; only when neither
    /// exists does it fall to the bundled snapshot in
    /// [`EngineState::Degraded`].
    ///
    /// # Errors
    ///
    /// `RebuildInProgress` if another build is running.
    pub async fn rebuild(&self) -> RiasecResult<RebuildOutcome> {
        let _build = self
            .build_lock
            .try_lock()
            .map_err(|_| RiasecError::RebuildInProgress)?;

        let transition = TransitionGuard::enter(&self.inner, EngineState::Rebuilding);

        let outcome = match self.build_fresh().await {
            Ok(snapshot) => {
                tracing::info!(
                    version = %snapshot.version,
                    total_questions = snapshot.total_questions,
                    "Snapshot rebuilt"
                );
                let outcome = RebuildOutcome::Rebuilt {
                    version: snapshot.version.clone(),
                    total_questions: snapshot.total_questions,
                };
                self.install(snapshot, SnapshotSource::Provider, EngineState::Ready, None);
                outcome
            }
            Err(e) => {
                tracing::warn!(error = %e, "Rebuild failed, keeping previous snapshot");
                let (snapshot, source, state) = match self.current().or_else(|| self.stored()) {
                    Some((prior, source)) => (prior, source, EngineState::Ready),
                    None => (
                        Arc::new(bundled_snapshot()?),
                        SnapshotSource::Bundled,
                        EngineState::Degraded,
                    ),
                };
                let outcome = RebuildOutcome::Failed {
                    serving_version: snapshot.version.clone(),
                    error: e.to_string(),
                };
                self.install(snapshot, source, state, Some(e.to_string()));
                outcome
            }
        };

        transition.complete();
        Ok(outcome)
    }

    fn current(&self) -> Option<(Arc<Snapshot>, SnapshotSource)> {
        let inner = self.read();
        let snapshot = inner.active.clone()?;
        Some((snapshot, inner.source.unwrap_or(SnapshotSource::Bundled)))
    }

    fn stored(&self) -> Option<(Arc<Snapshot>, SnapshotSource)> {
        self.store
            .load()
            .filter(SnapshotStore::validate)
            .map(|s| (Arc::new(s), SnapshotSource::Cache))
    }

    /// Validates a snapshot file, persists it and makes it active.
    pub async fn import(&self, path: &Path) -> RiasecResult<Arc<Snapshot>> {
        let _build = self
            .build_lock
            .try_lock()
            .map_err(|_| RiasecError::RebuildInProgress)?;

        let snapshot = Arc::new(import_snapshot(path)?);
        self.store.save(&snapshot)?;
        self.install(
            Arc::clone(&snapshot),
            SnapshotSource::Imported,
            EngineState::Ready,
            None,
        );

        Ok(snapshot)
    }

    /// Scores a feed against the active snapshot, initializing first if
    /// needed. Text that normalises to nothing gives an all-zero analysis.
    pub async fn analyze_feed(&self, text: &str) -> RiasecResult<FeedAnalysis> {
        let snapshot = self.ready_snapshot().await?;
        Ok(self.analyze_with(&snapshot, text))
    }

    /// Scores a feed against a given snapshot.
    pub fn analyze_with(&self, snapshot: &Snapshot, text: &str) -> FeedAnalysis {
        let key = AnalysisCache::cache_key(text, &snapshot.version);

        if let Some(cache) = &self.cache {
            let mut cache = cache.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(hit) = cache.get(&key) {
                tracing::debug!(version = %snapshot.version, "Analysis cache hit");
                return hit.reissued(text);
            }
        }

        let matches = self.matcher.top_matches(text, snapshot);
        let analysis = self.aggregator.aggregate(text, matches, &snapshot.version);

        if let Some(cache) = &self.cache {
            let mut cache = cache.lock().unwrap_or_else(PoisonError::into_inner);
            cache.insert(key, analysis.clone());
        }

        analysis
    }

    /// Questions of one category in the active snapshot.
    pub async fn questions_by_category(&self, category: Category) -> RiasecResult<Vec<QuestionItem>> {
        let snapshot = self.ready_snapshot().await?;
        Ok(snapshot.questions_in(category).to_vec())
    }

    async fn ready_snapshot(&self) -> RiasecResult<Arc<Snapshot>> {
        if let Some(snapshot) = self.snapshot() {
            return Ok(snapshot);
        }
        self.initialize().await?;
        self.snapshot()
            .ok_or_else(|| RiasecError::other("engine has no active snapshot"))
    }

    pub fn status(&self) -> EngineStatus {
        let inner = self.read();
        let snapshot = inner.active.as_deref();

        EngineStatus {
            is_initialized: snapshot.is_some(),
            state: inner.state,
            total_questions: snapshot.map_or(0, |s| s.total_questions),
            per_category_counts: snapshot
                .map(Snapshot::category_counts)
                .unwrap_or_else(|| Category::ALL.iter().map(|c| (*c, 0)).collect()),
            last_updated: snapshot.map(|s| s.built_at),
            version: snapshot.map(|s| s.version.clone()),
            source: inner.source,
            last_error: inner.last_error.clone(),
            keywords_stale: snapshot.is_some_and(|s| s.is_stale_for(&self.fingerprint)),
            storage: self.store.describe(),
            cache: self.cache.as_ref().map(|c| {
                c.lock().unwrap_or_else(PoisonError::into_inner).stats()
            }),
        }
    }
}
