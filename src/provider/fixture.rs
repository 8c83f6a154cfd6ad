//! Offline providers: fixed records and saved payload files.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::base::{parse_questions_payload, ProviderRecord, QuestionProvider};
use crate::{RiasecError, RiasecResult};

/// Provider serving a fixed list of records, or a fixed failure.
pub struct StaticProvider {
    records: Vec<ProviderRecord>,
    failure: Option<String>,
    delay: Option<Duration>,
}

impl StaticProvider {
    /// Serves `records` in order.
    pub fn new(records: Vec<ProviderRecord>) -> Self {
        Self {
            records,
            failure: None,
            delay: None,
        }
    }

    /// Serves `(id, text)` pairs in order.
    pub fn from_pairs<I, S, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(id, text)| ProviderRecord::new(id, text))
                .collect(),
        )
    }

    /// Always fails as unavailable.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            records: Vec::new(),
            failure: Some(reason.into()),
            delay: None,
        }
    }

    /// Delays every call, to simulate a stalled upstream.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    async fn respond(&self) -> RiasecResult<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.failure {
            Some(reason) => Err(RiasecError::provider(reason.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl QuestionProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    fn source(&self) -> &str {
        "static"
    }

    fn test_type(&self) -> &str {
        "fixture"
    }

    fn test_number(&self) -> u32 {
        0
    }

    async fn fetch_catalog(&self) -> RiasecResult<Value> {
        self.respond().await?;
        Ok(json!({ "tests": [{ "name": "fixture", "count": self.records.len() }] }))
    }

    async fn fetch_questions(&self) -> RiasecResult<Vec<ProviderRecord>> {
        self.respond().await?;
        Ok(self.records.clone())
    }
}

/// Provider reading a saved `{"questions": [...]}` payload from disk.
pub struct FileProvider {
    path: PathBuf,
    test_type: String,
    test_number: u32,
}

impl FileProvider {
    /// Reads from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            test_type: "file".to_string(),
            test_number: 0,
        }
    }

    /// Records which questionnaire the file holds.
    #[must_use]
    pub fn with_test(mut self, test_number: u32, test_type: impl Into<String>) -> Self {
        self.test_number = test_number;
        self.test_type = test_type.into();
        self
    }

    async fn read_payload(&self) -> RiasecResult<Value> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            RiasecError::provider(format!("cannot read {}: {}", self.path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            RiasecError::provider(format!("invalid JSON in {}: {}", self.path.display(), e))
        })
    }
}

#[async_trait]
impl QuestionProvider for FileProvider {
    fn name(&self) -> &str {
        "file"
    }

    fn source(&self) -> &str {
        "file"
    }

    fn test_type(&self) -> &str {
        &self.test_type
    }

    fn test_number(&self) -> u32 {
        self.test_number
    }

    async fn fetch_catalog(&self) -> RiasecResult<Value> {
        Ok(json!({ "path": self.path.display().to_string() }))
    }

    async fn fetch_questions(&self) -> RiasecResult<Vec<ProviderRecord>> {
        let payload = self.read_payload().await?;
        parse_questions_payload(payload, self.name())
    }

    async fn is_available(&self) -> bool {
        self.path.is_file()
    }
}
