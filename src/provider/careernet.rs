//! Provider for the CareerNet psychological test API.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::base::{parse_questions_payload, ProviderRecord, QuestionProvider};
use crate::types::config::ProviderConfig;
use crate::{RiasecError, RiasecResult};

/// CareerNet open API client.
///
/// Calls the test catalog first and then the question list of the configured
/// test. Every call is bounded by the configured timeout.
pub struct CareerNetProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    test_number: u32,
    test_type: String,
    timeout: Duration,
}

impl CareerNetProvider {
    /// Creates a provider for `base_url`.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let defaults = ProviderConfig::default();
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            test_number: defaults.test_number,
            timeout: defaults.timeout(),
            test_type: defaults.test_type,
        }
    }

    /// Creates a provider from configuration.
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self::new(config.base_url.clone(), config.resolved_api_key())
            .with_test(config.test_number, config.test_type.clone())
            .with_timeout(config.timeout())
    }

    /// Sets the requested test.
    #[must_use]
    pub fn with_test(mut self, test_number: u32, test_type: impl Into<String>) -> Self {
        self.test_number = test_number;
        self.test_type = test_type.into();
        self
    }

    /// Sets the per-call timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> RiasecResult<Value> {
        let request = self.client.get(url).query(query).send();

        let response = match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                return Err(RiasecError::provider(format!("request to {} failed: {}", url, e)))
            }
            Err(_) => {
                return Err(RiasecError::provider(format!(
                    "request to {} timed out after {}s",
                    url,
                    self.timeout.as_secs()
                )))
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(RiasecError::provider(format!(
                "{} answered with status {}",
                url, status
            )));
        }

        match tokio::time::timeout(self.timeout, response.json::<Value>()).await {
            Ok(Ok(body)) => Ok(body),
            Ok(Err(e)) => Err(RiasecError::provider(format!(
                "invalid JSON from {}: {}",
                url, e
            ))),
            Err(_) => Err(RiasecError::provider(format!(
                "reading {} timed out after {}s",
                url,
                self.timeout.as_secs()
            ))),
        }
    }
}

#[async_trait]
impl QuestionProvider for CareerNetProvider {
    fn name(&self) -> &str {
        "CareerNet"
    }

    fn source(&self) -> &str {
        "career.go.kr"
    }

    fn test_type(&self) -> &str {
        &self.test_type
    }

    fn test_number(&self) -> u32 {
        self.test_number
    }

    async fn fetch_catalog(&self) -> RiasecResult<Value> {
        let url = format!("{}/tests", self.base_url);
        self.get_json(&url, &[("apikey", self.api_key.clone())]).await
    }

    async fn fetch_questions(&self) -> RiasecResult<Vec<ProviderRecord>> {
        tracing::info!(test_number = self.test_number, "Fetching questionnaire from CareerNet");

        self.fetch_catalog().await?;

        let url = format!("{}/test", self.base_url);
        let payload = self
            .get_json(
                &url,
                &[
                    ("apikey", self.api_key.clone()),
                    ("q", self.test_number.to_string()),
                ],
            )
            .await?;

        let records = parse_questions_payload(payload, self.name())?;
        tracing::info!(records = records.len(), "CareerNet questionnaire loaded");
        Ok(records)
    }
}
