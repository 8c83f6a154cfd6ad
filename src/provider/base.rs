//! Base trait for questionnaire providers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{RiasecError, RiasecResult};

/// Group label used when the provider does not send one.
pub const DEFAULT_GROUP: &str = "일반";

/// One questionnaire item as delivered by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRecord {
    pub id: String,
    pub text: String,
    /// Provider-side grouping label, kept for provenance only.
    pub group: String,
}

impl ProviderRecord {
    /// Creates a record in the default group.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            group: DEFAULT_GROUP.to_string(),
        }
    }
}

/// Trait for upstream questionnaire providers.
#[async_trait]
pub trait QuestionProvider: Send + Sync {
    /// Provider name, for logs.
    fn name(&self) -> &str;

    /// Source recorded in snapshot provenance.
    fn source(&self) -> &str;

    /// Questionnaire name recorded in snapshot provenance.
    fn test_type(&self) -> &str;

    /// Questionnaire id recorded in snapshot provenance.
    fn test_number(&self) -> u32;

    /// Fetches the provider's catalog metadata.
    async fn fetch_catalog(&self) -> RiasecResult<Value>;

    /// Fetches the ordered question records.
    async fn fetch_questions(&self) -> RiasecResult<Vec<ProviderRecord>>;

    /// Checks whether the provider answers at all.
    async fn is_available(&self) -> bool {
        self.fetch_catalog().await.is_ok()
    }
}

#[derive(Debug, Deserialize)]
struct RawPayload {
    questions: Option<Vec<RawQuestion>>,
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    #[serde(default)]
    qno: Option<Value>,
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

/// Parses a raw `{"questions": [...]}` payload into ordered records.
///
/// Ids come from `qno` (number or string) or fall back to `Q{n}`; text comes
/// from `question`, then `text`. A missing `questions` array or a record
/// without text is a schema mismatch.
pub fn parse_questions_payload(payload: Value, provider: &str) -> RiasecResult<Vec<ProviderRecord>> {
    let raw: RawPayload = serde_json::from_value(payload).map_err(|e| {
        RiasecError::provider(format!("{}: schema mismatch: {}", provider, e))
    })?;

    let questions = raw.questions.ok_or_else(|| {
        RiasecError::provider(format!("{}: schema mismatch: missing 'questions' array", provider))
    })?;

    questions
        .into_iter()
        .enumerate()
        .map(|(index, q)| {
            let text = q
                .question
                .or(q.text)
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .ok_or_else(|| {
                    RiasecError::provider(format!(
                        "{}: schema mismatch: question #{} has no text",
                        provider,
                        index + 1
                    ))
                })?;

            let id = match q.qno {
                Some(Value::Number(n)) => n.to_string(),
                Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
                _ => format!("Q{}", index + 1),
            };

            let group = q
                .category
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_GROUP.to_string());

            Ok(ProviderRecord { id, text, group })
        })
        .collect()
}
