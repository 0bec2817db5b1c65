use serde::{Deserialize, Serialize};

use super::parser::parse_classification_reply;
use super::prompt::build_classification_prompt;
use super::types::{ClassificationMap, ScoringMode};
use super::ClassifyError;
use crate::taxonomy::CategoryTaxonomy;

/// Default OpenAI-compatible endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Low-randomness sampling to bias toward deterministic categorical output.
const TEMPERATURE: f32 = 0.1;

/// Output-length budget per batch reply.
const MAX_TOKENS: u32 = 4000;

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Capability interface for classifying one batch of labels.
///
/// Implementations return a possibly-partial, possibly-empty map and never
/// fail past this boundary; a batch that yields nothing simply leaves its
/// labels to the fallback category at merge time.
pub trait LabelClassifier {
    fn classify(&self, labels: &[String]) -> ClassificationMap;
}

/// Chat-completions client for an OpenAI-compatible service.
pub struct ChatApiClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    model: String,
    taxonomy: CategoryTaxonomy,
    mode: ScoringMode,
    timeout_secs: u64,
}

impl ChatApiClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        model: &str,
        taxonomy: CategoryTaxonomy,
        mode: ScoringMode,
        timeout_secs: u64,
    ) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            taxonomy,
            mode,
            timeout_secs,
        }
    }

    /// Client against the hosted endpoint with the default timeout.
    pub fn hosted(
        api_key: &str,
        model: &str,
        taxonomy: CategoryTaxonomy,
        mode: ScoringMode,
    ) -> Self {
        Self::new(
            DEFAULT_BASE_URL,
            api_key,
            model,
            taxonomy,
            mode,
            DEFAULT_TIMEOUT_SECS,
        )
    }

    /// One blocking chat-completions round trip; returns the reply text.
    fn complete(&self, prompt: &str) -> Result<String, ClassifyError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    ClassifyError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    ClassifyError::Timeout(self.timeout_secs)
                } else {
                    ClassifyError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ClassifyError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| ClassifyError::HttpClient(e.to_string()))?;

        match parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
        {
            Some(content) if !content.trim().is_empty() => Ok(content),
            _ => Err(ClassifyError::EmptyReply),
        }
    }
}

impl LabelClassifier for ChatApiClient {
    fn classify(&self, labels: &[String]) -> ClassificationMap {
        let prompt = build_classification_prompt(labels, &self.taxonomy, self.mode);
        match self
            .complete(&prompt)
            .and_then(|reply| parse_classification_reply(&reply))
        {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    labels = labels.len(),
                    "batch classification failed; its labels will fall back"
                );
                ClassificationMap::new()
            }
        }
    }
}

/// Request body for POST /chat/completions
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response body from POST /chat/completions
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
}

#[derive(Deserialize)]
struct ChatReplyMessage {
    content: Option<String>,
}

/// Deterministic classifier for tests, serving results from a fixed table.
pub struct MockClassifier {
    table: ClassificationMap,
}

impl MockClassifier {
    /// A mock that knows nothing; every batch comes back empty.
    pub fn empty() -> Self {
        Self {
            table: ClassificationMap::new(),
        }
    }

    pub fn with(mut self, label: &str, category: &str, confidence: Option<f32>) -> Self {
        self.table.insert(
            label.to_string(),
            super::types::Classification::new(category, confidence),
        );
        self
    }
}

impl LabelClassifier for MockClassifier {
    fn classify(&self, labels: &[String]) -> ClassificationMap {
        labels
            .iter()
            .filter_map(|label| {
                self.table
                    .get(label)
                    .map(|cls| (label.clone(), cls.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_trims_trailing_slash() {
        let client = ChatApiClient::new(
            "https://api.openai.com/v1/",
            "sk-test",
            DEFAULT_MODEL,
            CategoryTaxonomy::japanese_hr(),
            ScoringMode::WithConfidence,
            60,
        );
        assert_eq!(client.base_url, "https://api.openai.com/v1");
        assert_eq!(client.timeout_secs, 60);
    }

    #[test]
    fn hosted_uses_default_endpoint() {
        let client = ChatApiClient::hosted(
            "sk-test",
            DEFAULT_MODEL,
            CategoryTaxonomy::japanese_hr(),
            ScoringMode::WithConfidence,
        );
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
        assert_eq!(client.model, "gpt-4o-mini");
    }

    #[test]
    fn mock_serves_only_requested_labels() {
        let mock = MockClassifier::empty()
            .with("入社区分", "雇用管理", Some(0.9))
            .with("国籍", "個人属性", Some(0.8));
        let map = mock.classify(&["入社区分".to_string()]);
        assert_eq!(map.len(), 1);
        assert_eq!(map["入社区分"].category, "雇用管理");
    }

    #[test]
    fn empty_mock_returns_empty_map() {
        let mock = MockClassifier::empty();
        let map = mock.classify(&["なにか".to_string()]);
        assert!(map.is_empty());
    }
}
