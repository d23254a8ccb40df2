//! Gemini Provider Implementation
//!
//! Provides integration with Google's Gemini `generateContent` REST API.
//!
//! # Features
//!
//! - Async HTTP communication with the Gemini API
//! - Configurable endpoint, model and sampling parameters
//! - Timeout handling
//!
//! Retries are deliberately left to the caller: the article generator owns
//! the attempt budget and backoff for every call it makes.
//!
//! # Examples
//!
//! ```no_run
//! use quill_llm::{GeminiConfig, GeminiProvider};
//!
//! let provider = GeminiProvider::new(GeminiConfig::default()).unwrap();
//! ```

use crate::{resolve_api_key, LlmError};
use async_trait::async_trait;
use quill_domain::traits::LlmProvider as LlmProviderTrait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default Gemini API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Default model
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Default timeout for generation requests (120 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for the Gemini provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API base URL
    pub endpoint: String,
    /// Model name
    pub model: String,
    /// API key; falls back to `GEMINI_API_KEY`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Sampling temperature
    pub temperature: f32,
    /// Nucleus sampling
    pub top_p: f32,
    /// Top-k sampling
    pub top_k: u32,
    /// Maximum tokens in the completion
    pub max_output_tokens: u32,
    /// Per-request timeout (seconds)
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            temperature: 1.0,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 8192,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Gemini API provider
pub struct GeminiProvider {
    config: GeminiConfig,
    api_key: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("endpoint", &self.config.endpoint)
            .field("model", &self.config.model)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
    response_mime_type: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GeminiProvider {
    /// Create a new Gemini provider
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::MissingApiKey`] when neither the config nor the
    /// environment provides a key.
    pub fn new(config: GeminiConfig) -> Result<Self, LlmError> {
        let api_key = resolve_api_key(config.api_key.as_deref(), API_KEY_ENV)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            api_key,
            client,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Generate text using the Gemini API
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The model is not available (HTTP 404)
    /// - The rate limit is hit (HTTP 429)
    /// - Any other non-2xx status or network failure
    /// - The response carries no candidate text
    pub async fn generate_text(&self, prompt: &str) -> Result<String, LlmError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                top_p: self.config.top_p,
                top_k: self.config.top_k,
                max_output_tokens: self.config.max_output_tokens,
                response_mime_type: "text/plain",
            },
        };

        debug!(model = %self.config.model, prompt_len = prompt.len(), "Calling Gemini");

        let response = self
            .client
            .post(self.url())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(Duration::from_secs(self.config.timeout_secs))
                } else {
                    LlmError::from(e)
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LlmError::ModelNotAvailable(self.config.model.clone()));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimitExceeded);
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Communication(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(LlmError::InvalidResponse(
                "Response contained no candidate text".to_string(),
            ));
        }

        debug!(response_len = text.len(), "Gemini responded");
        Ok(text)
    }
}

#[async_trait]
impl LlmProviderTrait for GeminiProvider {
    type Error = LlmError;

    async fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        self.generate_text(prompt).await
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> GeminiProvider {
        GeminiProvider::new(GeminiConfig {
            endpoint: server.uri(),
            api_key: Some("test-key".to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_gemini_provider_creation() {
        let provider = GeminiProvider::new(GeminiConfig {
            api_key: Some("k".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(provider.model_name(), DEFAULT_MODEL);
        assert_eq!(
            provider.url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn test_debug_redacts_key() {
        let provider = GeminiProvider::new(GeminiConfig {
            api_key: Some("secret-value".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert!(!format!("{:?}", provider).contains("secret-value"));
    }

    #[tokio::test]
    async fn test_generate_concatenates_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {"parts": [{"text": "{\"title\": "}, {"text": "\"X\"}"}]}
                }]
            })))
            .mount(&server)
            .await;

        let text = provider_for(&server).generate("prompt").await.unwrap();
        assert_eq!(text, "{\"title\": \"X\"}");
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = provider_for(&server).generate("prompt").await;
        assert!(matches!(result, Err(LlmError::ModelNotAvailable(_))));
    }

    #[tokio::test]
    async fn test_rate_limit_and_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        assert!(matches!(
            provider.generate("p").await,
            Err(LlmError::RateLimitExceeded)
        ));
        match provider.generate("p").await {
            Err(LlmError::Communication(msg)) => assert!(msg.contains("overloaded")),
            other => panic!("Expected Communication error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_candidates_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": []
            })))
            .mount(&server)
            .await;

        let result = provider_for(&server).generate("prompt").await;
        assert!(matches!(result, Err(LlmError::InvalidResponse(_))));
    }
}
