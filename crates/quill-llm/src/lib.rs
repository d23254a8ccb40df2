//! Quill Generation Provider Layer
//!
//! Pluggable text and image provider implementations.
//!
//! # Architecture
//!
//! This crate provides implementations of the `LlmProvider` and
//! `ImageGenerator` traits from `quill-domain`. Every backend shares the
//! [`LlmError`] taxonomy so the retry controller can tell transient transport
//! failures from fatal ones.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `GeminiProvider`: Google Gemini `generateContent` API
//! - `TogetherImageProvider`: Together AI image generation
//!
//! # Examples
//!
//! ```
//! use quill_llm::MockProvider;
//! use quill_domain::traits::LlmProvider;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let provider = MockProvider::new("Hello from the model!");
//! let result = provider.generate("test prompt").await.unwrap();
//! assert_eq!(result, "Hello from the model!");
//! # }
//! ```

#![warn(missing_docs)]

pub mod gemini;
pub mod together;

use async_trait::async_trait;
use quill_domain::traits::LlmProvider as LlmProviderTrait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;

pub use gemini::{GeminiConfig, GeminiProvider};
pub use together::{TogetherConfig, TogetherImageProvider};

/// Errors that can occur during generation calls
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    /// Network or API communication error (including non-2xx responses)
    #[error("Communication error: {0}")]
    Communication(String),

    /// The call did not complete in time
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Response body did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// No API key configured
    #[error("Missing API key: set {0}")]
    MissingApiKey(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl LlmError {
    /// Whether retrying the same call may succeed
    ///
    /// A missing model or API key will not fix itself between attempts.
    pub fn is_transient(&self) -> bool {
        !matches!(
            self,
            LlmError::ModelNotAvailable(_) | LlmError::MissingApiKey(_)
        )
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Communication(format!("Request timed out: {}", e))
        } else if e.is_decode() {
            LlmError::InvalidResponse(e.to_string())
        } else {
            LlmError::Communication(e.to_string())
        }
    }
}

/// Resolve an API key from configuration, falling back to an environment variable
pub fn resolve_api_key(configured: Option<&str>, env_var: &str) -> Result<String, LlmError> {
    configured
        .filter(|key| !key.trim().is_empty())
        .map(str::to_string)
        .or_else(|| std::env::var(env_var).ok().filter(|key| !key.trim().is_empty()))
        .ok_or_else(|| LlmError::MissingApiKey(env_var.to_string()))
}

/// A scripted reply for [`MockProvider`]
#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Error(LlmError),
}

/// Mock provider for deterministic testing
///
/// This provider returns pre-configured responses without making any
/// network calls. Queued replies are consumed first, in order; then
/// per-prompt responses; then the default response.
///
/// # Examples
///
/// ```
/// use quill_llm::{LlmError, MockProvider};
/// use quill_domain::traits::LlmProvider;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let provider = MockProvider::new("fallback");
/// provider.queue_error(LlmError::RateLimitExceeded);
/// provider.queue_response("first");
///
/// assert!(provider.generate("p").await.is_err());
/// assert_eq!(provider.generate("p").await.unwrap(), "first");
/// assert_eq!(provider.generate("p").await.unwrap(), "fallback");
/// assert_eq!(provider.call_count(), 3);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, String>>>,
    queue: Arc<Mutex<VecDeque<MockReply>>>,
    call_count: Arc<Mutex<usize>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            queue: Arc::new(Mutex::new(VecDeque::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Add a specific response for a given prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        lock(&self.responses).insert(prompt.into(), response.into());
    }

    /// Queue a one-shot response, served before any other reply
    pub fn queue_response(&self, response: impl Into<String>) {
        lock(&self.queue).push_back(MockReply::Text(response.into()));
    }

    /// Queue a one-shot error, served before any other reply
    pub fn queue_error(&self, error: LlmError) {
        lock(&self.queue).push_back(MockReply::Error(error));
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        *lock(&self.call_count)
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *lock(&self.call_count) = 0;
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    async fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        *lock(&self.call_count) += 1;

        if let Some(reply) = lock(&self.queue).pop_front() {
            return match reply {
                MockReply::Text(text) => Ok(text),
                MockReply::Error(e) => Err(e),
            };
        }

        if let Some(response) = lock(&self.responses).get(prompt) {
            return Ok(response.clone());
        }

        Ok(self.default_response.clone())
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
