//! Bounded retry loop around the model call, repair and strict validation

use crate::config::GeneratorConfig;
use crate::error::GeneratorError;
use crate::repair::{repair, RepairOutcome, RepairStage};
use crate::validate::{validate, ValidationContext, ValidationMode};
use quill_domain::traits::LlmProvider;
use quill_domain::ArticleDocument;
use quill_llm::LlmError;
use std::sync::Arc;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

/// A validated article and how it was obtained
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedArticle {
    /// The validated document
    pub document: ArticleDocument,
    /// Raw text of the accepted model response
    pub raw_response: String,
    /// Text the document was parsed from after repair
    pub repaired_text: String,
    /// Repair stage that produced the document
    pub stage: RepairStage,
    /// Model calls made, including the accepted one
    pub attempts: u32,
}

/// Why the attempt budget ran out
struct Exhausted {
    reason: String,
    raw_response: Option<String>,
    last_repair: Option<(String, RepairOutcome)>,
}

enum LoopFailure {
    Fatal(LlmError),
    Exhausted(Exhausted),
}

/// Generates articles from a text model
///
/// Each attempt moves through `Requesting → Repairing → Validating`. A
/// response that fails strict validation is re-requested at once; a
/// transport failure or per-call timeout waits with exponential backoff
/// first. Both share one budget of `max_attempts` model calls.
pub struct ArticleGenerator<L>
where
    L: LlmProvider<Error = LlmError>,
{
    llm_provider: Arc<L>,
    config: GeneratorConfig,
}

impl<L> ArticleGenerator<L>
where
    L: LlmProvider<Error = LlmError> + 'static,
{
    /// Create a generator, rejecting an invalid configuration
    pub fn new(llm_provider: L, config: GeneratorConfig) -> Result<Self, GeneratorError> {
        Self::from_arc(Arc::new(llm_provider), config)
    }

    /// Create a generator around a shared provider
    pub fn from_arc(llm_provider: Arc<L>, config: GeneratorConfig) -> Result<Self, GeneratorError> {
        config.validate().map_err(GeneratorError::Config)?;
        Ok(Self {
            llm_provider,
            config,
        })
    }

    /// The active configuration
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate an article, re-issuing the same prompt on every attempt
    pub async fn generate(
        &self,
        prompt: &str,
        ctx: &ValidationContext,
    ) -> Result<GeneratedArticle, GeneratorError> {
        self.generate_with(|_| prompt.to_string(), ctx).await
    }

    /// Generate an article with a prompt built per attempt
    ///
    /// `prompt_fn` receives the 1-based attempt number.
    ///
    /// # Errors
    ///
    /// [`GeneratorError::Llm`] when the provider reports an error retrying
    /// cannot fix, [`GeneratorError::GenerationFailed`] once the attempt
    /// budget is spent.
    pub async fn generate_with<F>(
        &self,
        prompt_fn: F,
        ctx: &ValidationContext,
    ) -> Result<GeneratedArticle, GeneratorError>
    where
        F: Fn(u32) -> String,
    {
        match self.run_attempts(&prompt_fn, ctx).await {
            Ok(article) => Ok(article),
            Err(LoopFailure::Fatal(e)) => Err(GeneratorError::Llm(e)),
            Err(LoopFailure::Exhausted(exhausted)) => Err(self.failed(exhausted)),
        }
    }

    /// Generate an article, falling back to lenient validation
    ///
    /// Behaves like [`generate`](Self::generate), except that when the
    /// budget runs out after at least one response arrived, the last
    /// response is validated leniently and returned instead of an error.
    pub async fn generate_lenient(
        &self,
        prompt: &str,
        ctx: &ValidationContext,
    ) -> Result<GeneratedArticle, GeneratorError> {
        let prompt_fn = |_: u32| prompt.to_string();
        let exhausted = match self.run_attempts(&prompt_fn, ctx).await {
            Ok(article) => return Ok(article),
            Err(LoopFailure::Fatal(e)) => return Err(GeneratorError::Llm(e)),
            Err(LoopFailure::Exhausted(exhausted)) => exhausted,
        };

        let Some((raw_response, outcome)) = exhausted.last_repair.clone() else {
            return Err(self.failed(exhausted));
        };

        match validate(&outcome.value, ValidationMode::Lenient, ctx) {
            Ok(document) => {
                warn!(
                    stage = %outcome.stage,
                    "Strict validation never passed, using lenient defaults"
                );
                Ok(GeneratedArticle {
                    document,
                    raw_response,
                    repaired_text: outcome.text,
                    stage: outcome.stage,
                    attempts: self.config.max_attempts,
                })
            }
            Err(e) => {
                warn!("Lenient validation failed: {}", e);
                Err(self.failed(exhausted))
            }
        }
    }

    async fn run_attempts<F>(
        &self,
        prompt_fn: &F,
        ctx: &ValidationContext,
    ) -> Result<GeneratedArticle, LoopFailure>
    where
        F: Fn(u32) -> String,
    {
        let max_attempts = self.config.max_attempts;
        let mut exhausted = Exhausted {
            reason: "no attempt was made".to_string(),
            raw_response: None,
            last_repair: None,
        };

        for attempt in 1..=max_attempts {
            let prompt = prompt_fn(attempt);
            info!(
                attempt,
                max_attempts,
                model = self.llm_provider.model_name(),
                "Requesting article"
            );
            debug!("Prompt length: {} chars", prompt.len());

            let raw = match self.call_llm(&prompt).await {
                Ok(raw) => raw,
                Err(e) if !e.is_transient() => {
                    warn!("Provider error is not retryable: {}", e);
                    return Err(LoopFailure::Fatal(e));
                }
                Err(e) => {
                    warn!(attempt, "Model call failed: {}", e);
                    exhausted.reason = e.to_string();
                    if attempt < max_attempts {
                        let delay = self.config.backoff_delay(attempt);
                        debug!(?delay, "Backing off before retry");
                        sleep(delay).await;
                    }
                    continue;
                }
            };

            debug!("Model response length: {} chars", raw.len());
            let outcome = repair(&raw);

            match validate(&outcome.value, ValidationMode::Strict, ctx) {
                Ok(document) => {
                    info!(attempt, stage = %outcome.stage, "Article accepted");
                    return Ok(GeneratedArticle {
                        document,
                        raw_response: raw,
                        repaired_text: outcome.text,
                        stage: outcome.stage,
                        attempts: attempt,
                    });
                }
                Err(e) => {
                    warn!(attempt, stage = %outcome.stage, "Strict validation failed: {}", e);
                    exhausted.reason = e.to_string();
                    exhausted.raw_response = Some(raw.clone());
                    exhausted.last_repair = Some((raw, outcome));
                }
            }
        }

        Err(LoopFailure::Exhausted(exhausted))
    }

    /// Call the provider under the per-call timeout
    async fn call_llm(&self, prompt: &str) -> Result<String, LlmError> {
        let limit = self.config.request_timeout();
        match timeout(limit, self.llm_provider.generate(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout(limit)),
        }
    }

    fn failed(&self, exhausted: Exhausted) -> GeneratorError {
        warn!(
            attempts = self.config.max_attempts,
            "Generation failed: {}", exhausted.reason
        );
        GeneratorError::GenerationFailed {
            attempts: self.config.max_attempts,
            reason: exhausted.reason,
            raw_response: exhausted.raw_response,
            repaired_text: exhausted.last_repair.map(|(_, outcome)| outcome.text),
        }
    }
}
