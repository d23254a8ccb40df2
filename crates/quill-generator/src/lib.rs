//! Quill Generator
//!
//! Turns extracted source material into a validated [`ArticleDocument`] using
//! a generative text model whose output cannot be trusted to be well formed.
//!
//! # Overview
//!
//! The model is asked for strict JSON but routinely wraps it in prose or code
//! fences, truncates it, drops separators, or leaves sigils like `$` in places
//! the parser rejects. This crate repairs that output, validates the result
//! against the article schema and retries the model call within a bounded
//! budget when either step fails.
//!
//! # Architecture
//!
//! ```text
//! Sources → normalize → prompt → LLM → repair → validate → ArticleDocument
//!                                 ↑                │
//!                                 └──── retry ─────┘
//! ```
//!
//! # Key Features
//!
//! - **Source normalization**: scraper artifacts and control characters removed
//! - **Staged repair**: extraction, delimiter balancing, separator repair,
//!   escaping, salvage and plain-text fallback; never fails
//! - **Strict and lenient validation**: reject incomplete documents, or fill
//!   locale-templated defaults
//! - **Retry control**: exponential backoff for transport failures, immediate
//!   re-request for schema failures
//! - **Session isolation**: per-session cache of the last article
//!
//! # Example Usage
//!
//! ```no_run
//! use quill_generator::{ArticleGenerator, GeneratorConfig, ValidationContext};
//! use quill_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new(
//!     r#"{"title": "Bitcoin Rally", "content": {"intro": "Up", "sections": [], "conclusion": "Done"}}"#,
//! );
//! let generator = ArticleGenerator::new(llm, GeneratorConfig::default())?;
//!
//! let article = generator
//!     .generate("Write about Bitcoin", &ValidationContext::new("Bitcoin"))
//!     .await?;
//!
//! println!("{} (repaired by {})", article.document.title, article.stage);
//! # Ok(())
//! # }
//! ```
//!
//! [`ArticleDocument`]: quill_domain::ArticleDocument

#![warn(missing_docs)]

mod config;
mod error;
mod generator;
mod normalize;
mod pipeline;
mod prompt;
mod repair;
mod session;
mod validate;

#[cfg(test)]
mod tests;

pub use config::{find_promotion, GeneratorConfig, Promotion};
pub use error::{GeneratorError, PipelineError, SchemaError};
pub use generator::{ArticleGenerator, GeneratedArticle};
pub use normalize::{normalize, prepare_sources, PreparedSources};
pub use pipeline::{illustrate, ArticlePipeline, GenerationRequest};
pub use prompt::ArticlePromptBuilder;
pub use repair::{
    balance_delimiters, escape_string_literals, extract_candidate, repair, repair_response,
    repair_separators, structural_delimiter_counts, RepairOutcome, RepairStage, StageResult,
    UNTITLED,
};
pub use session::{SessionState, SessionStore};
pub use validate::{
    slugify, validate, Locale, ValidationContext, ValidationMode, EXCERPT_LEN,
    META_DESCRIPTION_LEN,
};
