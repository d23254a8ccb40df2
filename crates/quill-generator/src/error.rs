//! Error types for the generator

use quill_llm::LlmError;
use thiserror::Error;

/// A document failed strict validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The repaired value is not a mapping (nor a sequence containing one)
    #[error("Expected a JSON object, found {0}")]
    NotAnObject(String),

    /// A mandatory field is absent or empty
    #[error("Missing required field '{0}'")]
    MissingField(String),

    /// A field is present but has the wrong shape
    #[error("Invalid field '{field}': {reason}")]
    InvalidField {
        /// Dotted path of the field
        field: String,
        /// What was wrong with it
        reason: String,
    },
}

/// Errors surfaced by the retry controller
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// Every attempt failed
    ///
    /// Carries the most recent raw response and its repaired text (if any
    /// response arrived) for manual inspection.
    #[error("Generation failed after {attempts} attempts: {reason}")]
    GenerationFailed {
        /// Number of model calls made
        attempts: u32,
        /// Why the last attempt failed
        reason: String,
        /// The last raw model response, if any
        raw_response: Option<String>,
        /// The text repair made of `raw_response`
        repaired_text: Option<String>,
    },

    /// A provider error that retrying cannot fix
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors surfaced by the article pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// No usable source text was supplied
    #[error("No source content to generate from")]
    NoSources,

    /// Generation failed
    #[error(transparent)]
    Generation(#[from] GeneratorError),

    /// Cached article could not be (de)serialized
    #[error("JSON error: {0}")]
    Json(String),
}

impl From<serde_json::Error> for PipelineError {
    fn from(e: serde_json::Error) -> Self {
        PipelineError::Json(e.to_string())
    }
}
