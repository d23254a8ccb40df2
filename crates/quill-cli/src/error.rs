//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Source extraction error
    #[error("Extraction error: {0}")]
    Source(#[from] quill_sources::SourceError),

    /// Provider setup error
    #[error("Provider error: {0}")]
    Llm(#[from] quill_llm::LlmError),

    /// Generation setup error
    #[error(transparent)]
    Generator(#[from] quill_generator::GeneratorError),

    /// Generation pipeline error
    #[error(transparent)]
    Pipeline(#[from] quill_generator::PipelineError),

    /// Article failed strict validation
    #[error("Schema error: {0}")]
    Schema(#[from] quill_generator::SchemaError),

    /// Publishing error
    #[error("Publish error: {0}")]
    Publish(#[from] quill_publisher::PublishError),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Nothing generated yet in this session
    #[error("No article in the session. Run 'generate' first or pass --file.")]
    NoArticle,
}
