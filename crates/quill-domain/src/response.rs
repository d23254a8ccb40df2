//! Raw model responses, before any repair

use serde_json::Value;

/// What a generative model hands back
///
/// Providers usually return free text, but some hand back an already-parsed
/// value (a single document, a sequence of documents, or a bare string).
/// The pipeline normalizes both shapes to text at its boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum RawModelResponse {
    /// Unparsed text, possibly wrapped in prose or code fences
    Text(String),
    /// An already-structured value
    Structured(Value),
}

impl RawModelResponse {
    /// Normalize to the text form the repair engine consumes
    ///
    /// A structured bare string is unwrapped rather than re-quoted.
    pub fn into_text(self) -> String {
        match self {
            RawModelResponse::Text(text) => text,
            RawModelResponse::Structured(Value::String(text)) => text,
            RawModelResponse::Structured(value) => value.to_string(),
        }
    }

    /// Whether the response carries no content
    pub fn is_empty(&self) -> bool {
        match self {
            RawModelResponse::Text(text) => text.trim().is_empty(),
            RawModelResponse::Structured(Value::Null) => true,
            RawModelResponse::Structured(Value::String(text)) => text.trim().is_empty(),
            RawModelResponse::Structured(_) => false,
        }
    }
}

impl From<String> for RawModelResponse {
    fn from(text: String) -> Self {
        RawModelResponse::Text(text)
    }
}

impl From<&str> for RawModelResponse {
    fn from(text: &str) -> Self {
        RawModelResponse::Text(text.to_string())
    }
}

impl From<Value> for RawModelResponse {
    fn from(value: Value) -> Self {
        RawModelResponse::Structured(value)
    }
}
