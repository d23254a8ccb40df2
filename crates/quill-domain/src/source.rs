//! Extracted source material

use crate::article::Media;
use serde::{Deserialize, Serialize};

/// Source material returned by the extraction collaborator
///
/// One document per URL (or per pasted block of text). Its `content` is
/// markdown and feeds the generation prompt; its media is offered to the
/// model for placement.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Page or video title
    pub title: String,

    /// Where the material came from (empty for pasted text)
    #[serde(default)]
    pub url: String,

    /// Extracted markdown text or transcript
    pub content: String,

    /// Display name of the source, used to group text in the prompt
    pub source: String,

    /// Images and embeds found in the source
    #[serde(default)]
    pub media: Media,
}

impl SourceDocument {
    /// A source built from text the user pasted directly
    pub fn pasted(content: impl Into<String>) -> Self {
        Self {
            title: "Additional Content".to_string(),
            url: String::new(),
            content: content.into(),
            source: "Additional Content".to_string(),
            media: Media::default(),
        }
    }
}
