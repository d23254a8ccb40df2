//! Publisher contract types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a published post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostId(pub u64);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an uploaded media item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaId(pub u64);

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Publication status of a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    /// Saved for editorial review
    #[default]
    Draft,
    /// Live
    Publish,
}

/// The rendered article as the CMS receives it
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PublishRequest {
    /// Post title
    pub title: String,
    /// Rendered HTML body
    pub html_content: String,
    /// URL slug
    pub slug: String,
    /// Short summary
    pub excerpt: String,
    /// SEO title
    pub seo_title: String,
    /// SEO meta description
    pub seo_description: String,
    /// Uploaded featured image
    pub featured_media_id: Option<MediaId>,
    /// SEO focus keyword
    pub focus_keyword: String,
    /// Category ids (also applied as tags)
    pub categories: Vec<u64>,
    /// Publication status
    pub status: PostStatus,
}

/// An illustration produced by the image-generation collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    /// Base64-encoded PNG data
    pub b64_data: String,
    /// Alt text for the image
    pub alt_text: String,
    /// Prompt the image was generated from
    pub prompt: String,
}
