//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the generation pipeline and
//! the services it talks to. Implementations live in other crates.

use crate::publish::{GeneratedImage, MediaId, PostId, PublishRequest};
use crate::source::SourceDocument;
use async_trait::async_trait;

/// Trait for generative text providers
///
/// Implemented by the infrastructure layer (quill-llm). The returned text
/// carries no well-formedness guarantee: it may include prose, markdown
/// fences, or be truncated.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Error type for generation calls
    type Error: std::error::Error + Send + Sync + 'static;

    /// Generate a completion for `prompt`
    async fn generate(&self, prompt: &str) -> Result<String, Self::Error>;

    /// Name of the model behind this provider
    fn model_name(&self) -> &str;
}

/// Trait for illustration providers
///
/// Implemented by the infrastructure layer (quill-llm)
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Error type for image generation
    type Error: std::error::Error + Send + Sync + 'static;

    /// Generate an image for `prompt`
    async fn generate_image(
        &self,
        prompt: &str,
        alt_text: Option<&str>,
    ) -> Result<GeneratedImage, Self::Error>;
}

/// Trait for source extraction
///
/// Implemented by the extraction layer (quill-sources)
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Error type for extraction
    type Error: std::error::Error + Send + Sync + 'static;

    /// Extract title, text, and media from `url`
    async fn extract(&self, url: &str) -> Result<SourceDocument, Self::Error>;
}

/// Trait for content-management backends
///
/// Implemented by the publishing layer (quill-publisher)
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Error type for publishing
    type Error: std::error::Error + Send + Sync + 'static;

    /// Create a post from a rendered article
    async fn publish(&self, request: &PublishRequest) -> Result<PostId, Self::Error>;

    /// Upload an image so it can be used as featured media
    async fn upload_media(
        &self,
        image: &GeneratedImage,
        filename: &str,
    ) -> Result<MediaId, Self::Error>;

    /// Editor URL for a created post
    fn edit_url(&self, post_id: PostId) -> String;
}
