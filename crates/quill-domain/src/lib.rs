//! Quill Domain Layer
//!
//! This crate contains the article data model and the trait interfaces that
//! every other Quill crate depends upon. It holds no I/O of its own.
//!
//! ## Key Concepts
//!
//! - **ArticleDocument**: The canonical structured result of a generation request
//! - **RawModelResponse**: What a generative model hands back, before repair
//! - **SourceDocument**: Extracted source material used to build a prompt
//! - **PublishRequest**: The rendered article as the CMS receives it
//!
//! ## Architecture
//!
//! - Pure data and trait definitions only
//! - Infrastructure implementations live in other crates
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod article;
pub mod publish;
pub mod response;
pub mod session;
pub mod source;
pub mod traits;

// Re-exports for convenience
pub use article::{
    ArticleContent, ArticleDocument, EmbedRef, ImageRef, Intro, Media, Paragraph, Section,
    SectionFormat, Seo, SourceRef,
};
pub use publish::{GeneratedImage, MediaId, PostId, PostStatus, PublishRequest};
pub use response::RawModelResponse;
pub use session::SessionId;
pub use source::SourceDocument;
