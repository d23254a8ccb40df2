//! Quill Sources
//!
//! Extraction collaborators that turn a URL into a [`SourceDocument`]:
//!
//! - [`JinaReader`]: web pages as markdown, with content images and tweet
//!   links collected as media
//! - [`TranscriptFetcher`]: YouTube caption tracks as plain text
//! - [`SourceExtractor`]: picks between the two and implements
//!   [`ContentSource`]
//!
//! [`SourceDocument`]: quill_domain::SourceDocument
//! [`ContentSource`]: quill_domain::traits::ContentSource

#![warn(missing_docs)]

mod error;
mod extractor;
mod jina;
mod youtube;

pub use error::SourceError;
pub use extractor::{ExtractionReport, SourceExtractor};
pub use jina::{content_images, parse_reader_output, tweet_embeds, JinaConfig, JinaReader};
pub use youtube::{flatten_captions, youtube_video_id, TranscriptConfig, TranscriptFetcher};
