//! Quill Publisher
//!
//! Turns a validated [`ArticleDocument`] into CMS-ready HTML and publishes it
//! as a WordPress draft.
//!
//! - [`render_article`]: HTML body plus the [`PublishRequest`] fields
//! - [`WordPressClient`]: REST client implementing [`Publisher`]
//! - [`publish_article`]: featured image upload followed by post creation
//!
//! # Example Usage
//!
//! ```no_run
//! use quill_domain::ArticleDocument;
//! use quill_publisher::{publish_article, render_article, SiteConfig, WordPressClient};
//!
//! # async fn example(doc: ArticleDocument) -> Result<(), Box<dyn std::error::Error>> {
//! let site = SiteConfig {
//!     base_url: "https://icobench.com".to_string(),
//!     language_path: Some("/th".to_string()),
//!     username: "editor".to_string(),
//!     ..Default::default()
//! };
//! let rendered = render_article(&doc, &site.render_options("Bitcoin", false));
//! let client = WordPressClient::new(site)?;
//! let outcome = publish_article(&client, rendered, None).await?;
//! println!("Edit at {}", outcome.edit_url);
//! # Ok(())
//! # }
//! ```
//!
//! [`ArticleDocument`]: quill_domain::ArticleDocument
//! [`PublishRequest`]: quill_domain::PublishRequest
//! [`Publisher`]: quill_domain::traits::Publisher

#![warn(missing_docs)]

mod error;
mod render;
mod wordpress;
mod workflow;

pub use error::PublishError;
pub use render::{
    cap_meta_description, escape_html, render_article, RenderOptions, RenderedArticle,
    EMPTY_SECTION_PLACEHOLDER, META_DESCRIPTION_LIMIT,
};
pub use wordpress::{ContentType, SiteConfig, WordPressClient, APP_PASSWORD_ENV};
pub use workflow::{featured_filename, publish_article, PublishOutcome};
