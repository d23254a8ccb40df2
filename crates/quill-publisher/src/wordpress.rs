//! WordPress REST client
//!
//! Posts are created as drafts through `/wp-json/wp/v2/posts` (or `pages`)
//! with Yoast SEO fields in `meta_input`. Multisite installs serve each
//! language under its own path (`https://site.com/th`), configured per site.

use crate::error::PublishError;
use crate::render::RenderOptions;
use async_trait::async_trait;
use base64::Engine;
use quill_domain::traits::Publisher;
use quill_domain::{GeneratedImage, MediaId, PostId, PostStatus, PublishRequest};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Environment variable holding the application password
pub const APP_PASSWORD_ENV: &str = "WP_APP_PASSWORD";

/// Placeholder replaced by the post id in edit URL templates
pub const POST_ID_PLACEHOLDER: &str = "{post_id}";

/// Kind of content to create
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Blog post
    #[default]
    Post,
    /// Static page
    Page,
}

impl ContentType {
    fn collection(self) -> &'static str {
        match self {
            ContentType::Post => "posts",
            ContentType::Page => "pages",
        }
    }
}

/// One WordPress site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site root, e.g. `https://icobench.com`
    pub base_url: String,
    /// Language path of a multisite install, e.g. `/th`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_path: Option<String>,
    /// Account the application password belongs to
    pub username: String,
    /// Application password; falls back to `WP_APP_PASSWORD`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_password: Option<String>,
    /// Posts or pages
    pub content_type: ContentType,
    /// Editor URL with a `{post_id}` placeholder
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_url_template: Option<String>,
    /// Category ids by focus keyword (applied as tags too)
    pub categories: BTreeMap<String, u64>,
    /// Disclosure shortcode appended to articles featuring a promotion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disclosure_note: Option<String>,
    /// Per-request timeout (seconds)
    pub timeout_secs: u64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            language_path: None,
            username: String::new(),
            app_password: None,
            content_type: ContentType::Post,
            edit_url_template: None,
            categories: BTreeMap::new(),
            disclosure_note: None,
            timeout_secs: 60,
        }
    }
}

impl SiteConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        let parsed =
            url::Url::parse(&self.base_url).map_err(|e| format!("base_url is invalid: {}", e))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err("base_url must be an http(s) URL".to_string());
        }
        if self.username.trim().is_empty() {
            return Err("username must not be empty".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        if let Some(template) = &self.edit_url_template {
            if !template.contains(POST_ID_PLACEHOLDER) {
                return Err(format!(
                    "edit_url_template must contain {}",
                    POST_ID_PLACEHOLDER
                ));
            }
        }
        Ok(())
    }

    /// Site root including the language path
    ///
    /// The language path is appended once; a base URL that already ends in
    /// it is left alone.
    pub fn site_root(&self) -> String {
        let base = self.base_url.trim().trim_end_matches('/');
        let lang = self
            .language_path
            .as_deref()
            .map(|p| p.trim().trim_matches('/'))
            .filter(|p| !p.is_empty());

        match lang {
            Some(lang) if !base.ends_with(&format!("/{}", lang)) => format!("{}/{}", base, lang),
            _ => base.to_string(),
        }
    }

    /// Full URL of a REST route, e.g. `/wp-json/wp/v2/media`
    pub fn endpoint(&self, route: &str) -> String {
        format!("{}{}", self.site_root(), route)
    }

    /// Editor URL for `post_id`
    pub fn edit_url(&self, post_id: PostId) -> String {
        match &self.edit_url_template {
            Some(template) => template.replace(POST_ID_PLACEHOLDER, &post_id.to_string()),
            None => format!(
                "{}/wp-admin/post.php?post={}&action=edit&classic-editor",
                self.site_root(),
                post_id
            ),
        }
    }

    /// Category ids for `focus_keyword`, matched case-insensitively
    pub fn categories_for(&self, focus_keyword: &str) -> Vec<u64> {
        let keyword = focus_keyword.trim();
        self.categories
            .iter()
            .filter(|(name, _)| name.trim().eq_ignore_ascii_case(keyword))
            .map(|(_, id)| *id)
            .collect()
    }

    /// Rendering options for an article on this site
    ///
    /// The disclosure note is only attached when the article features a
    /// promotion.
    pub fn render_options(&self, focus_keyword: &str, promoted: bool) -> RenderOptions {
        RenderOptions {
            focus_keyword: focus_keyword.trim().to_string(),
            categories: self.categories_for(focus_keyword),
            disclosure_note: self.disclosure_note.clone().filter(|_| promoted),
        }
    }
}

#[derive(Serialize)]
struct YoastMeta<'a> {
    #[serde(rename = "_yoast_wpseo_title")]
    title: &'a str,
    #[serde(rename = "_yoast_wpseo_metadesc")]
    description: &'a str,
    #[serde(rename = "_yoast_wpseo_focuskw")]
    focus_keyword: &'a str,
}

#[derive(Serialize)]
struct PostBody<'a> {
    title: &'a str,
    content: &'a str,
    slug: &'a str,
    excerpt: &'a str,
    status: PostStatus,
    meta_input: YoastMeta<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    featured_media: Option<u64>,
    #[serde(skip_serializing_if = "<[u64]>::is_empty")]
    categories: &'a [u64],
    #[serde(skip_serializing_if = "<[u64]>::is_empty")]
    tags: &'a [u64],
}

#[derive(Serialize)]
struct MediaMeta<'a> {
    alt_text: &'a str,
    title: &'a str,
}

#[derive(Deserialize)]
struct Created {
    id: u64,
}

/// WordPress REST API publisher
pub struct WordPressClient {
    site: SiteConfig,
    password: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for WordPressClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordPressClient")
            .field("site", &self.site.site_root())
            .field("username", &self.site.username)
            .finish_non_exhaustive()
    }
}

impl WordPressClient {
    /// Create a client for `site`
    ///
    /// # Errors
    ///
    /// [`PublishError::Config`] for an invalid site and
    /// [`PublishError::MissingCredentials`] when no password is configured.
    pub fn new(site: SiteConfig) -> Result<Self, PublishError> {
        site.validate().map_err(PublishError::Config)?;

        let password = site
            .app_password
            .clone()
            .filter(|p| !p.trim().is_empty())
            .or_else(|| {
                std::env::var(APP_PASSWORD_ENV)
                    .ok()
                    .filter(|p| !p.trim().is_empty())
            })
            .ok_or_else(|| PublishError::MissingCredentials(APP_PASSWORD_ENV.to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(site.timeout_secs))
            .build()
            .map_err(|e| {
                PublishError::Communication(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            site,
            password,
            client,
        })
    }

    /// The site this client publishes to
    pub fn site(&self) -> &SiteConfig {
        &self.site
    }

    async fn check(response: reqwest::Response, url: &str) -> Result<reqwest::Response, PublishError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if matches!(
            status,
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN
        ) {
            return Err(PublishError::Unauthorized {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        warn!(%status, url, "WordPress request failed");
        Err(PublishError::Status {
            status: status.as_u16(),
            url: url.to_string(),
            body,
        })
    }

    async fn created_id(response: reqwest::Response) -> Result<u64, PublishError> {
        let created: Created = response
            .json()
            .await
            .map_err(|e| PublishError::InvalidResponse(format!("Missing id in response: {}", e)))?;
        Ok(created.id)
    }
}

#[async_trait]
impl Publisher for WordPressClient {
    type Error = PublishError;

    async fn publish(&self, request: &PublishRequest) -> Result<PostId, Self::Error> {
        let url = self.site.endpoint(&format!(
            "/wp-json/wp/v2/{}",
            self.site.content_type.collection()
        ));
        let body = PostBody {
            title: &request.title,
            content: &request.html_content,
            slug: &request.slug,
            excerpt: &request.excerpt,
            status: request.status,
            meta_input: YoastMeta {
                title: &request.seo_title,
                description: &request.seo_description,
                focus_keyword: &request.focus_keyword,
            },
            featured_media: request.featured_media_id.map(|id| id.0),
            categories: &request.categories,
            tags: &request.categories,
        };

        debug!(url = %url, title = %request.title, "Submitting article");
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.site.username, Some(&self.password))
            .json(&body)
            .send()
            .await?;

        let post_id = PostId(Self::created_id(Self::check(response, &url).await?).await?);
        info!(post_id = %post_id, title = %request.title, "Article submitted as draft");
        Ok(post_id)
    }

    async fn upload_media(
        &self,
        image: &GeneratedImage,
        filename: &str,
    ) -> Result<MediaId, Self::Error> {
        let bytes = base64::engine::general_purpose::STANDARD.decode(image.b64_data.trim())?;
        let url = self.site.endpoint("/wp-json/wp/v2/media");

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str("image/png")?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("alt_text", image.alt_text.clone())
            .text("title", image.alt_text.clone());

        debug!(url = %url, filename, "Uploading image");
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.site.username, Some(&self.password))
            .multipart(form)
            .send()
            .await?;
        let media_id = MediaId(Self::created_id(Self::check(response, &url).await?).await?);

        // The upload form does not always set alt text, so patch it explicitly
        let update_url = format!("{}/{}", url, media_id);
        let patched = self
            .client
            .patch(&update_url)
            .basic_auth(&self.site.username, Some(&self.password))
            .json(&MediaMeta {
                alt_text: &image.alt_text,
                title: &image.alt_text,
            })
            .send()
            .await;
        match patched {
            Ok(response) if response.status().is_success() => {}
            Ok(response) => warn!(
                media_id = %media_id,
                status = %response.status(),
                "Alt text update failed"
            ),
            Err(e) => warn!(media_id = %media_id, "Alt text update failed: {}", e),
        }

        info!(media_id = %media_id, "Image uploaded");
        Ok(media_id)
    }

    fn edit_url(&self, post_id: PostId) -> String {
        self.site.edit_url(post_id)
    }
}
