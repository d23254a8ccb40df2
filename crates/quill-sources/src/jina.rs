//! Web page extraction through the Jina reader
//!
//! The reader (`GET {endpoint}/{url}`) returns a plain-text envelope with a
//! `Title:` line and the page body after a `Markdown Content:` marker. Images
//! and tweet links are pulled out of the markdown so the model can place them.

use crate::error::SourceError;
use quill_domain::{EmbedRef, ImageRef, Media, SourceDocument};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info};

/// Default reader endpoint
pub const DEFAULT_ENDPOINT: &str = "https://r.jina.ai";

/// Title used when the reader reports none
pub const DEFAULT_TITLE: &str = "Extracted Content";

/// Most images kept per page
pub const MAX_IMAGES: usize = 5;

/// Minimum length of the text around an image for it to count as content
pub const MIN_IMAGE_CONTEXT: usize = 50;

const MARKDOWN_MARKER: &str = "Markdown Content:";

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^Title:[ \t]*(.*)$").expect("valid regex"));

static IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[(.*?)\]\((.*?)\)").expect("valid regex"));

static SIDEBAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"icon|logo|sidebar|banner|ad-|advertisement|promo-|sponsor|\d+x\d+|tracking|pixel|\.(?:svg|gif)$",
    )
    .expect("valid regex")
});

static TWEET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:www\.)?(?:twitter\.com|x\.com)/[A-Za-z0-9_]+/status/\d+")
        .expect("valid regex")
});

/// Configuration for the Jina reader
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JinaConfig {
    /// Reader base URL
    pub endpoint: String,
    /// Optional API key for higher rate limits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Per-request timeout (seconds)
    pub timeout_secs: u64,
}

impl Default for JinaConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            timeout_secs: 60,
        }
    }
}

/// Client for the Jina reader
#[derive(Debug, Clone)]
pub struct JinaReader {
    config: JinaConfig,
    client: reqwest::Client,
}

impl JinaReader {
    /// Create a reader client
    pub fn new(config: JinaConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SourceError::Communication(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    /// Fetch and parse `url`
    ///
    /// # Errors
    ///
    /// [`SourceError::Status`] for a non-2xx reply, [`SourceError::Empty`]
    /// when the page has no text, [`SourceError::Communication`] otherwise.
    pub async fn read(&self, url: &str) -> Result<SourceDocument, SourceError> {
        let reader_url = format!("{}/{}", self.config.endpoint.trim_end_matches('/'), url);
        debug!(url, "Fetching page through reader");

        let mut request = self.client.get(&reader_url);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let document = parse_reader_output(url, &body);
        if document.content.trim().is_empty() {
            return Err(SourceError::Empty(url.to_string()));
        }

        info!(
            url,
            chars = document.content.len(),
            images = document.media.images.len(),
            embeds = document.media.twitter_embeds.len(),
            "Page extracted"
        );
        Ok(document)
    }
}

/// Turn a reader response body into a source document
pub fn parse_reader_output(url: &str, body: &str) -> SourceDocument {
    let title = TITLE_RE
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    let markdown = match body.find(MARKDOWN_MARKER) {
        Some(idx) => body[idx + MARKDOWN_MARKER.len()..].trim(),
        None => body.trim(),
    };

    let images = content_images(markdown);
    let twitter_embeds = tweet_embeds(markdown);

    let mut content = markdown.to_string();
    for embed in &twitter_embeds {
        content = content.replace(&embed.url, "");
    }

    SourceDocument {
        title,
        url: url.to_string(),
        content,
        source: source_name(url),
        media: Media {
            images,
            twitter_embeds,
        },
    }
}

/// Host of `url` without a `www.` prefix, or the URL itself
fn source_name(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
        .unwrap_or_else(|| url.to_string())
}

/// The line around `start..end`, if text sits on both sides of the span
fn surrounding_line(text: &str, start: usize, end: usize) -> Option<&str> {
    let line_start = text[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line_end = text[end..].find('\n').map(|i| end + i).unwrap_or(text.len());
    if line_start == start || line_end == end {
        return None;
    }
    Some(&text[line_start..line_end])
}

/// Content images of a markdown page
///
/// Images that look like chrome (icons, logos, ad sizes, tracking pixels,
/// svg/gif) are skipped, as are images without a sentence around them.
pub fn content_images(markdown: &str) -> Vec<ImageRef> {
    let mut images = Vec::new();

    for caps in IMAGE_RE.captures_iter(markdown) {
        if images.len() >= MAX_IMAGES {
            break;
        }
        let (Some(whole), Some(alt), Some(src)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };

        if SIDEBAR_RE.is_match(&src.as_str().to_lowercase())
            || SIDEBAR_RE.is_match(&alt.as_str().to_lowercase())
        {
            debug!(url = src.as_str(), "Skipping decorative image");
            continue;
        }

        let context = surrounding_line(markdown, whole.start(), whole.end()).unwrap_or("");
        if context.chars().count() < MIN_IMAGE_CONTEXT {
            debug!(url = src.as_str(), "Skipping image without surrounding text");
            continue;
        }

        images.push(ImageRef {
            url: src.as_str().to_string(),
            alt_text: alt.as_str().to_string(),
            context: Some(context.to_string()),
            ..Default::default()
        });
    }
    images
}

/// Twitter/X status links of a markdown page, deduplicated
pub fn tweet_embeds(markdown: &str) -> Vec<EmbedRef> {
    let mut seen = HashSet::new();
    TWEET_RE
        .find_iter(markdown)
        .filter(|m| seen.insert(m.as_str()))
        .map(|m| EmbedRef {
            url: m.as_str().to_string(),
            placement: None,
            context: surrounding_line(markdown, m.start(), m.end()).map(str::to_string),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = "Title: Bitcoin tops $100k\n\
URL Source: https://coindesk.com/markets/btc\n\
\n\
Markdown Content:\n\
![logo](https://coindesk.com/logo.png)\n\
Bitcoin rallied on Monday as ![price chart](https://cdn.coindesk.com/chart.png) ETF inflows hit a record high for the week.\n\
![ad](https://ads.example/300x250.jpg) sponsored placement with plenty of words around it to pass.\n\
A ![t](https://x.io/t.png) b\n\
Analysts reacted quickly https://x.com/analyst/status/123456 on social media.\n";

    #[test]
    fn test_parse_title_and_body() {
        let doc = parse_reader_output("https://www.coindesk.com/markets/btc", PAGE);
        assert_eq!(doc.title, "Bitcoin tops $100k");
        assert_eq!(doc.source, "coindesk.com");
        assert!(doc.content.starts_with("![logo]"));
        assert!(!doc.content.contains("URL Source"));
    }

    #[test]
    fn test_parse_without_marker_or_title() {
        let doc = parse_reader_output("not a url", "  just text  ");
        assert_eq!(doc.title, DEFAULT_TITLE);
        assert_eq!(doc.content, "just text");
        assert_eq!(doc.source, "not a url");
    }

    #[test]
    fn test_content_images_filtered() {
        let doc = parse_reader_output("https://coindesk.com/a", PAGE);
        let urls: Vec<_> = doc.media.images.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, vec!["https://cdn.coindesk.com/chart.png"]);
        assert_eq!(doc.media.images[0].alt_text, "price chart");
        assert!(doc.media.images[0]
            .context
            .as_deref()
            .unwrap()
            .contains("ETF inflows"));
    }

    #[test]
    fn test_image_limit() {
        let line = "Some long enough leading sentence for context here ![a](https://x.io/p.png) and a tail.\n";
        let markdown = line.repeat(8);
        assert_eq!(content_images(&markdown).len(), MAX_IMAGES);
    }

    #[test]
    fn test_tweets_extracted_and_removed() {
        let doc = parse_reader_output("https://coindesk.com/a", PAGE);
        assert_eq!(doc.media.twitter_embeds.len(), 1);
        assert_eq!(
            doc.media.twitter_embeds[0].url,
            "https://x.com/analyst/status/123456"
        );
        assert!(!doc.content.contains("x.com/analyst"));
    }

    #[test]
    fn test_tweets_deduplicated() {
        let md = "a https://twitter.com/u/status/1 b\nc https://twitter.com/u/status/1 d";
        assert_eq!(tweet_embeds(md).len(), 1);
    }

    #[tokio::test]
    async fn test_read_fetches_through_reader() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex("coindesk"))
            .and(header("authorization", "Bearer jina-key"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;

        let reader = JinaReader::new(JinaConfig {
            endpoint: server.uri(),
            api_key: Some("jina-key".to_string()),
            ..Default::default()
        })
        .unwrap();

        let doc = reader.read("https://coindesk.com/markets/btc").await.unwrap();
        assert_eq!(doc.title, "Bitcoin tops $100k");
        assert_eq!(doc.url, "https://coindesk.com/markets/btc");
    }

    #[tokio::test]
    async fn test_read_maps_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(451))
            .mount(&server)
            .await;

        let reader = JinaReader::new(JinaConfig {
            endpoint: server.uri(),
            ..Default::default()
        })
        .unwrap();

        assert!(matches!(
            reader.read("https://blocked.example/a").await,
            Err(SourceError::Status { status: 451, .. })
        ));
    }

    #[tokio::test]
    async fn test_read_empty_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Title: Empty\nMarkdown Content:\n   "))
            .mount(&server)
            .await;

        let reader = JinaReader::new(JinaConfig {
            endpoint: server.uri(),
            ..Default::default()
        })
        .unwrap();

        assert!(matches!(
            reader.read("https://empty.example").await,
            Err(SourceError::Empty(_))
        ));
    }
}
