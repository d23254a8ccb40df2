//! YouTube video detection and caption transcripts

use crate::error::SourceError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Default caption endpoint host
pub const DEFAULT_ENDPOINT: &str = "https://www.youtube.com";

static VIDEO_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Za-z_-]{11}$").expect("valid regex"));

static CAPTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<text\b[^>]*>(.*?)</text>").expect("valid regex"));

static NUMERIC_ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#(x[0-9A-Fa-f]+|[0-9]+);").expect("valid regex"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// The 11-character video id of a YouTube URL
///
/// Recognizes `watch?v=`, `youtu.be/`, `/shorts/`, `/embed/` and `/live/`
/// forms. Any other URL yields `None`.
///
/// # Examples
///
/// ```
/// use quill_sources::youtube_video_id;
///
/// assert_eq!(
///     youtube_video_id("https://youtu.be/dQw4w9WgXcQ?t=42").as_deref(),
///     Some("dQw4w9WgXcQ")
/// );
/// assert_eq!(youtube_video_id("https://coindesk.com/markets/bitcoin-price"), None);
/// ```
pub fn youtube_video_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?.trim_start_matches("www.").trim_start_matches("m.");

    let candidate = match host {
        "youtu.be" => parsed.path_segments()?.next().map(str::to_string),
        "youtube.com" | "music.youtube.com" | "youtube-nocookie.com" => {
            let mut segments = parsed.path_segments()?;
            match segments.next() {
                Some("watch") => parsed
                    .query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.into_owned()),
                Some("shorts" | "embed" | "live" | "v") => segments.next().map(str::to_string),
                _ => None,
            }
        }
        _ => None,
    }?;

    VIDEO_ID_RE.is_match(&candidate).then_some(candidate)
}

/// Configuration for caption retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptConfig {
    /// Caption service base URL
    pub endpoint: String,
    /// Caption language
    pub language: String,
    /// Per-request timeout (seconds)
    pub timeout_secs: u64,
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            language: "en".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Fetches caption tracks and flattens them to plain text
#[derive(Debug, Clone)]
pub struct TranscriptFetcher {
    config: TranscriptConfig,
    client: reqwest::Client,
}

impl TranscriptFetcher {
    /// Create a fetcher
    pub fn new(config: TranscriptConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SourceError::Communication(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    /// Transcript text of `video_id`
    ///
    /// # Errors
    ///
    /// [`SourceError::NoTranscript`] when the video has no captions in the
    /// configured language.
    pub async fn fetch(&self, video_id: &str) -> Result<String, SourceError> {
        let url = format!(
            "{}/api/timedtext",
            self.config.endpoint.trim_end_matches('/')
        );
        debug!(video_id, language = %self.config.language, "Fetching captions");

        let response = self
            .client
            .get(&url)
            .query(&[("lang", self.config.language.as_str()), ("v", video_id)])
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::NoTranscript(video_id.to_string()));
        }
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let text = flatten_captions(&response.text().await?);
        if text.is_empty() {
            return Err(SourceError::NoTranscript(video_id.to_string()));
        }

        info!(video_id, chars = text.len(), "Transcript fetched");
        Ok(text)
    }
}

/// Join the `<text>` segments of a caption track into one string
pub fn flatten_captions(xml: &str) -> String {
    let joined = CAPTION_RE
        .captures_iter(xml)
        .filter_map(|caps| caps.get(1))
        .map(|m| decode_entities(m.as_str()))
        .collect::<Vec<_>>()
        .join(" ");
    WHITESPACE_RE.replace_all(&joined, " ").trim().to_string()
}

fn decode_entities(text: &str) -> String {
    // Caption text is escaped twice (`&amp;#39;`), so `&amp;` goes first
    let once = text.replace("&amp;", "&");
    NUMERIC_ENTITY_RE
        .replace_all(&once, |caps: &regex::Captures<'_>| {
            let code = &caps[1];
            let value = match code.strip_prefix('x') {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => code.parse::<u32>().ok(),
            };
            value
                .and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_default()
        })
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
}
