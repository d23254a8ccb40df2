//! Together AI image provider
//!
//! Calls the OpenAI-compatible `/v1/images/generations` endpoint and returns
//! the image as base64 so the publisher can upload it without touching disk.

use crate::{resolve_api_key, LlmError};
use async_trait::async_trait;
use quill_domain::traits::ImageGenerator;
use quill_domain::GeneratedImage;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, warn};

/// Default Together API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.together.xyz";

/// Default image model
pub const DEFAULT_MODEL: &str = "black-forest-labs/FLUX.1-schnell-free";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "TOGETHER_API_KEY";

/// Prompt used when the requested prompt is empty after cleanup
pub const FALLBACK_PROMPT: &str =
    "A photo-realistic scene of cryptocurrencies floating in the air, depicting the Crypto news";

/// Alt text used when none is supplied
pub const DEFAULT_ALT_TEXT: &str = "Generated cryptocurrency image";

/// Configuration for the Together image provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TogetherConfig {
    /// API base URL
    pub endpoint: String,
    /// Model name
    pub model: String,
    /// API key; falls back to `TOGETHER_API_KEY`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Diffusion steps
    pub steps: u32,
    /// Per-request timeout (seconds)
    pub timeout_secs: u64,
}

impl Default for TogetherConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            width: 1200,
            height: 800,
            steps: 4,
            timeout_secs: 60,
        }
    }
}

/// Together AI image generation provider
pub struct TogetherImageProvider {
    config: TogetherConfig,
    api_key: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for TogetherImageProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TogetherImageProvider")
            .field("endpoint", &self.config.endpoint)
            .field("model", &self.config.model)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    width: u32,
    height: u32,
    steps: u32,
    n: u32,
    response_format: &'a str,
}

#[derive(Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    b64_json: Option<String>,
}

static THAI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\u{0E00}-\u{0E7F}]+").expect("valid regex"));

/// Strip Thai script from an image prompt
///
/// The image model only understands English prompts; Thai fragments are
/// removed and whitespace is collapsed. An empty result falls back to
/// [`FALLBACK_PROMPT`].
pub fn clean_prompt(prompt: &str) -> String {
    let stripped = THAI_RE.replace_all(prompt, " ");
    let cleaned = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        FALLBACK_PROMPT.to_string()
    } else {
        cleaned
    }
}

impl TogetherImageProvider {
    /// Create a new Together image provider
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::MissingApiKey`] when no key is configured.
    pub fn new(config: TogetherConfig) -> Result<Self, LlmError> {
        let api_key = resolve_api_key(config.api_key.as_deref(), API_KEY_ENV)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            config,
            api_key,
            client,
        })
    }

    /// Request a single image for `prompt`
    pub async fn request_image(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!(
            "{}/v1/images/generations",
            self.config.endpoint.trim_end_matches('/')
        );
        let body = ImageRequest {
            model: &self.config.model,
            prompt,
            width: self.config.width,
            height: self.config.height,
            steps: self.config.steps,
            n: 1,
            response_format: "b64_json",
        };

        debug!(model = %self.config.model, "Requesting image");

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(Duration::from_secs(self.config.timeout_secs))
                } else {
                    LlmError::from(e)
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimitExceeded);
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(%status, "Image generation failed");
            return Err(LlmError::Communication(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let parsed: ImageResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        parsed
            .data
            .into_iter()
            .next()
            .and_then(|d| d.b64_json)
            .filter(|b64| !b64.is_empty())
            .ok_or_else(|| LlmError::InvalidResponse("No image data in response".to_string()))
    }
}

#[async_trait]
impl ImageGenerator for TogetherImageProvider {
    type Error = LlmError;

    async fn generate_image(
        &self,
        prompt: &str,
        alt_text: Option<&str>,
    ) -> Result<GeneratedImage, Self::Error> {
        let prompt = clean_prompt(prompt);
        let b64_data = self.request_image(&prompt).await?;
        let alt_text = alt_text
            .map(str::trim)
            .filter(|alt| !alt.is_empty())
            .unwrap_or(DEFAULT_ALT_TEXT)
            .to_string();

        Ok(GeneratedImage {
            b64_data,
            alt_text,
            prompt,
        })
    }
}
