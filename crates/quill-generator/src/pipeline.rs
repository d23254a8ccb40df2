//! Sources in, validated article out

use crate::config::{find_promotion, Promotion};
use crate::error::PipelineError;
use crate::generator::ArticleGenerator;
use crate::normalize::prepare_sources;
use crate::prompt::ArticlePromptBuilder;
use crate::session::SessionState;
use crate::validate::ValidationContext;
use quill_domain::article::section_placement;
use quill_domain::traits::{ImageGenerator, LlmProvider};
use quill_domain::{ArticleDocument, GeneratedImage, SourceDocument};
use quill_llm::LlmError;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// One article generation request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Extracted source material
    pub sources: Vec<SourceDocument>,
    /// Primary SEO keyword
    pub primary_keyword: String,
    /// Secondary SEO keywords
    #[serde(default)]
    pub secondary_keywords: Vec<String>,
    /// Angle the article should take
    #[serde(default)]
    pub news_angle: String,
    /// Body sections to request, or the configured default
    #[serde(default)]
    pub section_count: Option<usize>,
    /// Name of the promotion to feature, if any
    #[serde(default)]
    pub promotion: Option<String>,
    /// Required slug suffix of the target site
    #[serde(default)]
    pub slug_suffix: Option<String>,
    /// Fall back to lenient validation once the attempt budget is spent
    #[serde(default)]
    pub lenient: bool,
}

/// Runs normalization, prompting, generation and post-processing
///
/// The pipeline holds no per-user state: callers pass the session's
/// [`SessionState`] in and receive the updated state back.
pub struct ArticlePipeline<L>
where
    L: LlmProvider<Error = LlmError>,
{
    generator: ArticleGenerator<L>,
    promotions: Vec<Promotion>,
}

impl<L> ArticlePipeline<L>
where
    L: LlmProvider<Error = LlmError> + 'static,
{
    /// Create a pipeline around `generator`
    pub fn new(generator: ArticleGenerator<L>) -> Self {
        Self {
            generator,
            promotions: Vec::new(),
        }
    }

    /// Set the promotion catalog requests may select from
    pub fn with_promotions(mut self, promotions: Vec<Promotion>) -> Self {
        self.promotions = promotions;
        self
    }

    /// Generate a validated article for `request`
    ///
    /// On success the returned state caches the article JSON and the raw
    /// model response. Other fields of `state` carry over unchanged.
    ///
    /// # Errors
    ///
    /// [`PipelineError::NoSources`] when no source has usable text,
    /// [`PipelineError::Generation`] when generation fails.
    pub async fn run(
        &self,
        request: GenerationRequest,
        state: SessionState,
    ) -> Result<(ArticleDocument, SessionState), PipelineError> {
        let prepared = prepare_sources(&request.sources);
        if prepared.is_empty() {
            return Err(PipelineError::NoSources);
        }

        let config = self.generator.config();
        let promotion = match request.promotion.as_deref() {
            Some(name) => {
                let found = find_promotion(&self.promotions, name);
                if found.is_none() {
                    warn!(promotion = name, "Unknown promotion, generating without it");
                }
                found.cloned()
            }
            None => None,
        };

        info!(
            sources = request.sources.len(),
            images = prepared.images.len(),
            embeds = prepared.twitter_embeds.len(),
            keyword = %request.primary_keyword,
            "Preparing article generation"
        );

        let prompt = ArticlePromptBuilder::new(prepared, request.primary_keyword.clone())
            .with_secondary_keywords(request.secondary_keywords.clone())
            .with_news_angle(request.news_angle.clone())
            .with_section_count(request.section_count.unwrap_or(config.section_count))
            .with_promotion(promotion.clone())
            .with_slug_suffix(request.slug_suffix.clone())
            .build();

        let ctx = ValidationContext::new(request.primary_keyword.clone()).with_locale(config.locale);
        let generated = if request.lenient {
            self.generator.generate_lenient(&prompt, &ctx).await?
        } else {
            self.generator.generate(&prompt, &ctx).await?
        };

        let mut document = generated.document;
        if let Some(promotion) = &promotion {
            let mut banner = promotion.image_ref();
            banner.placement = document
                .content
                .sections
                .len()
                .checked_sub(1)
                .map(section_placement);
            if document.append_image(banner) {
                info!(promotion = %promotion.name, "Appended promotional image");
            }
        }

        let new_state = SessionState {
            last_article: Some(document.to_json()?),
            last_raw_response: Some(generated.raw_response),
            ..state
        };

        info!(
            title = %document.title,
            sections = document.content.sections.len(),
            attempts = generated.attempts,
            stage = %generated.stage,
            "Article generated"
        );

        Ok((document, new_state))
    }
}

/// Generate the featured illustration for `document`
///
/// Illustration is optional: a provider failure is logged and yields `None`.
pub async fn illustrate<I>(images: &I, document: &ArticleDocument) -> Option<GeneratedImage>
where
    I: ImageGenerator,
{
    let prompt = document.seo.image_prompt.trim();
    if prompt.is_empty() {
        warn!("Article has no image prompt, skipping illustration");
        return None;
    }

    let alt = Some(document.seo.alt_text.as_str()).filter(|alt| !alt.trim().is_empty());
    match images.generate_image(prompt, alt).await {
        Ok(image) => {
            info!("Featured image generated");
            Some(image)
        }
        Err(e) => {
            warn!("Image generation failed: {}", e);
            None
        }
    }
}
