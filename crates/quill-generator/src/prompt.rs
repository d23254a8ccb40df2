//! Prompt construction for article generation

use crate::config::Promotion;
use crate::normalize::PreparedSources;
use quill_domain::{EmbedRef, ImageRef};

/// Builds the generation prompt from prepared sources and SEO settings
#[derive(Debug, Clone)]
pub struct ArticlePromptBuilder {
    sources: PreparedSources,
    primary_keyword: String,
    secondary_keywords: Vec<String>,
    news_angle: String,
    section_count: usize,
    promotion: Option<Promotion>,
    slug_suffix: Option<String>,
}

impl ArticlePromptBuilder {
    /// Create a builder for `sources` targeting `primary_keyword`
    pub fn new(sources: PreparedSources, primary_keyword: impl Into<String>) -> Self {
        Self {
            sources,
            primary_keyword: primary_keyword.into(),
            secondary_keywords: Vec::new(),
            news_angle: String::new(),
            section_count: 3,
            promotion: None,
            slug_suffix: None,
        }
    }

    /// Add secondary keywords
    pub fn with_secondary_keywords(mut self, keywords: Vec<String>) -> Self {
        self.secondary_keywords = keywords;
        self
    }

    /// Set the news angle
    pub fn with_news_angle(mut self, angle: impl Into<String>) -> Self {
        self.news_angle = angle.into();
        self
    }

    /// Set the number of body sections to request
    pub fn with_section_count(mut self, count: usize) -> Self {
        self.section_count = count.max(1);
        self
    }

    /// Dedicate the last section to a promotion
    pub fn with_promotion(mut self, promotion: Option<Promotion>) -> Self {
        self.promotion = promotion;
        self
    }

    /// Require the generated slug to end with `suffix` (e.g. `-thailand`)
    pub fn with_slug_suffix(mut self, suffix: Option<String>) -> Self {
        self.slug_suffix = suffix.filter(|s| !s.trim().is_empty());
        self
    }

    /// Build the complete generation prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        // 1. Role and task
        prompt.push_str(ROLE_INSTRUCTIONS);
        prompt.push_str("\n\n");

        prompt.push_str(&format!("Primary Keyword: {}\n", self.primary_keyword));
        prompt.push_str(&format!(
            "Secondary Keywords: {}\n",
            self.secondary_keywords.join(", ")
        ));
        prompt.push_str(&format!("News Angle: {}\n", self.news_angle));

        // 2. Keyword placement
        prompt.push_str(&self.seo_guidelines());

        // 3. Media and promotion (only when present)
        prompt.push_str(&media_instructions(
            &self.sources.images,
            &self.sources.twitter_embeds,
        ));
        if let Some(promotion) = &self.promotion {
            prompt.push_str(&self.promotional_instructions(promotion));
        }

        // 4. Output shape
        prompt.push_str(&self.output_structure());
        prompt.push_str(CONTENT_GUIDELINES);

        // 5. The sources themselves
        prompt.push_str("\nBelow is the source content (in markdown):\n");
        prompt.push_str(&self.sources.text);
        prompt.push_str("\n\n");

        prompt.push_str(OUTPUT_FORMAT_REMINDER);

        prompt
    }

    fn seo_guidelines(&self) -> String {
        format!(
            r#"
SEO Guidelines:
1. Primary Keyword ({primary}) Distribution:
   - Title: Include naturally in the first half (1x)
   - First Paragraph: Include naturally (1x)
   - H2 Headings: Include in at least 2 headings
   - Body content: Include naturally 5 times where relevant
   - Meta Description: Include naturally (1x)
   - Keep the keyword in its original form (Thai/English) while fitting the sentence.

2. Secondary Keywords ({secondary}) Usage:
   - Include in 2 H2 headings where relevant
   - Use naturally in supporting paragraphs
   - Maximum density: 3% (3 mentions per 100 words)
"#,
            primary = self.primary_keyword,
            secondary = self.secondary_keywords.join(", "),
        )
    }

    fn promotional_instructions(&self, promotion: &Promotion) -> String {
        format!(
            r#"
The LAST section (before conclusion) MUST be dedicated to this promotional content: {name}. This section should:
- Flow naturally with the rest of the article
- Mention {keyword} at least twice
- Include the following promotional image in its first paragraph: {image}
- Use the format that best presents the content (paragraph, list, or table)
"#,
            name = promotion.name,
            keyword = self.primary_keyword,
            image = promotion.image_url,
        )
    }

    fn output_structure(&self) -> String {
        let suffix = self
            .slug_suffix
            .as_ref()
            .map(|s| format!(r#" and end with "{}""#, s))
            .unwrap_or_default();

        format!(
            r#"
Structure your output as valid JSON with the following keys:
- title: An engaging title (max 60 characters) with {keyword} in the first half.
- content: An object with:
   - intro: Two-part introduction:
     - Part 1: A compelling 160-character paragraph that doubles as the meta description, with {keyword} included
     - Part 2: A paragraph that expands on the introduction and gives an overview of the article
   - sections: An array of exactly {count} objects, each with:
     - heading: H2 heading using power words (include {keyword} where natural)
     - format: The most appropriate format for this section:
       - 'paragraph': Explanatory content (default), 2-3 detailed paragraphs of 3-4 sentences
       - 'list': Steps, features or benefits, each item explained in 2-3 sentences
       - 'table': Comparisons or data, each cell explained in 2-3 sentences
     - paragraphs: The section body as an array
   - conclusion: A paragraph summarizing the key points and mentioning {keyword} naturally.
- sources: An array of objects with keys "domain" and "url" for each source.
- media: An object with:
   - images: Array of image objects with url, alt_text, and placement (e.g. "sections[0]")
   - twitter_embeds: Array of Twitter/X embed objects with url and placement
- seo: An object with keys:
   - slug: English URL-friendly slug that MUST include {keyword}{suffix}
   - metaTitle: Thai title with {keyword}
   - metaDescription: The same text as Part 1 of the intro
   - excerpt: One Thai sentence summary
   - imagePrompt: English only. A photorealistic scene that fits the article
   - altText: Thai ALT text with {keyword}, keeping technical terms in English
"#,
            keyword = self.primary_keyword,
            count = self.section_count,
            suffix = suffix,
        )
    }
}

fn media_instructions(images: &[ImageRef], embeds: &[EmbedRef]) -> String {
    if images.is_empty() && embeds.is_empty() {
        return String::new();
    }

    let mut out = String::from("\nMedia Content:\n");

    if !images.is_empty() {
        out.push_str("1. Images to include:\n");
        for (i, image) in images.iter().enumerate() {
            out.push_str(&format!("   Image {}: URL: {}\n", i + 1, image.url));
            out.push_str(&format!("   Alt Text: {}\n", image.alt_text));
            if let Some(context) = &image.context {
                out.push_str(&format!("   Context: {}\n", context));
            }
        }
        out.push_str(
            "   Instructions: Place these images at appropriate locations within relevant paragraphs.\n",
        );
    }

    if !embeds.is_empty() {
        out.push_str("\n2. Twitter/X Posts to Embed:\n");
        for (i, embed) in embeds.iter().enumerate() {
            out.push_str(&format!("   Embed {}: {}\n", i + 1, embed.url));
            if let Some(context) = &embed.context {
                out.push_str(&format!("   Context: {}\n", context));
            }
        }
        out.push_str(
            "   Instructions: Embed these Twitter/X posts at appropriate locations within the article.\n",
        );
    }

    out
}

const ROLE_INSTRUCTIONS: &str = "You are an expert Thai crypto journalist and SEO specialist. \
Using ONLY the exact source content provided below, craft an SEO-optimized article in Thai. \
DO NOT invent or modify any factual details. Your article must faithfully reflect the provided source text.";

const CONTENT_GUIDELINES: &str = r#"
IMPORTANT NOTES:
1. Content Balance:
   - Main Content (70%): News, analysis, and key information.
   - Promotional Content (30%): Integrated naturally if provided.
2. Media Integration:
   - Place images near the content they relate to.
3. General:
   - Maintain a consistent tone and style.
   - Preserve any image markdown exactly as provided.
   - Keep technical terms and entity names in English; write the rest in Thai.
"#;

const OUTPUT_FORMAT_REMINDER: &str =
    "Return ONLY valid JSON, no markdown code blocks, no additional commentary.";
