//! Article module - the canonical structured result of a generation request
//!
//! An [`ArticleDocument`] is built once per request from repaired model
//! output, optionally extended with a promotional image or merged with
//! supplementary articles, then handed read-only to rendering and publishing.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// A generated article
///
/// Serialized as UTF-8 JSON, which is both the interchange format between
/// pipeline stages and the session-cached representation.
///
/// # Examples
///
/// ```
/// use quill_domain::{ArticleContent, ArticleDocument, Intro, Seo};
///
/// let doc = ArticleDocument {
///     title: "Bitcoin Rally".to_string(),
///     content: ArticleContent {
///         intro: Intro::Text("Price surged".to_string()),
///         sections: vec![],
///         conclusion: "Stay tuned".to_string(),
///     },
///     seo: Seo::default(),
///     media: Default::default(),
///     sources: vec![],
/// };
///
/// let json = doc.to_json().unwrap();
/// assert_eq!(ArticleDocument::from_json(&json).unwrap(), doc);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleDocument {
    /// Article headline
    pub title: String,

    /// Body of the article
    pub content: ArticleContent,

    /// Search metadata
    #[serde(default)]
    pub seo: Seo,

    /// Images and social embeds referenced by the article
    #[serde(default)]
    pub media: Media,

    /// Sources the article was written from
    #[serde(default)]
    pub sources: Vec<SourceRef>,
}

/// Body of an article: intro, ordered sections, conclusion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleContent {
    /// Opening text, either one block or the two-part form
    pub intro: Intro,

    /// Ordered body sections
    #[serde(default)]
    pub sections: Vec<Section>,

    /// Closing paragraph
    pub conclusion: String,
}

/// Article introduction
///
/// The two-part form carries the meta-description lead in `Part1` and an
/// overview paragraph in `Part2`. The spaced spelling (`"Part 1"`) that
/// models frequently emit is accepted on input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Intro {
    /// Single intro block
    Text(String),

    /// Two-part intro
    TwoPart {
        /// Lead paragraph (doubles as meta description)
        #[serde(rename = "Part1", alias = "Part 1", alias = "part1")]
        part1: String,

        /// Overview paragraph
        #[serde(rename = "Part2", alias = "Part 2", alias = "part2", default)]
        part2: String,
    },
}

impl Intro {
    /// The lead text: the whole intro, or its first part
    pub fn lead(&self) -> &str {
        match self {
            Intro::Text(text) => text,
            Intro::TwoPart { part1, .. } => part1,
        }
    }

    /// Every intro paragraph, in order, skipping empty parts
    pub fn paragraphs(&self) -> Vec<&str> {
        match self {
            Intro::Text(text) => vec![text.as_str()],
            Intro::TwoPart { part1, part2 } => [part1.as_str(), part2.as_str()]
                .into_iter()
                .filter(|p| !p.trim().is_empty())
                .collect(),
        }
    }

    /// The full intro joined with blank lines
    pub fn full_text(&self) -> String {
        self.paragraphs().join("\n\n")
    }

    /// Whether the intro carries no text at all
    pub fn is_empty(&self) -> bool {
        match self {
            Intro::Text(text) => text.trim().is_empty(),
            Intro::TwoPart { part1, part2 } => part1.trim().is_empty() && part2.trim().is_empty(),
        }
    }
}

impl Default for Intro {
    fn default() -> Self {
        Intro::Text(String::new())
    }
}

/// A body section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// H2 heading
    pub heading: String,

    /// How `paragraphs` should be presented
    #[serde(default)]
    pub format: SectionFormat,

    /// Section body; never a bare scalar after normalization, may be empty
    #[serde(default)]
    pub paragraphs: Vec<Paragraph>,
}

/// Presentation format of a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionFormat {
    /// Explanatory prose
    #[default]
    Paragraph,
    /// Bulleted list
    List,
    /// Table rows
    Table,
}

impl SectionFormat {
    /// Parse a format name, case-insensitively
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "paragraph" | "paragraphs" | "text" => Some(SectionFormat::Paragraph),
            "list" | "bullets" => Some(SectionFormat::List),
            "table" => Some(SectionFormat::Table),
            _ => None,
        }
    }
}

/// One entry of a section body
///
/// Paragraph and list sections hold text; table sections hold either
/// markdown table lines, rows of cells, or records keyed by column name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Paragraph {
    /// Prose, a list item, or a markdown table line
    Text(String),
    /// Table row as ordered cells
    Row(Vec<String>),
    /// Table row keyed by column header
    Record(Map<String, Value>),
}

impl Paragraph {
    /// Flatten to display text
    pub fn as_text(&self) -> String {
        match self {
            Paragraph::Text(text) => text.clone(),
            Paragraph::Row(cells) => cells.join(" | "),
            Paragraph::Record(record) => record
                .values()
                .map(value_to_text)
                .collect::<Vec<_>>()
                .join(" | "),
        }
    }
}

/// Render a JSON scalar as plain text (strings without quotes)
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Search metadata for the CMS
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Seo {
    /// URL slug
    pub slug: String,
    /// SEO title
    pub meta_title: String,
    /// Meta description
    pub meta_description: String,
    /// One-sentence summary
    pub excerpt: String,
    /// English prompt for the illustration
    pub image_prompt: String,
    /// Alt text for the illustration
    pub alt_text: String,
}

impl Seo {
    /// Names and values of every field, in declaration order
    pub fn fields(&self) -> [(&'static str, &str); 6] {
        [
            ("slug", &self.slug),
            ("metaTitle", &self.meta_title),
            ("metaDescription", &self.meta_description),
            ("excerpt", &self.excerpt),
            ("imagePrompt", &self.image_prompt),
            ("altText", &self.alt_text),
        ]
    }

    /// Whether every field is non-empty
    pub fn is_complete(&self) -> bool {
        self.fields().iter().all(|(_, v)| !v.trim().is_empty())
    }
}

/// Images and embeds attached to an article
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Media {
    /// Images
    #[serde(default)]
    pub images: Vec<ImageRef>,

    /// Twitter/X posts to embed
    #[serde(default, rename = "twitterEmbeds", alias = "twitter_embeds")]
    pub twitter_embeds: Vec<EmbedRef>,
}

impl Media {
    /// Whether there is no media at all
    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.twitter_embeds.is_empty()
    }
}

/// Reference to an image
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImageRef {
    /// Image URL
    pub url: String,

    /// Alt text
    #[serde(default, alias = "altText", alias = "alt")]
    pub alt_text: String,

    /// Where the image belongs, e.g. `sections[1]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<String>,

    /// Surrounding source text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Display width in pixels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    /// Display height in pixels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// Reference to a social media post
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EmbedRef {
    /// Post URL
    pub url: String,

    /// Where the embed belongs, e.g. `sections[0]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<String>,

    /// Surrounding source text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// A cited source
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceRef {
    /// Source domain
    #[serde(default)]
    pub domain: String,
    /// Source URL
    #[serde(default)]
    pub url: String,
}

/// Placement marker for the section at `index`
pub fn section_placement(index: usize) -> String {
    format!("sections[{}]", index)
}

/// Whether `placement` points into the section at `index`
pub fn is_placed_in_section(placement: Option<&str>, index: usize) -> bool {
    placement
        .map(|p| p.trim().starts_with(&section_placement(index)))
        .unwrap_or(false)
}

impl ArticleDocument {
    /// Serialize to the UTF-8 JSON interchange format
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from the UTF-8 JSON interchange format
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Append an image unless one with the same URL is already attached
    pub fn append_image(&mut self, image: ImageRef) -> bool {
        if self.media.images.iter().any(|i| i.url == image.url) {
            return false;
        }
        self.media.images.push(image);
        true
    }

    /// Fold supplementary articles into this one
    ///
    /// Sections are appended until `max_sections` is reached, skipping any
    /// whose heading already exists. Images and embeds are merged, keyed by URL.
    /// Returns the number of sections added.
    pub fn merge_supplementary(&mut self, others: &[ArticleDocument], max_sections: usize) -> usize {
        let mut added = 0;
        let budget = max_sections.saturating_sub(self.content.sections.len());

        'outer: for other in others {
            for section in &other.content.sections {
                if added >= budget {
                    break 'outer;
                }
                if self
                    .content
                    .sections
                    .iter()
                    .any(|s| s.heading == section.heading)
                {
                    continue;
                }
                self.content.sections.push(section.clone());
                added += 1;
            }
        }

        let mut image_urls: HashSet<String> =
            self.media.images.iter().map(|i| i.url.clone()).collect();
        let mut embed_urls: HashSet<String> = self
            .media
            .twitter_embeds
            .iter()
            .map(|e| e.url.clone())
            .collect();

        for other in others {
            for image in &other.media.images {
                if image_urls.insert(image.url.clone()) {
                    self.media.images.push(image.clone());
                }
            }
            for embed in &other.media.twitter_embeds {
                if embed_urls.insert(embed.url.clone()) {
                    self.media.twitter_embeds.push(embed.clone());
                }
            }
        }

        added
    }
}
