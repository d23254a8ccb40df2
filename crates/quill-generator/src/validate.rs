//! Schema validation and default filling for repaired documents
//!
//! The typed [`ArticleDocument`] is built field by field from the repaired
//! JSON value rather than through a derive, so that shape variance in model
//! output (scalar paragraphs, `"Part 1"` keys, an `SEO` key, numeric
//! strings) is absorbed here instead of failing deserialization.

use crate::error::SchemaError;
use quill_domain::article::value_to_text;
use quill_domain::{
    ArticleContent, ArticleDocument, EmbedRef, ImageRef, Intro, Media, Paragraph, Section,
    SectionFormat, Seo, SourceRef,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};
use url::Url;

/// Maximum length of a derived meta description (characters)
pub const META_DESCRIPTION_LEN: usize = 155;

/// Maximum length of a derived excerpt (characters)
pub const EXCERPT_LEN: usize = 100;

/// How missing mandatory fields are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Fail with a [`SchemaError`] on the first missing mandatory field
    Strict,
    /// Never fail; fill templated defaults instead
    Lenient,
}

/// Language of the templated defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Thai
    #[default]
    Thai,
    /// English
    English,
}

/// What the validator needs to know about the request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationContext {
    /// Primary SEO keyword, used by templated defaults
    pub primary_keyword: String,
    /// Language of templated defaults
    pub locale: Locale,
}

impl ValidationContext {
    /// Context for `primary_keyword` in the default locale
    pub fn new(primary_keyword: impl Into<String>) -> Self {
        Self {
            primary_keyword: primary_keyword.into(),
            locale: Locale::default(),
        }
    }

    /// Set the locale
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    fn subject(&self) -> &str {
        let keyword = self.primary_keyword.trim();
        if keyword.is_empty() {
            "crypto"
        } else {
            keyword
        }
    }

    fn default_title(&self) -> String {
        match self.locale {
            Locale::Thai => format!("ข่าวล่าสุดเกี่ยวกับ {}", self.subject()),
            Locale::English => format!("Latest News about {}", self.subject()),
        }
    }

    fn default_intro(&self) -> String {
        match self.locale {
            Locale::Thai => format!("อัปเดตข่าวสารและความเคลื่อนไหวล่าสุดเกี่ยวกับ {}", self.subject()),
            Locale::English => format!("The latest news and developments about {}.", self.subject()),
        }
    }

    fn default_conclusion(&self) -> String {
        match self.locale {
            Locale::Thai => format!(
                "บทความนี้นำเสนอข้อมูลเกี่ยวกับ {} ซึ่งเป็นประเด็นสำคัญในตลาดคริปโตที่ควรติดตาม",
                self.subject()
            ),
            Locale::English => format!(
                "This article covered the latest on {}, a key topic in the crypto market worth following.",
                self.subject()
            ),
        }
    }

    fn default_image_prompt(&self) -> String {
        format!(
            "A photorealistic scene showing {} in a professional setting",
            self.subject()
        )
    }
}

/// Validate a repaired value and build the typed document
///
/// A sequence is reduced to its first object element. Section formats and
/// bodies, the section list, media, sources and every `seo` field are
/// defaulted in both modes. Title, intro and conclusion are mandatory in
/// [`ValidationMode::Strict`] and templated in [`ValidationMode::Lenient`].
///
/// # Errors
///
/// Strict mode only: [`SchemaError`] naming the first missing or malformed
/// mandatory field. Lenient mode never fails on a mapping.
///
/// # Examples
///
/// ```
/// use quill_generator::{validate, ValidationContext, ValidationMode};
/// use serde_json::json;
///
/// let ctx = ValidationContext::new("Bitcoin");
/// let value = json!({"title": "X", "content": {}});
///
/// assert!(validate(&value, ValidationMode::Strict, &ctx).is_err());
///
/// let doc = validate(&value, ValidationMode::Lenient, &ctx).unwrap();
/// assert!(doc.content.sections.is_empty());
/// assert!(!doc.content.conclusion.is_empty());
/// assert!(doc.seo.is_complete());
/// ```
pub fn validate(
    value: &Value,
    mode: ValidationMode,
    ctx: &ValidationContext,
) -> Result<ArticleDocument, SchemaError> {
    let root = root_object(value, mode)?;
    let strict = mode == ValidationMode::Strict;

    let title = match text_field(root, &["title", "headline"]) {
        Some(title) => title,
        None if strict => return Err(SchemaError::MissingField("title".to_string())),
        None => ctx.default_title(),
    };

    let empty = Map::new();
    let content = match root.get("content") {
        Some(Value::Object(content)) => content,
        None | Some(Value::Null) => &empty,
        Some(other) if strict => {
            return Err(SchemaError::InvalidField {
                field: "content".to_string(),
                reason: format!("expected an object, found {}", kind(other)),
            })
        }
        Some(_) => &empty,
    };

    let intro = match content
        .get("intro")
        .or_else(|| content.get("introduction"))
        .and_then(parse_intro)
    {
        Some(intro) => intro,
        None if strict => return Err(SchemaError::MissingField("content.intro".to_string())),
        None => match root.get("content").and_then(Value::as_str) {
            Some(text) if !text.trim().is_empty() => Intro::Text(text.trim().to_string()),
            _ => Intro::Text(ctx.default_intro()),
        },
    };

    let sections = parse_sections(content.get("sections"), mode)?;

    let conclusion = match text_field(content, &["conclusion", "summary"]) {
        Some(conclusion) => conclusion,
        None if strict => {
            return Err(SchemaError::MissingField("content.conclusion".to_string()))
        }
        None => ctx.default_conclusion(),
    };

    let seo_value = root
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case("seo"))
        .map(|(_, value)| value);
    let seo = build_seo(seo_value, &title, &intro, ctx);

    let media = root.get("media").map(parse_media).unwrap_or_default();
    let sources = root.get("sources").map(parse_sources).unwrap_or_default();

    debug!(
        title = %title,
        sections = sections.len(),
        images = media.images.len(),
        "Document validated"
    );

    Ok(ArticleDocument {
        title,
        content: ArticleContent {
            intro,
            sections,
            conclusion,
        },
        seo,
        media,
        sources,
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn root_object(value: &Value, mode: ValidationMode) -> Result<&Map<String, Value>, SchemaError> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Array(items) => {
            let first = items.iter().find_map(Value::as_object);
            if first.is_some() && items.len() > 1 {
                debug!(discarded = items.len() - 1, "Using first document of a sequence");
            }
            first.ok_or_else(|| {
                SchemaError::NotAnObject("an array without an object element".to_string())
            })
        }
        other => {
            if mode == ValidationMode::Lenient {
                warn!("Lenient validation given {}", kind(other));
            }
            Err(SchemaError::NotAnObject(kind(other).to_string()))
        }
    }
}

/// First of `keys` holding non-empty text; arrays of strings are joined
fn text_field(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .map(|value| match value {
            Value::Array(items) => items
                .iter()
                .map(value_to_text)
                .filter(|s| !s.trim().is_empty())
                .collect::<Vec<_>>()
                .join("\n\n"),
            Value::Object(_) => String::new(),
            other => value_to_text(other),
        })
        .map(|text| text.trim().to_string())
        .find(|text| !text.is_empty())
}

/// Key normalized for loose matching: `"Part 1"`, `part_1` and `Part1` agree
fn loose_key(key: &str) -> String {
    key.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn parse_intro(value: &Value) -> Option<Intro> {
    match value {
        Value::Object(map) => {
            let part = |name: &str| {
                map.iter()
                    .find(|(key, _)| loose_key(key) == name)
                    .map(|(_, v)| value_to_text(v).trim().to_string())
                    .unwrap_or_default()
            };
            let part1 = part("part1");
            let part2 = part("part2");
            if !part1.is_empty() || !part2.is_empty() {
                return Some(Intro::TwoPart { part1, part2 });
            }
            let joined = map
                .values()
                .map(value_to_text)
                .filter(|s| !s.trim().is_empty())
                .collect::<Vec<_>>()
                .join("\n\n");
            (!joined.is_empty()).then_some(Intro::Text(joined))
        }
        Value::Array(items) => {
            let joined = items
                .iter()
                .map(value_to_text)
                .filter(|s| !s.trim().is_empty())
                .collect::<Vec<_>>()
                .join("\n\n");
            (!joined.is_empty()).then_some(Intro::Text(joined))
        }
        other => {
            let text = value_to_text(other).trim().to_string();
            (!text.is_empty()).then_some(Intro::Text(text))
        }
    }
}

fn parse_sections(value: Option<&Value>, mode: ValidationMode) -> Result<Vec<Section>, SchemaError> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items
            .iter()
            .enumerate()
            .filter_map(|(idx, item)| {
                let section = parse_section(item);
                if section.is_none() {
                    warn!("Skipping section {}: not an object", idx);
                }
                section
            })
            .collect()),
        Some(other) if mode == ValidationMode::Strict => Err(SchemaError::InvalidField {
            field: "content.sections".to_string(),
            reason: format!("expected a sequence, found {}", kind(other)),
        }),
        Some(single @ Value::Object(_)) => Ok(parse_section(single).into_iter().collect()),
        Some(_) => Ok(Vec::new()),
    }
}

fn parse_section(value: &Value) -> Option<Section> {
    let map = value.as_object()?;

    let heading = text_field(map, &["heading", "title", "h2"]).unwrap_or_default();
    let format = map
        .get("format")
        .and_then(Value::as_str)
        .and_then(SectionFormat::parse)
        .unwrap_or_default();

    let body = ["paragraphs", "content", "items", "rows"]
        .iter()
        .find_map(|key| map.get(*key));

    let paragraphs = match body {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().filter_map(parse_paragraph).collect(),
        Some(scalar) => parse_paragraph(scalar).into_iter().collect(),
    };

    Some(Section {
        heading,
        format,
        paragraphs,
    })
}

fn parse_paragraph(value: &Value) -> Option<Paragraph> {
    match value {
        Value::Null => None,
        Value::Array(cells) => Some(Paragraph::Row(cells.iter().map(value_to_text).collect())),
        Value::Object(record) => Some(Paragraph::Record(record.clone())),
        other => Some(Paragraph::Text(value_to_text(other))),
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect::<String>().trim().to_string()
}

/// URL slug from ASCII letters and digits; other runs become one `-`
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

fn build_seo(value: Option<&Value>, title: &str, intro: &Intro, ctx: &ValidationContext) -> Seo {
    let map = value.and_then(Value::as_object);
    let field = |keys: &[&str]| -> String {
        map.and_then(|m| text_field(m, keys)).unwrap_or_default()
    };

    let mut seo = Seo {
        slug: field(&["slug"]),
        meta_title: field(&["metaTitle", "meta_title", "title"]),
        meta_description: field(&["metaDescription", "meta_description", "description"]),
        excerpt: field(&["excerpt"]),
        image_prompt: field(&["imagePrompt", "image_prompt"]),
        alt_text: field(&["altText", "alt_text"]),
    };

    if map.is_none() {
        debug!("No seo block, deriving from title and intro");
    }

    let lead = match intro.lead().trim() {
        "" => intro.full_text(),
        lead => lead.to_string(),
    };

    if seo.slug.is_empty() {
        seo.slug = [slugify(title), slugify(&ctx.primary_keyword)]
            .into_iter()
            .find(|s| !s.is_empty())
            .unwrap_or_else(|| "article".to_string());
    }
    if seo.meta_title.is_empty() {
        seo.meta_title = title.to_string();
    }
    if seo.meta_description.is_empty() {
        seo.meta_description = truncate_chars(&lead, META_DESCRIPTION_LEN);
    }
    if seo.excerpt.is_empty() {
        seo.excerpt = truncate_chars(&lead, EXCERPT_LEN);
    }
    if seo.image_prompt.is_empty() {
        seo.image_prompt = ctx.default_image_prompt();
    }
    if seo.alt_text.is_empty() {
        seo.alt_text = title.to_string();
    }
    // An intro of only whitespace leaves nothing to derive from
    if seo.meta_description.is_empty() {
        seo.meta_description = title.to_string();
    }
    if seo.excerpt.is_empty() {
        seo.excerpt = title.to_string();
    }
    seo
}

fn dimension(value: Option<&Value>) -> Option<u32> {
    match value? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_media(value: &Value) -> Media {
    let Some(map) = value.as_object() else {
        return Media::default();
    };

    let images = map
        .get("images")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_object)
                .filter_map(|img| {
                    let url = text_field(img, &["url", "src"])?;
                    Some(ImageRef {
                        url,
                        alt_text: text_field(img, &["alt_text", "altText", "alt"])
                            .unwrap_or_default(),
                        placement: text_field(img, &["placement"]),
                        context: text_field(img, &["context"]),
                        width: dimension(img.get("width")),
                        height: dimension(img.get("height")),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    let twitter_embeds = map
        .get("twitterEmbeds")
        .or_else(|| map.get("twitter_embeds"))
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(url) if !url.trim().is_empty() => Some(EmbedRef {
                        url: url.trim().to_string(),
                        ..Default::default()
                    }),
                    Value::Object(embed) => Some(EmbedRef {
                        url: text_field(embed, &["url"])?,
                        placement: text_field(embed, &["placement"]),
                        context: text_field(embed, &["context"]),
                    }),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    Media {
        images,
        twitter_embeds,
    }
}

/// Lowercased host of a URL, without a leading `www.`
///
/// Bare hosts such as `decrypt.co` are read as `https://` URLs; anything
/// without a host yields an empty string.
fn domain_of(url: &str) -> String {
    [url.to_string(), format!("https://{}", url)]
        .iter()
        .filter_map(|candidate| Url::parse(candidate).ok())
        .find_map(|parsed| {
            parsed
                .host_str()
                .map(|host| host.trim_start_matches("www.").to_string())
        })
        .unwrap_or_default()
}

fn parse_sources(value: &Value) -> Vec<SourceRef> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(url) if !url.trim().is_empty() => Some(SourceRef {
                domain: domain_of(url.trim()),
                url: url.trim().to_string(),
            }),
            Value::Object(source) => {
                let url = text_field(source, &["url", "link"]).unwrap_or_default();
                let domain = text_field(source, &["domain", "name"])
                    .unwrap_or_else(|| domain_of(&url));
                (!url.is_empty() || !domain.is_empty()).then_some(SourceRef { domain, url })
            }
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> ValidationContext {
        ValidationContext::new("Bitcoin")
    }

    fn complete() -> Value {
        json!({
            "title": "Bitcoin Rally",
            "content": {
                "intro": {"Part 1": "Price surged past a record.", "Part 2": "Here is why."},
                "sections": [
                    {"heading": "Drivers", "format": "list", "paragraphs": ["ETF flows", "Halving"]},
                    {"heading": "Numbers", "format": "table", "paragraphs": [["Metric", "Value"], {"Metric": "Price", "Value": 100000}]}
                ],
                "conclusion": "Stay tuned"
            },
            "SEO": {"slug": "bitcoin-rally", "metaTitle": "BTC Rally", "metaDescription": "d", "excerpt": "e", "imagePrompt": "p", "altText": "a"},
            "media": {"images": [{"url": "https://x.io/a.png", "alt_text": "A", "width": "600", "height": 400}], "twitter_embeds": ["https://x.com/u/status/1"]},
            "sources": [{"domain": "coindesk.com", "url": "https://coindesk.com/a"}, "https://www.decrypt.co/b?x=1"]
        })
    }

    #[test]
    fn test_strict_complete_document() {
        let doc = validate(&complete(), ValidationMode::Strict, &ctx()).unwrap();

        assert_eq!(doc.title, "Bitcoin Rally");
        assert_eq!(doc.content.intro.lead(), "Price surged past a record.");
        assert_eq!(doc.content.sections.len(), 2);
        assert_eq!(doc.content.sections[0].format, SectionFormat::List);
        assert_eq!(
            doc.content.sections[1].paragraphs[0],
            Paragraph::Row(vec!["Metric".into(), "Value".into()])
        );
        assert_eq!(doc.content.sections[1].paragraphs[1].as_text(), "Price | 100000");
        assert_eq!(doc.seo.meta_title, "BTC Rally");
        assert_eq!(doc.media.images[0].width, Some(600));
        assert_eq!(doc.media.images[0].height, Some(400));
        assert_eq!(doc.media.twitter_embeds.len(), 1);
        assert_eq!(doc.sources[1].domain, "decrypt.co");
    }

    #[test]
    fn test_array_uses_first_object() {
        let value = json!([1, complete(), {"title": "Second"}]);
        let doc = validate(&value, ValidationMode::Strict, &ctx()).unwrap();
        assert_eq!(doc.title, "Bitcoin Rally");
    }

    #[test]
    fn test_not_an_object() {
        let err = validate(&json!("text"), ValidationMode::Lenient, &ctx()).unwrap_err();
        assert!(matches!(err, SchemaError::NotAnObject(_)));
        let err = validate(&json!([1, 2]), ValidationMode::Strict, &ctx()).unwrap_err();
        assert!(matches!(err, SchemaError::NotAnObject(_)));
    }

    #[test]
    fn test_strict_missing_fields() {
        let err = validate(&json!({"content": {"intro": "i", "conclusion": "c"}}), ValidationMode::Strict, &ctx())
            .unwrap_err();
        assert_eq!(err, SchemaError::MissingField("title".to_string()));

        let err = validate(&json!({"title": "T", "content": {"conclusion": "c"}}), ValidationMode::Strict, &ctx())
            .unwrap_err();
        assert_eq!(err, SchemaError::MissingField("content.intro".to_string()));

        let err = validate(&json!({"title": "T", "content": {"intro": "i"}}), ValidationMode::Strict, &ctx())
            .unwrap_err();
        assert_eq!(err, SchemaError::MissingField("content.conclusion".to_string()));

        let err = validate(&json!({"title": "  ", "content": {"intro": "i", "conclusion": "c"}}), ValidationMode::Strict, &ctx())
            .unwrap_err();
        assert_eq!(err, SchemaError::MissingField("title".to_string()));
    }

    #[test]
    fn test_strict_sections_must_be_sequence() {
        let value = json!({"title": "T", "content": {"intro": "i", "sections": {"heading": "h"}, "conclusion": "c"}});
        let err = validate(&value, ValidationMode::Strict, &ctx()).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidField { ref field, .. } if field == "content.sections"));

        let doc = validate(&value, ValidationMode::Lenient, &ctx()).unwrap();
        assert_eq!(doc.content.sections.len(), 1);
        assert_eq!(doc.content.sections[0].heading, "h");
    }

    #[test]
    fn test_lenient_defaults() {
        let doc = validate(&json!({"title": "X", "content": {}}), ValidationMode::Lenient, &ctx()).unwrap();

        assert_eq!(doc.title, "X");
        assert!(doc.content.sections.is_empty());
        assert_eq!(
            doc.content.conclusion,
            "บทความนี้นำเสนอข้อมูลเกี่ยวกับ Bitcoin ซึ่งเป็นประเด็นสำคัญในตลาดคริปโตที่ควรติดตาม"
        );
        assert!(!doc.content.intro.is_empty());
        assert!(doc.seo.is_complete());
    }

    #[test]
    fn test_lenient_english_templates() {
        let ctx = ValidationContext::new("Solana").with_locale(Locale::English);
        let doc = validate(&json!({}), ValidationMode::Lenient, &ctx).unwrap();

        assert_eq!(doc.title, "Latest News about Solana");
        assert!(doc.content.conclusion.contains("Solana"));
        assert_eq!(doc.seo.slug, "latest-news-about-solana");
    }

    #[test]
    fn test_lenient_string_content_becomes_intro() {
        let doc = validate(&json!({"title": "T", "content": "Just text"}), ValidationMode::Lenient, &ctx()).unwrap();
        assert_eq!(doc.content.intro, Intro::Text("Just text".to_string()));
    }

    #[test]
    fn test_section_defaults_and_scalar_wrap() {
        let value = json!({
            "title": "T",
            "content": {
                "intro": "i",
                "sections": [
                    {"heading": "No body"},
                    {"heading": "Scalar", "paragraphs": "Only one"},
                    {"heading": "Odd", "format": "bogus", "paragraphs": [null, 3]},
                    "not a section"
                ],
                "conclusion": "c"
            }
        });
        let doc = validate(&value, ValidationMode::Strict, &ctx()).unwrap();
        let sections = &doc.content.sections;

        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].format, SectionFormat::Paragraph);
        assert!(sections[0].paragraphs.is_empty());
        assert_eq!(sections[1].paragraphs, vec![Paragraph::Text("Only one".into())]);
        assert_eq!(sections[2].format, SectionFormat::Paragraph);
        assert_eq!(sections[2].paragraphs, vec![Paragraph::Text("3".into())]);
    }

    #[test]
    fn test_seo_derived_when_absent() {
        let value = json!({
            "title": "Bitcoin ETF Approved!",
            "content": {"intro": {"Part1": "x".repeat(200), "Part2": "p2"}, "conclusion": "c"}
        });
        let doc = validate(&value, ValidationMode::Strict, &ctx()).unwrap();

        assert_eq!(doc.seo.slug, "bitcoin-etf-approved");
        assert_eq!(doc.seo.meta_title, "Bitcoin ETF Approved!");
        assert_eq!(doc.seo.meta_description.chars().count(), META_DESCRIPTION_LEN);
        assert_eq!(doc.seo.excerpt.chars().count(), EXCERPT_LEN);
        assert_eq!(
            doc.seo.image_prompt,
            "A photorealistic scene showing Bitcoin in a professional setting"
        );
        assert_eq!(doc.seo.alt_text, "Bitcoin ETF Approved!");
    }

    #[test]
    fn test_seo_partial_fields_filled() {
        let value = json!({
            "title": "ราคาบิตคอยน์",
            "content": {"intro": "lead", "conclusion": "c"},
            "seo": {"slug": "", "metaTitle": "Custom", "imagePrompt": "scene"}
        });
        let doc = validate(&value, ValidationMode::Strict, &ctx()).unwrap();

        assert_eq!(doc.seo.slug, "bitcoin");
        assert_eq!(doc.seo.meta_title, "Custom");
        assert_eq!(doc.seo.meta_description, "lead");
        assert_eq!(doc.seo.image_prompt, "scene");
        assert!(doc.seo.is_complete());
    }

    #[test]
    fn test_intro_variants() {
        assert_eq!(parse_intro(&json!("  text ")), Some(Intro::Text("text".into())));
        assert_eq!(parse_intro(&json!("")), None);
        assert_eq!(
            parse_intro(&json!({"part_1": "a"})),
            Some(Intro::TwoPart { part1: "a".into(), part2: String::new() })
        );
        assert_eq!(
            parse_intro(&json!(["a", "b"])),
            Some(Intro::Text("a\n\nb".into()))
        );
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Bitcoin hits $100K -- again!"), "bitcoin-hits-100k-again");
        assert_eq!(slugify("ราคา"), "");
        assert_eq!(slugify("ETF ราคา BTC"), "etf-btc");
    }

    #[test]
    fn test_domain_of() {
        assert_eq!(domain_of("https://www.coindesk.com/markets/x"), "coindesk.com");
        assert_eq!(domain_of("decrypt.co"), "decrypt.co");
        assert_eq!(domain_of("https://user:pw@WWW.CoinDesk.com:8443/a?b=c#d"), "coindesk.com");
        assert_eq!(domain_of("not a url"), "");
    }
}
