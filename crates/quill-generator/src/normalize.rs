//! Source text cleanup before it reaches the generation prompt

use quill_domain::{EmbedRef, ImageRef, SourceDocument};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Clean raw extracted text
///
/// Restores markdown image/link syntax that scrapers escape (`!\[`, `\[`,
/// `\]`, `\(`, `\)`), drops control characters other than newline and tab,
/// collapses every whitespace run (line breaks included) to a single space
/// and trims the result.
///
/// Total over any input, including the empty string.
///
/// # Examples
///
/// ```
/// use quill_generator::normalize;
///
/// let cleaned = normalize("  !\\[chart\\]\\(https://x.io/a.png\\)\u{7}   up  ");
/// assert_eq!(cleaned, "![chart](https://x.io/a.png) up");
/// ```
pub fn normalize(raw: &str) -> String {
    let unescaped = raw
        .replace(r"!\[", "![")
        .replace(r"\[", "[")
        .replace(r"\]", "]")
        .replace(r"\(", "(")
        .replace(r"\)", ")");

    let printable: String = unescaped
        .chars()
        .filter(|&c| c >= ' ' || c == '\n' || c == '\t')
        .collect();

    WHITESPACE_RE.replace_all(&printable, " ").trim().to_string()
}

/// Source material ready to be embedded in a prompt
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreparedSources {
    /// Normalized text of every source, grouped under `Source:`/`URL:` headers
    pub text: String,
    /// Images collected from every source, deduplicated by URL
    pub images: Vec<ImageRef>,
    /// Tweet embeds collected from every source, deduplicated by URL
    pub twitter_embeds: Vec<EmbedRef>,
}

impl PreparedSources {
    /// Whether no source contributed any text
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Normalize and concatenate source documents
///
/// The first document from a given source opens a `Source:`/`URL:` block;
/// later documents from the same source are appended without a header.
/// Documents whose content normalizes to nothing are skipped.
pub fn prepare_sources(sources: &[SourceDocument]) -> PreparedSources {
    let mut prepared = PreparedSources::default();
    let mut seen_sources = HashSet::new();
    let mut image_urls = HashSet::new();
    let mut embed_urls = HashSet::new();

    for doc in sources {
        for image in &doc.media.images {
            if image_urls.insert(image.url.clone()) {
                prepared.images.push(image.clone());
            }
        }
        for embed in &doc.media.twitter_embeds {
            if embed_urls.insert(embed.url.clone()) {
                prepared.twitter_embeds.push(embed.clone());
            }
        }

        let content = normalize(&doc.content);
        if content.is_empty() {
            continue;
        }

        let source = if doc.source.trim().is_empty() {
            "Unknown"
        } else {
            doc.source.as_str()
        };

        if seen_sources.insert(source.to_string()) {
            prepared.text.push_str(&format!(
                "\n---\nSource: {}\nURL: {}\n\n{}\n---\n",
                source, doc.url, content
            ));
        } else {
            prepared.text.push_str(&format!("\n{}\n", content));
        }
    }

    prepared
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_domain::Media;

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \n\t "), "");
    }

    #[test]
    fn test_normalize_unescapes_markdown() {
        assert_eq!(
            normalize(r"See !\[logo\]\(a.png\) and \[docs\]\(https://d.io\)"),
            "See ![logo](a.png) and [docs](https://d.io)"
        );
    }

    #[test]
    fn test_normalize_drops_control_characters() {
        assert_eq!(normalize("a\u{0}b\u{1b}c\rd"), "abcd");
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize("  one   two\t\tthree  "), "one two three");
        assert_eq!(normalize("para one  \n\n\n\n  para two"), "para one para two");
        assert_eq!(normalize("line\u{a0}\r\nnext"), "line next");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize("  x \\[y\\]  \n\n\n z\u{2}");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_normalize_keeps_thai_and_sigils() {
        assert_eq!(normalize("ราคา $BTC   พุ่ง"), "ราคา $BTC พุ่ง");
    }

    fn source(name: &str, url: &str, content: &str) -> SourceDocument {
        SourceDocument {
            title: name.to_string(),
            url: url.to_string(),
            content: content.to_string(),
            source: name.to_string(),
            media: Media::default(),
        }
    }

    #[test]
    fn test_prepare_sources_groups_by_source() {
        let docs = vec![
            source("CoinDesk", "https://coindesk.com/a", "first"),
            source("CoinDesk", "https://coindesk.com/b", "second"),
            source("Decrypt", "https://decrypt.co/c", "third"),
        ];
        let prepared = prepare_sources(&docs);

        assert_eq!(prepared.text.matches("Source: CoinDesk").count(), 1);
        assert!(prepared.text.contains("Source: Decrypt\nURL: https://decrypt.co/c"));
        assert!(prepared.text.contains("\nsecond\n"));
    }

    #[test]
    fn test_prepare_sources_dedupes_media() {
        let mut a = source("A", "", "text");
        a.media.images.push(ImageRef {
            url: "https://x.io/1.png".to_string(),
            ..Default::default()
        });
        let mut b = source("B", "", "more");
        b.media.images.push(ImageRef {
            url: "https://x.io/1.png".to_string(),
            ..Default::default()
        });
        b.media.twitter_embeds.push(EmbedRef {
            url: "https://x.com/u/status/1".to_string(),
            ..Default::default()
        });

        let prepared = prepare_sources(&[a, b]);
        assert_eq!(prepared.images.len(), 1);
        assert_eq!(prepared.twitter_embeds.len(), 1);
    }

    #[test]
    fn test_prepare_sources_skips_empty() {
        let prepared = prepare_sources(&[source("A", "", "  \u{3} ")]);
        assert!(prepared.is_empty());
    }
}
