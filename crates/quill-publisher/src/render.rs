//! Article to HTML rendering
//!
//! Produces the CMS body from an [`ArticleDocument`]. Text is HTML-escaped and
//! inline markdown images, links and bold runs are converted. Blocks are
//! separated by blank lines.
//!
//! Layout:
//!
//! ```text
//! intro paragraphs
//! <h2> section ... + images/embeds placed in that section
//! images/embeds without a matching section
//! conclusion
//! disclosure note
//! ```

use quill_domain::article::{is_placed_in_section, value_to_text};
use quill_domain::{
    ArticleDocument, EmbedRef, ImageRef, Paragraph, PostStatus, PublishRequest, Section,
    SectionFormat,
};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Longest meta description the SEO plugin displays
pub const META_DESCRIPTION_LIMIT: usize = 160;

/// Body of a section the model left empty
pub const EMPTY_SECTION_PLACEHOLDER: &str = "Content for this section is being processed.";

static INLINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!\[([^\]]*)\]\(([^)\s]+)\)|\[([^\]]+)\]\(([^)\s]+)\)|\*\*(.+?)\*\*")
        .expect("valid regex")
});

static LIST_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*•]|\d+[.)])\s+").expect("valid regex"));

static TABLE_RULE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:?-+:?$").expect("valid regex"));

/// Per-site rendering choices
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderOptions {
    /// SEO focus keyword
    pub focus_keyword: String,
    /// Category ids for the post
    pub categories: Vec<u64>,
    /// Shortcode appended after the conclusion
    pub disclosure_note: Option<String>,
}

/// The rendered article, ready for a publisher
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedArticle {
    /// Request to hand to the CMS
    pub request: PublishRequest,
    /// Images placed in the body
    pub images: usize,
    /// Social embeds placed in the body
    pub embeds: usize,
}

#[derive(Default)]
struct HtmlWriter {
    blocks: Vec<String>,
}

impl HtmlWriter {
    fn push(&mut self, html: String) {
        self.blocks.push(html);
    }

    fn finish(self) -> String {
        self.blocks.join("\n\n")
    }
}

/// Escape text for HTML element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Cap a meta description at [`META_DESCRIPTION_LIMIT`] characters
///
/// Longer text keeps its first 157 characters followed by `...`.
pub fn cap_meta_description(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() <= META_DESCRIPTION_LIMIT {
        return text.to_string();
    }
    let head: String = text.chars().take(META_DESCRIPTION_LIMIT - 3).collect();
    format!("{}...", head.trim_end())
}

fn image_tag(image: &ImageRef) -> String {
    let mut tag = format!(
        r#"<img src="{}" alt="{}""#,
        escape_html(&image.url),
        escape_html(&image.alt_text)
    );
    if let Some(width) = image.width {
        tag.push_str(&format!(r#" width="{}""#, width));
    }
    if let Some(height) = image.height {
        tag.push_str(&format!(r#" height="{}""#, height));
    }
    tag.push_str(" />");
    tag
}

/// Convert inline markdown in `text` to HTML, escaping everything else
fn inline(text: &str) -> String {
    let mut html = String::with_capacity(text.len());
    let mut last = 0;

    for caps in INLINE_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        html.push_str(&escape_html(&text[last..whole.start()]));

        if let (Some(alt), Some(src)) = (caps.get(1), caps.get(2)) {
            html.push_str(&image_tag(&ImageRef {
                url: src.as_str().to_string(),
                alt_text: alt.as_str().to_string(),
                ..Default::default()
            }));
        } else if let (Some(label), Some(href)) = (caps.get(3), caps.get(4)) {
            html.push_str(&format!(
                r#"<a href="{}">{}</a>"#,
                escape_html(href.as_str()),
                escape_html(label.as_str())
            ));
        } else if let Some(bold) = caps.get(5) {
            html.push_str(&format!("<strong>{}</strong>", escape_html(bold.as_str())));
        }
        last = whole.end();
    }

    html.push_str(&escape_html(&text[last..]));
    html
}

fn push_paragraphs(writer: &mut HtmlWriter, text: &str) {
    for chunk in text.split("\n\n").map(str::trim).filter(|c| !c.is_empty()) {
        let body = inline(chunk).replace('\n', "<br />\n");
        writer.push(format!("<p>{}</p>", body));
    }
}

fn markdown_cells(line: &str) -> Vec<String> {
    line.trim()
        .trim_start_matches('|')
        .trim_end_matches('|')
        .split('|')
        .map(|cell| cell.trim().to_string())
        .collect()
}

fn is_rule_row(cells: &[String]) -> bool {
    !cells.is_empty() && cells.iter().all(|cell| TABLE_RULE_RE.is_match(cell))
}

/// Header and body rows of a table section, if its entries form a table
fn table_rows(paragraphs: &[Paragraph]) -> Option<(Vec<String>, Vec<Vec<String>>)> {
    match paragraphs.first()? {
        Paragraph::Text(first) if first.trim_start().starts_with('|') => {
            let mut rows = paragraphs
                .iter()
                .filter_map(|p| match p {
                    Paragraph::Text(text) => Some(text.as_str()),
                    _ => None,
                })
                .flat_map(str::lines)
                .map(str::trim)
                .filter(|line| line.starts_with('|'))
                .map(markdown_cells)
                .filter(|cells| !is_rule_row(cells));
            let header = rows.next()?;
            Some((header, rows.collect()))
        }
        Paragraph::Row(header) => {
            let rows = paragraphs[1..]
                .iter()
                .filter_map(|p| match p {
                    Paragraph::Row(cells) => Some(cells.clone()),
                    _ => None,
                })
                .collect();
            Some((header.clone(), rows))
        }
        Paragraph::Record(first) => {
            let header: Vec<String> = first.keys().cloned().collect();
            let rows = paragraphs
                .iter()
                .filter_map(|p| match p {
                    Paragraph::Record(record) => Some(
                        header
                            .iter()
                            .map(|h| record.get(h).map(value_to_text).unwrap_or_default())
                            .collect(),
                    ),
                    _ => None,
                })
                .collect();
            Some((header, rows))
        }
        Paragraph::Text(_) => None,
    }
}

fn table_html(header: &[String], rows: &[Vec<String>]) -> String {
    let cells = |tag: &str, cells: &[String]| {
        cells
            .iter()
            .map(|c| format!("<{tag}>{}</{tag}>", inline(c)))
            .collect::<String>()
    };

    let mut html = String::from("<figure><table><thead><tr>");
    html.push_str(&cells("th", header));
    html.push_str("</tr></thead><tbody>");
    for row in rows {
        html.push_str("<tr>");
        html.push_str(&cells("td", row));
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table></figure>");
    html
}

fn render_section(writer: &mut HtmlWriter, section: &Section) {
    writer.push(format!("<h2>{}</h2>", inline(section.heading.trim())));

    if section.paragraphs.is_empty() {
        writer.push(format!("<p><em>{}</em></p>", EMPTY_SECTION_PLACEHOLDER));
        return;
    }

    match section.format {
        SectionFormat::List => {
            let items = section
                .paragraphs
                .iter()
                .map(|p| p.as_text())
                .filter(|item| !item.trim().is_empty())
                .map(|item| {
                    let item = LIST_MARKER_RE.replace(item.trim(), "");
                    format!("<li>{}</li>", inline(&item))
                })
                .collect::<String>();
            writer.push(format!("<ul>{}</ul>", items));
        }
        SectionFormat::Table => match table_rows(&section.paragraphs) {
            Some((header, rows)) => writer.push(table_html(&header, &rows)),
            None => {
                debug!(heading = %section.heading, "Table section without rows, rendering as text");
                for paragraph in &section.paragraphs {
                    push_paragraphs(writer, &paragraph.as_text());
                }
            }
        },
        SectionFormat::Paragraph => {
            for paragraph in &section.paragraphs {
                push_paragraphs(writer, &paragraph.as_text());
            }
        }
    }
}

fn push_image(writer: &mut HtmlWriter, image: &ImageRef) {
    writer.push(format!("<figure>{}</figure>", image_tag(image)));
}

fn push_embed(writer: &mut HtmlWriter, embed: &EmbedRef) {
    let url = escape_html(&embed.url);
    writer.push(format!(
        r#"<blockquote class="twitter-tweet"><a href="{url}">{url}</a></blockquote>"#
    ));
}

/// Render `document` to HTML and assemble the publish request
///
/// # Example
///
/// ```
/// use quill_domain::ArticleDocument;
/// use quill_publisher::{render_article, RenderOptions};
///
/// let doc = ArticleDocument::from_json(
///     r#"{"title": "Bitcoin Rally", "content": {"intro": "Price surged",
///         "sections": [], "conclusion": "Stay tuned"}}"#,
/// ).unwrap();
/// let rendered = render_article(&doc, &RenderOptions::default());
/// assert!(rendered.request.html_content.starts_with("<p>Price surged</p>"));
/// ```
pub fn render_article(document: &ArticleDocument, options: &RenderOptions) -> RenderedArticle {
    let mut writer = HtmlWriter::default();

    for paragraph in document.content.intro.paragraphs() {
        push_paragraphs(&mut writer, paragraph);
    }

    let sections = &document.content.sections;
    let in_section = |placement: Option<&str>| {
        (0..sections.len()).find(|&i| is_placed_in_section(placement, i))
    };
    let images = &document.media.images;
    let embeds = &document.media.twitter_embeds;

    for (index, section) in sections.iter().enumerate() {
        render_section(&mut writer, section);
        for image in images
            .iter()
            .filter(|img| in_section(img.placement.as_deref()) == Some(index))
        {
            push_image(&mut writer, image);
        }
        for embed in embeds
            .iter()
            .filter(|e| in_section(e.placement.as_deref()) == Some(index))
        {
            push_embed(&mut writer, embed);
        }
    }

    for image in images
        .iter()
        .filter(|img| in_section(img.placement.as_deref()).is_none())
    {
        push_image(&mut writer, image);
    }
    for embed in embeds
        .iter()
        .filter(|e| in_section(e.placement.as_deref()).is_none())
    {
        push_embed(&mut writer, embed);
    }

    push_paragraphs(&mut writer, &document.content.conclusion);

    if let Some(note) = options.disclosure_note.as_deref().filter(|n| !n.trim().is_empty()) {
        writer.push(note.trim().to_string());
    }

    let seo = &document.seo;
    let seo_title = if seo.meta_title.trim().is_empty() {
        document.title.clone()
    } else {
        seo.meta_title.clone()
    };

    let request = PublishRequest {
        title: document.title.clone(),
        html_content: writer.finish(),
        slug: seo.slug.clone(),
        excerpt: seo.excerpt.clone(),
        seo_title,
        seo_description: cap_meta_description(&seo.meta_description),
        featured_media_id: None,
        focus_keyword: options.focus_keyword.clone(),
        categories: options.categories.clone(),
        status: PostStatus::Draft,
    };

    debug!(
        title = %request.title,
        chars = request.html_content.len(),
        "Article rendered"
    );

    RenderedArticle {
        request,
        images: images.len(),
        embeds: embeds.len(),
    }
}
