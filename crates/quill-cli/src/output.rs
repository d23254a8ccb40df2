//! Output formatting for the CLI.

use colored::*;
use quill_domain::ArticleDocument;

/// Output formatter.
pub struct Formatter {
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(color_enabled: bool) -> Self {
        Self { color_enabled }
    }

    /// One-screen summary of an article.
    pub fn article_summary(&self, doc: &ArticleDocument) -> String {
        let mut lines = vec![
            format!("{} {}", self.label("Title:"), doc.title),
            format!("{} {}", self.label("Slug:"), doc.seo.slug),
            format!("{} {}", self.label("Meta title:"), doc.seo.meta_title),
            format!(
                "{} {} sections, {} images, {} embeds",
                self.label("Body:"),
                doc.content.sections.len(),
                doc.media.images.len(),
                doc.media.twitter_embeds.len()
            ),
        ];
        for (i, section) in doc.content.sections.iter().enumerate() {
            lines.push(format!("  {}. {}", i + 1, section.heading));
        }
        lines.join("\n")
    }

    /// Format a success message.
    pub fn success(&self, msg: &str) -> String {
        self.colorize(&format!("✓ {}", msg), "green")
    }

    /// Format a warning message.
    pub fn warning(&self, msg: &str) -> String {
        self.colorize(&format!("⚠ {}", msg), "yellow")
    }

    /// Format an info message.
    pub fn info(&self, msg: &str) -> String {
        self.colorize(&format!("ℹ {}", msg), "blue")
    }

    fn label(&self, text: &str) -> String {
        if self.color_enabled {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "green" => text.green().to_string(),
            "yellow" => text.yellow().to_string(),
            "blue" => text.blue().to_string(),
            _ => text.to_string(),
        }
    }
}
