//! Render command implementation.

use super::{load_article, write_output};
use crate::cli::RenderArgs;
use crate::config::QuillConfig;
use crate::error::Result;
use quill_domain::ArticleDocument;
use quill_publisher::{render_article, RenderOptions};
use std::path::Path;

/// HTML for `doc`, using the site's options when a site is known.
pub fn render_html(
    doc: &ArticleDocument,
    config: &QuillConfig,
    site: Option<&str>,
    keyword: &str,
) -> Result<String> {
    let options = match site.or(config.default_site.as_deref()) {
        Some(name) => config.site(Some(name))?.1.render_options(keyword, false),
        None => RenderOptions {
            focus_keyword: keyword.to_string(),
            ..Default::default()
        },
    };
    Ok(render_article(doc, &options).request.html_content)
}

/// Execute the render command.
pub fn execute_render(args: RenderArgs, config: &QuillConfig, session_path: &Path) -> Result<()> {
    let doc = load_article(args.file.as_deref(), session_path, &args.keyword)?;
    let html = render_html(&doc, config, args.site.as_deref(), &args.keyword)?;
    write_output(args.output.as_deref(), &html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;

    fn doc() -> ArticleDocument {
        ArticleDocument::from_json(
            r#"{"title": "T", "content": {"intro": "Bitcoin climbs", "sections": [], "conclusion": "c"}}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_render_without_site() {
        let html = render_html(&doc(), &QuillConfig::default(), None, "Bitcoin").unwrap();
        assert!(html.starts_with("<p>Bitcoin climbs</p>"));
    }

    #[test]
    fn test_render_with_site_options() {
        let config = QuillConfig::from_toml(
            r#"
[sites.icobench]
base_url = "https://icobench.com"
username = "editor"
disclosure_note = "[su_note]Sponsored[/su_note]"
"#,
        )
        .unwrap();

        // Rendering alone never attaches the promotion disclosure
        let html = render_html(&doc(), &config, Some("icobench"), "Bitcoin").unwrap();
        assert!(html.ends_with("<p>c</p>"));

        assert!(matches!(
            render_html(&doc(), &config, Some("newsbtc"), ""),
            Err(CliError::Config(_))
        ));
    }
}
