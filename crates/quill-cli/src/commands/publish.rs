//! Publish command implementation.

use super::load_article;
use crate::cli::PublishArgs;
use crate::config::QuillConfig;
use crate::error::Result;
use crate::output::Formatter;
use crate::session::{load_session, save_session};
use quill_domain::{ArticleDocument, GeneratedImage};
use quill_generator::{illustrate, SessionState};
use quill_llm::TogetherImageProvider;
use quill_publisher::{publish_article, render_article, WordPressClient};
use std::path::Path;

/// What to publish and where.
pub(crate) struct PublishPlan<'a> {
    /// Site name, or the configured default
    pub site: Option<&'a str>,
    /// Focus keyword
    pub keyword: &'a str,
    /// Whether the article features a promotion
    pub promoted: bool,
    /// Whether to generate a featured image
    pub image: bool,
}

async fn featured_image(
    config: &QuillConfig,
    doc: &ArticleDocument,
    formatter: &Formatter,
) -> Option<GeneratedImage> {
    match TogetherImageProvider::new(config.together.clone()) {
        Ok(provider) => {
            let image = illustrate(&provider, doc).await;
            if image.is_none() {
                eprintln!("{}", formatter.warning("No featured image was generated"));
            }
            image
        }
        Err(e) => {
            eprintln!(
                "{}",
                formatter.warning(&format!("Skipping featured image: {}", e))
            );
            None
        }
    }
}

/// Render `doc` for the chosen site and create the draft; returns the edit URL.
pub(crate) async fn publish_document(
    doc: &ArticleDocument,
    config: &QuillConfig,
    plan: PublishPlan<'_>,
    formatter: &Formatter,
) -> Result<String> {
    let (site_name, site) = config.site(plan.site)?;
    let rendered = render_article(doc, &site.render_options(plan.keyword, plan.promoted));

    let featured = if plan.image {
        featured_image(config, doc, formatter).await
    } else {
        None
    };

    let client = WordPressClient::new(site.clone())?;
    let outcome = publish_article(&client, rendered, featured.as_ref()).await?;

    eprintln!(
        "{}",
        formatter.success(&format!(
            "Draft '{}' created on {} (post {})",
            doc.title, site_name, outcome.post_id
        ))
    );
    Ok(outcome.edit_url)
}

/// Execute the publish command.
pub async fn execute_publish(
    args: PublishArgs,
    config: &QuillConfig,
    session_path: &Path,
    formatter: &Formatter,
) -> Result<()> {
    let doc = load_article(args.file.as_deref(), session_path, &args.keyword)?;
    let plan = PublishPlan {
        site: args.site.as_deref(),
        keyword: &args.keyword,
        promoted: args.promoted,
        image: args.image,
    };
    let edit_url = publish_document(&doc, config, plan, formatter).await?;

    let state = load_session(session_path)?;
    save_session(
        session_path,
        &SessionState {
            pending_edit_url: Some(edit_url.clone()),
            ..state
        },
    )?;

    println!("{}", edit_url);
    Ok(())
}
