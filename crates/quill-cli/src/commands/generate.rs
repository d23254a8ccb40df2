//! Generate command implementation.

use super::publish::{publish_document, PublishPlan};
use super::write_output;
use crate::cli::GenerateArgs;
use crate::config::QuillConfig;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::session::{load_session, save_session};
use quill_generator::{
    find_promotion, ArticleGenerator, ArticlePipeline, GenerationRequest, GeneratorError,
    PipelineError, SessionState,
};
use quill_llm::GeminiProvider;
use quill_sources::SourceExtractor;
use std::path::Path;

/// Execute the generate command.
pub async fn execute_generate(
    args: GenerateArgs,
    config: &QuillConfig,
    session_path: &Path,
    formatter: &Formatter,
) -> Result<()> {
    let pasted = match (&args.text, &args.text_file) {
        (Some(text), _) => Some(text.clone()),
        (None, Some(path)) => Some(std::fs::read_to_string(path)?),
        (None, None) => None,
    };

    let extractor = SourceExtractor::new(config.jina.clone(), config.transcripts.clone())?;
    let report = extractor.extract_all(&args.urls, pasted.as_deref()).await;
    for (url, error) in &report.failures {
        eprintln!("{}", formatter.warning(&format!("Skipped {}: {}", url, error)));
    }
    if report.documents.is_empty() {
        return Err(CliError::InvalidInput(
            "No source content could be extracted".to_string(),
        ));
    }

    let provider = GeminiProvider::new(config.gemini.clone())?;
    let generator = ArticleGenerator::new(provider, config.generator.clone())?;
    let pipeline = ArticlePipeline::new(generator).with_promotions(config.promotions.clone());

    let promoted = args
        .promotion
        .as_deref()
        .and_then(|name| find_promotion(&config.promotions, name))
        .is_some();

    let request = GenerationRequest {
        sources: report.documents,
        primary_keyword: args.keyword.clone(),
        secondary_keywords: args.secondary.clone(),
        news_angle: args.angle.clone(),
        section_count: args.sections,
        promotion: args.promotion.clone(),
        slug_suffix: args.slug_suffix.clone(),
        lenient: args.lenient,
    };

    let state = load_session(session_path)?;
    let (doc, mut state) = match pipeline.run(request, state.clone()).await {
        Ok(result) => result,
        Err(e) => {
            if let PipelineError::Generation(GeneratorError::GenerationFailed {
                raw_response: Some(raw),
                ..
            }) = &e
            {
                save_session(
                    session_path,
                    &SessionState {
                        last_raw_response: Some(raw.clone()),
                        ..state
                    },
                )?;
                eprintln!(
                    "{}",
                    formatter.info(&format!(
                        "Last raw response saved to {}",
                        session_path.display()
                    ))
                );
            }
            return Err(e.into());
        }
    };
    save_session(session_path, &state)?;

    eprintln!("{}", formatter.success("Article generated"));
    eprintln!("{}", formatter.article_summary(&doc));

    if !args.publish || args.output.is_some() {
        write_output(args.output.as_deref(), &doc.to_json()?)?;
    }

    if args.publish {
        let plan = PublishPlan {
            site: args.site.as_deref(),
            keyword: &args.keyword,
            promoted,
            image: args.image,
        };
        let edit_url = publish_document(&doc, config, plan, formatter).await?;
        state.pending_edit_url = Some(edit_url.clone());
        save_session(session_path, &state)?;
        println!("{}", edit_url);
    }

    Ok(())
}
