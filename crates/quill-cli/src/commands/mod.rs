//! Command implementations.

pub mod configure;
pub mod generate;
pub mod publish;
pub mod render;
pub mod repair;

pub use self::configure::execute_config;
pub use self::generate::execute_generate;
pub use self::publish::execute_publish;
pub use self::render::execute_render;
pub use self::repair::execute_repair;

use crate::error::{CliError, Result};
use crate::session::load_session;
use quill_domain::ArticleDocument;
use quill_generator::{repair, validate, ValidationContext, ValidationMode};
use std::io::Read;
use std::path::Path;

/// Read `file`, or stdin when no file is given.
pub(crate) fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

/// Write `content` to `path`, or print it when no path is given.
pub(crate) fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, content)?,
        None => println!("{}", content),
    }
    Ok(())
}

/// The article in `file`, or the session's last article.
///
/// Files go through repair and lenient validation, so hand-edited or
/// truncated JSON still loads.
pub(crate) fn load_article(
    file: Option<&Path>,
    session_path: &Path,
    keyword: &str,
) -> Result<ArticleDocument> {
    match file {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            let outcome = repair(&text);
            Ok(validate(
                &outcome.value,
                ValidationMode::Lenient,
                &ValidationContext::new(keyword),
            )?)
        }
        None => load_session(session_path)?
            .last_document()?
            .ok_or(CliError::NoArticle),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::save_session;
    use quill_generator::SessionState;
    use tempfile::TempDir;

    #[test]
    fn test_load_article_repairs_files() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("article.json");
        std::fs::write(
            &file,
            "```json\n{\"title\": \"Bitcoin Rally\", \"content\": {\"intro\": \"Price surged\", \"sections\": [], \"conclusion\": \"Stay tuned\"",
        )
        .unwrap();

        let doc = load_article(Some(&file), &dir.path().join("session.json"), "Bitcoin").unwrap();
        assert_eq!(doc.title, "Bitcoin Rally");
        assert!(doc.seo.is_complete());
    }

    #[test]
    fn test_load_article_from_session() {
        let dir = TempDir::new().unwrap();
        let session = dir.path().join("session.json");
        assert!(matches!(
            load_article(None, &session, ""),
            Err(CliError::NoArticle)
        ));

        let doc = ArticleDocument::from_json(
            r#"{"title": "Cached", "content": {"intro": "i", "sections": [], "conclusion": "c"}}"#,
        )
        .unwrap();
        save_session(
            &session,
            &SessionState {
                last_article: Some(doc.to_json().unwrap()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(load_article(None, &session, "").unwrap().title, "Cached");
    }
}
