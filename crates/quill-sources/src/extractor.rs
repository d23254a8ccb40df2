//! URL to source document, picking the right backend per URL

use crate::error::SourceError;
use crate::jina::{JinaConfig, JinaReader};
use crate::youtube::{youtube_video_id, TranscriptConfig, TranscriptFetcher};
use async_trait::async_trait;
use quill_domain::traits::ContentSource;
use quill_domain::{Media, SourceDocument};
use tracing::{info, warn};

/// Extracts source material from web pages and YouTube videos
///
/// Video URLs are transcribed first; when no transcript is available the
/// page is read like any other URL.
#[derive(Debug, Clone)]
pub struct SourceExtractor {
    reader: JinaReader,
    transcripts: TranscriptFetcher,
}

/// Outcome of extracting several URLs
#[derive(Debug, Default)]
pub struct ExtractionReport {
    /// Documents extracted, in input order
    pub documents: Vec<SourceDocument>,
    /// URLs that failed and why
    pub failures: Vec<(String, SourceError)>,
}

impl SourceExtractor {
    /// Create an extractor from reader and transcript settings
    pub fn new(reader: JinaConfig, transcripts: TranscriptConfig) -> Result<Self, SourceError> {
        Ok(Self {
            reader: JinaReader::new(reader)?,
            transcripts: TranscriptFetcher::new(transcripts)?,
        })
    }

    async fn transcript(&self, url: &str, video_id: &str) -> Result<SourceDocument, SourceError> {
        let content = self.transcripts.fetch(video_id).await?;
        Ok(SourceDocument {
            title: "YouTube Video Transcript".to_string(),
            url: url.to_string(),
            content,
            source: format!("YouTube Video ({})", video_id),
            media: Media::default(),
        })
    }

    /// Extract every URL, then append pasted text as its own source
    ///
    /// A failing URL is recorded in the report and does not stop the others.
    pub async fn extract_all(&self, urls: &[String], pasted: Option<&str>) -> ExtractionReport {
        let mut report = ExtractionReport::default();

        for url in urls.iter().map(|u| u.trim()).filter(|u| !u.is_empty()) {
            match self.extract(url).await {
                Ok(doc) => report.documents.push(doc),
                Err(e) => {
                    warn!(url, "Extraction failed: {}", e);
                    report.failures.push((url.to_string(), e));
                }
            }
        }

        if let Some(text) = pasted.filter(|t| !t.trim().is_empty()) {
            report.documents.push(SourceDocument::pasted(text));
        }

        info!(
            documents = report.documents.len(),
            failures = report.failures.len(),
            "Source extraction finished"
        );
        report
    }
}

#[async_trait]
impl ContentSource for SourceExtractor {
    type Error = SourceError;

    async fn extract(&self, url: &str) -> Result<SourceDocument, Self::Error> {
        if url::Url::parse(url).is_err() {
            return Err(SourceError::InvalidUrl(url.to_string()));
        }

        if let Some(video_id) = youtube_video_id(url) {
            info!(url, video_id = %video_id, "Extracting YouTube transcript");
            match self.transcript(url, &video_id).await {
                Ok(doc) => return Ok(doc),
                Err(e) => warn!(url, "Transcript unavailable, reading the page instead: {}", e),
            }
        }

        info!(url, "Extracting page content");
        self.reader.read(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn extractor_for(server: &MockServer) -> SourceExtractor {
        SourceExtractor::new(
            JinaConfig {
                endpoint: server.uri(),
                ..Default::default()
            },
            TranscriptConfig {
                endpoint: server.uri(),
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_youtube_uses_transcript() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/timedtext"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<transcript><text>Bitcoin halving explained</text></transcript>"),
            )
            .mount(&server)
            .await;

        let doc = extractor_for(&server)
            .extract("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
            .await
            .unwrap();

        assert_eq!(doc.content, "Bitcoin halving explained");
        assert_eq!(doc.source, "YouTube Video (dQw4w9WgXcQ)");
    }

    #[tokio::test]
    async fn test_youtube_falls_back_to_reader() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/timedtext"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path_regex("youtu"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("Title: Halving video\nMarkdown Content:\nVideo description"),
            )
            .mount(&server)
            .await;

        let doc = extractor_for(&server)
            .extract("https://youtu.be/dQw4w9WgXcQ")
            .await
            .unwrap();

        assert_eq!(doc.title, "Halving video");
        assert_eq!(doc.content, "Video description");
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let server = MockServer::start().await;
        assert!(matches!(
            extractor_for(&server).extract("coindesk dot com").await,
            Err(SourceError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_extract_all_collects_failures_and_pasted_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex("good"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("Title: Good\nMarkdown Content:\nBody"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path_regex("bad"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let urls = vec![
            "https://good.example/a".to_string(),
            "  ".to_string(),
            "https://bad.example/b".to_string(),
        ];
        let report = extractor_for(&server)
            .extract_all(&urls, Some("Notes from the analyst call"))
            .await;

        assert_eq!(report.documents.len(), 2);
        assert_eq!(report.documents[0].title, "Good");
        assert_eq!(report.documents[1].source, "Additional Content");
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, "https://bad.example/b");
    }
}
