//! Integration tests for repair, validation and the generation loop

#[cfg(test)]
mod tests {
    use crate::{
        illustrate, repair, validate, ArticleGenerator, ArticlePipeline, GenerationRequest,
        GeneratorConfig, GeneratorError, Locale, PipelineError, Promotion, RepairStage,
        SessionState, ValidationContext, ValidationMode,
    };
    use async_trait::async_trait;
    use quill_domain::traits::ImageGenerator;
    use quill_domain::{ArticleDocument, GeneratedImage, SourceDocument};
    use quill_llm::{LlmError, MockProvider};
    use serde_json::{json, Value};

    const BITCOIN_RALLY: &str = "```json\n{\"title\": \"Bitcoin Rally\", \"content\": {\"intro\": \"Price surged\", \"sections\": [], \"conclusion\": \"Stay tuned\"\n```";

    const MISSING_TITLE: &str =
        r#"{"content": {"intro": "Price surged", "sections": [], "conclusion": "Stay tuned"}}"#;

    fn fast_config(max_attempts: u32) -> GeneratorConfig {
        GeneratorConfig {
            max_attempts,
            base_delay_ms: 1,
            max_delay_ms: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_bitcoin_rally_repairs_and_validates() {
        let outcome = repair(BITCOIN_RALLY);
        assert!(!outcome.stage.is_fallback());

        let doc = validate(
            &outcome.value,
            ValidationMode::Strict,
            &ValidationContext::new("Bitcoin"),
        )
        .unwrap();

        assert_eq!(doc.title, "Bitcoin Rally");
        assert!(doc.content.sections.is_empty());
        assert_eq!(doc.content.conclusion, "Stay tuned");
        assert_eq!(doc.content.intro.full_text(), "Price surged");
    }

    #[tokio::test]
    async fn test_bitcoin_rally_end_to_end() {
        let provider = MockProvider::new(BITCOIN_RALLY);
        let generator = ArticleGenerator::new(provider.clone(), fast_config(3)).unwrap();

        let article = generator
            .generate("prompt", &ValidationContext::new("Bitcoin"))
            .await
            .unwrap();

        assert_eq!(provider.call_count(), 1);
        assert_eq!(article.document.title, "Bitcoin Rally");
        assert!(article.document.content.sections.is_empty());
        assert_eq!(article.document.content.conclusion, "Stay tuned");
        assert_eq!(article.raw_response, BITCOIN_RALLY);
    }

    #[tokio::test]
    async fn test_retry_terminates_after_max_attempts() {
        for max_attempts in [1, 3, 5] {
            let provider = MockProvider::new(MISSING_TITLE);
            let generator =
                ArticleGenerator::new(provider.clone(), fast_config(max_attempts)).unwrap();

            let result = generator
                .generate("prompt", &ValidationContext::default())
                .await;

            match result {
                Err(GeneratorError::GenerationFailed {
                    attempts,
                    reason,
                    raw_response,
                    repaired_text,
                }) => {
                    assert_eq!(attempts, max_attempts);
                    assert!(reason.contains("title"));
                    assert_eq!(raw_response.as_deref(), Some(MISSING_TITLE));
                    assert_eq!(repaired_text.as_deref(), Some(MISSING_TITLE));
                }
                other => panic!("expected GenerationFailed, got {:?}", other),
            }
            assert_eq!(provider.call_count(), max_attempts as usize);
        }
    }

    #[tokio::test]
    async fn test_mixed_failures_share_one_budget() {
        let provider = MockProvider::new(MISSING_TITLE);
        provider.queue_error(LlmError::Timeout(std::time::Duration::from_secs(1)));
        let generator = ArticleGenerator::new(provider.clone(), fast_config(3)).unwrap();

        let result = generator
            .generate("prompt", &ValidationContext::default())
            .await;

        assert!(matches!(
            result,
            Err(GeneratorError::GenerationFailed { attempts: 3, .. })
        ));
        assert_eq!(provider.call_count(), 3);
    }

    #[test]
    fn test_lenient_defaulting() {
        let value = json!({"title": "X", "content": {}});
        let doc = validate(
            &value,
            ValidationMode::Lenient,
            &ValidationContext::new("Solana").with_locale(Locale::English),
        )
        .unwrap();

        assert_eq!(doc.title, "X");
        assert!(doc.content.sections.is_empty());
        assert!(!doc.content.conclusion.is_empty());
        assert!(doc.content.conclusion.contains("Solana"));
        for (name, value) in doc.seo.fields() {
            assert!(!value.is_empty(), "seo.{} should be filled", name);
        }
    }

    #[test]
    fn test_strict_rejects_what_lenient_fills() {
        let value = json!({"title": "X", "content": {}});
        let ctx = ValidationContext::new("Solana");
        assert!(validate(&value, ValidationMode::Strict, &ctx).is_err());
        assert!(validate(&value, ValidationMode::Lenient, &ctx).is_ok());
    }

    #[test]
    fn test_thai_sigils_survive_repair() {
        let raw = r#"{"title": "ราคา $BTC พุ่ง", "content": {"intro": "นักลงทุนถือ \$ETH และ "$SOL" เพิ่ม", "conclusion": "จบ"}}"#;
        let outcome = repair(raw);
        assert_eq!(outcome.stage, RepairStage::Escaping);

        let doc = validate(
            &outcome.value,
            ValidationMode::Strict,
            &ValidationContext::new("BTC"),
        )
        .unwrap();
        assert_eq!(doc.title, "ราคา $BTC พุ่ง");
        assert_eq!(
            doc.content.intro.full_text(),
            "นักลงทุนถือ $ETH และ \"$SOL\" เพิ่ม"
        );
    }

    #[test]
    fn test_reply_cut_inside_seo_key_still_validates() {
        let raw = "```json\n{\"title\": \"ETF flows\", \"content\": {\"intro\": \"Inflows hit a record\", \"sections\": [], \"conclusion\": \"C\"}, \"seo\": {\"meta_ti";
        let outcome = repair(raw);
        assert!(!outcome.stage.is_fallback());

        let doc = validate(
            &outcome.value,
            ValidationMode::Strict,
            &ValidationContext::new("ETF"),
        )
        .unwrap();
        assert_eq!(doc.content.conclusion, "C");
        assert_eq!(doc.seo.meta_title, "ETF flows");
    }

    fn source(content: &str) -> SourceDocument {
        SourceDocument {
            title: "Bitcoin tops $100k".to_string(),
            url: "https://coindesk.com/markets/btc".to_string(),
            content: content.to_string(),
            source: "CoinDesk".to_string(),
            ..Default::default()
        }
    }

    fn promotions() -> Vec<Promotion> {
        vec![Promotion {
            name: "Best Wallet".to_string(),
            image_url: "https://cdn.example/best-wallet.png".to_string(),
            alt: "Best Wallet".to_string(),
            width: Some(600),
            height: Some(558),
        }]
    }

    #[tokio::test]
    async fn test_pipeline_caches_article_in_state() {
        let provider = MockProvider::new(BITCOIN_RALLY);
        let generator = ArticleGenerator::new(provider, fast_config(3)).unwrap();
        let pipeline = ArticlePipeline::new(generator).with_promotions(promotions());

        let request = GenerationRequest {
            sources: vec![source("Bitcoin rallied past $100k on ETF inflows.")],
            primary_keyword: "Bitcoin".to_string(),
            promotion: Some("best wallet".to_string()),
            ..Default::default()
        };
        let state = SessionState {
            pending_edit_url: Some("https://site/edit/1".to_string()),
            ..Default::default()
        };

        let (doc, state) = pipeline.run(request, state).await.unwrap();

        assert_eq!(doc.title, "Bitcoin Rally");
        assert_eq!(doc.media.images.len(), 1);
        assert_eq!(doc.media.images[0].url, "https://cdn.example/best-wallet.png");
        // No sections to anchor to, so the banner renders before the conclusion
        assert_eq!(doc.media.images[0].placement, None);

        let cached = state.last_document().unwrap().unwrap();
        assert_eq!(cached, doc);
        assert_eq!(state.last_raw_response.as_deref(), Some(BITCOIN_RALLY));
        assert_eq!(state.pending_edit_url.as_deref(), Some("https://site/edit/1"));
    }

    #[tokio::test]
    async fn test_pipeline_anchors_promotion_to_last_section() {
        let reply = r#"{"title": "Wallet week", "content": {"intro": "i", "conclusion": "c",
            "sections": [{"heading": "Market"}, {"heading": "Best Wallet presale"}]}}"#;
        let generator = ArticleGenerator::new(MockProvider::new(reply), fast_config(1)).unwrap();
        let pipeline = ArticlePipeline::new(generator).with_promotions(promotions());

        let request = GenerationRequest {
            sources: vec![source("Wallet adoption is growing.")],
            primary_keyword: "Best Wallet".to_string(),
            promotion: Some("Best Wallet".to_string()),
            ..Default::default()
        };
        let (doc, _) = pipeline.run(request, SessionState::default()).await.unwrap();

        assert_eq!(doc.media.images[0].placement.as_deref(), Some("sections[1]"));
    }

    #[tokio::test]
    async fn test_pipeline_requires_sources() {
        let provider = MockProvider::new(BITCOIN_RALLY);
        let generator = ArticleGenerator::new(provider.clone(), fast_config(3)).unwrap();
        let pipeline = ArticlePipeline::new(generator);

        let request = GenerationRequest {
            sources: vec![source("   ")],
            primary_keyword: "Bitcoin".to_string(),
            ..Default::default()
        };

        let result = pipeline.run(request, SessionState::default()).await;
        assert!(matches!(result, Err(PipelineError::NoSources)));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_pipeline_lenient_request_accepts_partial_article() {
        let provider = MockProvider::new(r#"{"title": "Solana climbs", "content": {"intro": "SOL rose"}}"#);
        let generator = ArticleGenerator::new(provider.clone(), fast_config(2)).unwrap();
        let pipeline = ArticlePipeline::new(generator);

        let mut request = GenerationRequest {
            sources: vec![source("Solana rose 5% overnight.")],
            primary_keyword: "Solana".to_string(),
            ..Default::default()
        };
        assert!(pipeline.run(request.clone(), SessionState::default()).await.is_err());

        request.lenient = true;
        let (doc, state) = pipeline.run(request, SessionState::default()).await.unwrap();
        assert_eq!(doc.title, "Solana climbs");
        assert!(doc.content.conclusion.contains("Solana"));
        assert!(state.last_article.is_some());
        assert_eq!(provider.call_count(), 4);
    }

    struct StubImages {
        fail: bool,
    }

    #[async_trait]
    impl ImageGenerator for StubImages {
        type Error = LlmError;

        async fn generate_image(
            &self,
            prompt: &str,
            alt_text: Option<&str>,
        ) -> Result<GeneratedImage, Self::Error> {
            if self.fail {
                return Err(LlmError::RateLimitExceeded);
            }
            Ok(GeneratedImage {
                b64_data: "aGVsbG8=".to_string(),
                alt_text: alt_text.unwrap_or("generated").to_string(),
                prompt: prompt.to_string(),
            })
        }
    }

    fn illustrated_doc() -> ArticleDocument {
        validate(
            &json!({"title": "T", "content": {"intro": "i", "conclusion": "c"},
                "seo": {"imagePrompt": "A trading desk at dawn", "altText": "โต๊ะเทรด"}}),
            ValidationMode::Strict,
            &ValidationContext::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_illustrate_uses_seo_prompt() {
        let image = illustrate(&StubImages { fail: false }, &illustrated_doc())
            .await
            .unwrap();
        assert_eq!(image.prompt, "A trading desk at dawn");
        assert_eq!(image.alt_text, "โต๊ะเทรด");
    }

    #[tokio::test]
    async fn test_illustrate_failure_is_optional() {
        assert!(illustrate(&StubImages { fail: true }, &illustrated_doc())
            .await
            .is_none());
    }

    #[test]
    fn test_structured_response_shapes_repair_alike() {
        use crate::repair_response;
        use quill_domain::RawModelResponse;

        let value = json!([{"title": "A", "content": {"intro": "x"}}]);
        let from_value = repair_response(RawModelResponse::Structured(value.clone()));
        let from_text = repair_response(RawModelResponse::Text(value.to_string()));

        assert_eq!(from_value.value, from_text.value);
        assert_eq!(from_value.stage, RepairStage::Direct);
    }

    fn document_value(title: &str, intro: &str) -> Value {
        json!({
            "title": title,
            "content": {"intro": intro, "sections": [], "conclusion": "end"},
            "seo": {"slug": "s"},
        })
    }

    mod properties {
        use super::*;
        use crate::{balance_delimiters, escape_string_literals, structural_delimiter_counts};
        use proptest::prelude::*;

        proptest! {
            /// Property: repair is a no-op on well-formed documents
            #[test]
            fn test_repair_idempotent_on_valid(title in any::<String>(), intro in any::<String>()) {
                let value = document_value(&title, &intro);
                let text = serde_json::to_string_pretty(&value).unwrap();

                let outcome = repair(&text);
                prop_assert_eq!(outcome.stage, RepairStage::Direct);
                prop_assert_eq!(outcome.value, value);
            }

            /// Property: any input yields a document with a title and an intro
            #[test]
            fn test_repair_is_total(raw in any::<String>()) {
                let outcome = repair(&raw);
                let doc = validate(&outcome.value, ValidationMode::Lenient, &ValidationContext::new("BTC"));
                prop_assert!(doc.is_ok());
                let doc = doc.unwrap();
                prop_assert!(!doc.title.trim().is_empty());
                prop_assert!(!doc.content.intro.is_empty());
            }

            /// Property: totality holds for JSON-like fragments too
            #[test]
            fn test_repair_is_total_on_fragments(raw in r#"[{}\[\]",:a-z0-9 $\\\n]{0,80}"#) {
                let outcome = repair(&raw);
                let doc = validate(&outcome.value, ValidationMode::Lenient, &ValidationContext::default());
                prop_assert!(doc.is_ok());
                prop_assert!(!doc.unwrap().title.trim().is_empty());
            }

            /// Property: balancing leaves as many closers as openers
            #[test]
            fn test_balance_invariant(raw in r#"[{}\[\]",:a-z \\]{0,80}"#) {
                let balanced = balance_delimiters(&raw);
                let (opens, closes) = structural_delimiter_counts(&balanced);
                prop_assert_eq!(opens, closes);
            }

            /// Property: braces and sigils inside strings survive balancing and escaping
            #[test]
            fn test_string_spans_preserved(
                title in r#"[a-z {}\[\]$",:\\]{0,24}"#,
                intro in r#"[ก-ฮ {}$\[\]"]{0,24}"#,
            ) {
                let value = json!({"title": title, "content": {"intro": intro}});
                let text = value.to_string();

                prop_assert_eq!(escape_string_literals(&text), text.clone());

                let truncated = &text[..text.len() - 2];
                let rebalanced: Value = serde_json::from_str(&balance_delimiters(truncated)).unwrap();
                prop_assert_eq!(rebalanced, value);
            }
        }
    }
}
