//! The brief generation pipeline.
//!
//! One invocation per inbound request: check the cache, build the prompt,
//! walk the provider chain, extract and validate the completion, store the
//! result. Failures surface as an explicit [`GenerateError`]; the HTTP
//! layer maps its two variants to the static degraded payloads. Degraded
//! payloads are never cached.

use std::sync::Arc;
use thiserror::Error;

use policylens_core::{build_prompt, language_name, parse_brief, BriefError, BriefRequest, BriefResult};

use crate::cache::{BriefCache, CacheKey};
use crate::config::RuntimeConfig;
use crate::providers::{ChatMessage, ProviderChain, ProviderError};

/// Errors from brief generation.
///
/// Both variants are terminal for the request: there is no pipeline retry,
/// only the single provider-to-provider fallback inside the chain.
#[derive(Error, Debug)]
pub enum GenerateError {
    /// The provider responded, but the text was not a usable brief.
    #[error("completion could not be parsed or validated: {0}")]
    ParseOrValidation(#[from] BriefError),

    /// No provider produced a completion at all.
    #[error("provider communication failed: {0}")]
    Communication(#[from] ProviderError),
}

/// Produces a [`BriefResult`] for each request, memoizing validated
/// results in the injected cache.
pub struct BriefGenerator {
    chain: ProviderChain,
    cache: Arc<dyn BriefCache>,
    config: RuntimeConfig,
}

impl BriefGenerator {
    /// Create a new generator.
    pub fn new(chain: ProviderChain, cache: Arc<dyn BriefCache>, config: RuntimeConfig) -> Self {
        Self {
            chain,
            cache,
            config,
        }
    }

    /// Generate a brief for an already-validated request.
    ///
    /// # Execution Flow
    /// 1. Cache lookup; a hit is returned unchanged with no provider call
    /// 2. Prompt construction (audience label, resolved language name)
    /// 3. One walk of the provider chain
    /// 4. Fence stripping, JSON parsing, schema validation
    /// 5. Store and return the validated brief
    pub async fn generate(&self, request: &BriefRequest) -> Result<BriefResult, GenerateError> {
        let key = CacheKey::new(&request.document, request.audience, request.language);

        if let Some(hit) = self.cache.lookup(&key) {
            tracing::debug!(audience = request.audience.label(), "brief served from cache");
            return Ok(hit);
        }

        let prompt = build_prompt(
            &request.document,
            request.audience.label(),
            language_name(request.language.code()),
        );

        let completion = self
            .chain
            .complete(&[ChatMessage::user(prompt)], &self.config.completion_config())
            .await?;

        tracing::debug!(model = %completion.model, "completion received");

        let brief = parse_brief(&completion.content)?;

        self.cache.store(key, brief.clone());
        Ok(brief)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{InMemoryCache, ManualClock};
    use crate::providers::{CompletionConfig, CompletionResponse, LlmProvider};
    use async_trait::async_trait;
    use policylens_core::{Audience, Language};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const TTL: Duration = Duration::from_secs(600);

    const VALID_BRIEF: &str = r#"{
        "summary": "Street vendors must register with the city.",
        "key_obligations": ["Register by 2025-03-01", "Display the permit"],
        "effective_date": "2025-03-01",
        "confidence": "high"
    }"#;

    struct ScriptedProvider {
        reply: Option<&'static str>,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedProvider {
        fn ok(reply: &'static str) -> (Arc<Self>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let provider = Arc::new(Self {
                reply: Some(reply),
                calls: calls.clone(),
            });
            (provider, calls)
        }

        fn failing() -> (Arc<Self>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let provider = Arc::new(Self {
                reply: None,
                calls: calls.clone(),
            });
            (provider, calls)
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn complete(
            &self,
            _messages: &[ChatMessage],
            config: &CompletionConfig,
        ) -> Result<CompletionResponse, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.reply {
                Some(text) => Ok(CompletionResponse {
                    content: text.to_string(),
                    model: config.model.clone(),
                }),
                None => Err(ProviderError::HttpError("connection refused".to_string())),
            }
        }

        fn health_check(&self) -> bool {
            true
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn request(document: &str, audience: Audience, language: Language) -> BriefRequest {
        BriefRequest {
            document: document.to_string(),
            audience,
            language,
        }
    }

    fn generator_with(
        provider: Arc<ScriptedProvider>,
        clock: &ManualClock,
    ) -> BriefGenerator {
        let chain = ProviderChain::new().push(provider, "test-model");
        let cache = Arc::new(InMemoryCache::with_clock(TTL, Arc::new(clock.clone())));
        BriefGenerator::new(chain, cache, RuntimeConfig::default())
    }

    #[tokio::test]
    async fn test_success_parses_and_returns_brief() {
        let (provider, _) = ScriptedProvider::ok(VALID_BRIEF);
        let generator = generator_with(provider, &ManualClock::new());

        let brief = generator
            .generate(&request("doc", Audience::Citizen, Language::En))
            .await
            .unwrap();

        assert_eq!(brief.summary, "Street vendors must register with the city.");
        assert_eq!(brief.confidence, "high");
    }

    #[tokio::test]
    async fn test_repeat_request_hits_cache() {
        let (provider, calls) = ScriptedProvider::ok(VALID_BRIEF);
        let generator = generator_with(provider, &ManualClock::new());
        let req = request("doc", Audience::Citizen, Language::En);

        let first = generator.generate(&req).await.unwrap();
        let second = generator.generate(&req).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_elapsed_window_invokes_provider_again() {
        let clock = ManualClock::new();
        let (provider, calls) = ScriptedProvider::ok(VALID_BRIEF);
        let generator = generator_with(provider, &clock);
        let req = request("doc", Audience::Citizen, Language::En);

        generator.generate(&req).await.unwrap();
        clock.advance(TTL);
        generator.generate(&req).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_audience_and_language_partition_the_cache() {
        let (provider, calls) = ScriptedProvider::ok(VALID_BRIEF);
        let generator = generator_with(provider, &ManualClock::new());

        generator
            .generate(&request("doc", Audience::Citizen, Language::En))
            .await
            .unwrap();
        generator
            .generate(&request("doc", Audience::Journalist, Language::En))
            .await
            .unwrap();
        generator
            .generate(&request("doc", Audience::Citizen, Language::Sw))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_fenced_completion_equals_bare_completion() {
        let (bare, _) = ScriptedProvider::ok(VALID_BRIEF);
        let bare_generator = generator_with(bare, &ManualClock::new());

        let fenced: &'static str = Box::leak(
            format!("```json\n{}\n```", VALID_BRIEF).into_boxed_str(),
        );
        let (wrapped, _) = ScriptedProvider::ok(fenced);
        let fenced_generator = generator_with(wrapped, &ManualClock::new());

        let req = request("doc", Audience::Citizen, Language::En);
        assert_eq!(
            bare_generator.generate(&req).await.unwrap(),
            fenced_generator.generate(&req).await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_non_json_completion_is_parse_error_and_not_cached() {
        let (provider, calls) = ScriptedProvider::ok("Sorry, I cannot summarize that.");
        let generator = generator_with(provider, &ManualClock::new());
        let req = request("doc", Audience::Citizen, Language::En);

        let first = generator.generate(&req).await;
        assert!(matches!(first, Err(GenerateError::ParseOrValidation(_))));

        // A failed completion must not short-circuit the next attempt
        let second = generator.generate(&req).await;
        assert!(second.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_missing_field_is_parse_error() {
        let missing_confidence = r#"{
            "summary": "ok",
            "key_obligations": ["a", "b"],
            "effective_date": "unknown"
        }"#;
        let (provider, _) = ScriptedProvider::ok(missing_confidence);
        let generator = generator_with(provider, &ManualClock::new());

        let result = generator
            .generate(&request("doc", Audience::Citizen, Language::En))
            .await;
        assert!(matches!(result, Err(GenerateError::ParseOrValidation(_))));
    }

    #[tokio::test]
    async fn test_provider_failure_is_communication_error() {
        let (provider, _) = ScriptedProvider::failing();
        let generator = generator_with(provider, &ManualClock::new());

        let result = generator
            .generate(&request("doc", Audience::Citizen, Language::En))
            .await;
        assert!(matches!(result, Err(GenerateError::Communication(_))));
    }

    #[tokio::test]
    async fn test_fallback_provider_rescues_the_request() {
        let (primary, primary_calls) = ScriptedProvider::failing();
        let (fallback, fallback_calls) = ScriptedProvider::ok(VALID_BRIEF);

        let chain = ProviderChain::new()
            .push(primary, "primary-model")
            .push(fallback, "fallback-model");
        let cache = Arc::new(InMemoryCache::new(TTL));
        let generator = BriefGenerator::new(chain, cache, RuntimeConfig::default());

        let brief = generator
            .generate(&request("doc", Audience::Citizen, Language::En))
            .await
            .unwrap();

        assert_eq!(brief.confidence, "high");
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
    }
}
