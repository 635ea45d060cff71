//! LLM provider abstractions for policylens-runtime.
//!
//! This module defines the trait for completion providers, the Gemini and
//! OpenAI implementations, and the ordered chain that performs the single
//! configured provider-to-provider fallback.
//!
//! ## Security
//!
//! All providers use the [`secrets`] module for secure credential handling.
//! See [`ApiCredential`] for the recommended patterns.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

mod gemini;
mod openai;
pub mod secrets;

pub use gemini::{GeminiProvider, GOOGLE_API_KEY_ENV};
pub use openai::{OpenAiProvider, OPENAI_API_KEY_ENV};
pub use secrets::{ApiCredential, CredentialSource};

use crate::config::RuntimeConfig;

/// Errors from LLM providers.
///
/// Every variant is a communication-class failure to the generation
/// pipeline; the distinctions exist for logging and diagnostics.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Malformed provider response: {0}")]
    ParseError(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// Configuration for a completion request.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// Model to use
    pub model: String,

    /// Ceiling on generated output tokens
    pub max_tokens: u32,

    /// Sampling temperature (low favors determinism)
    pub temperature: f32,

    /// Request timeout
    pub timeout: Duration,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: crate::config::DEFAULT_PRIMARY_MODEL.to_string(),
            max_tokens: 400,
            temperature: 0.3,
            timeout: Duration::from_secs(30),
        }
    }
}

/// A chat message for LLM completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role: "user" or "assistant"
    pub role: String,

    /// Message content
    pub content: String,
}

impl ChatMessage {
    /// Create a user message. The brief pipeline sends exactly one.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Response from an LLM completion.
///
/// Only the textual content of the provider's first candidate is kept;
/// additional candidates are never consulted.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Generated content
    pub content: String,

    /// Model that produced it
    pub model: String,
}

/// Provider abstraction allows swapping LLM backends.
///
/// This is the only place where network calls to a completion service are
/// made. Implementations must not retry internally; fallback across
/// providers is the [`ProviderChain`]'s job.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Execute a chat completion.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError>;

    /// Check if the provider is usable (credential present).
    fn health_check(&self) -> bool;

    /// Provider name for logs.
    fn name(&self) -> &str;
}

/// An ordered list of providers tried within a single invocation attempt.
///
/// The first success wins; the last failure propagates. The chain carries
/// a per-entry model identifier, so the primary and fallback families can
/// run different models. There is no retry beyond walking the list once.
pub struct ProviderChain {
    entries: Vec<ChainEntry>,
}

struct ChainEntry {
    provider: Arc<dyn LlmProvider>,
    model: String,
}

impl ProviderChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a provider with the model it should run.
    pub fn push(mut self, provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        self.entries.push(ChainEntry {
            provider,
            model: model.into(),
        });
        self
    }

    /// Number of providers in the chain.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the chain has no providers.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build the chain from environment credentials.
    ///
    /// The Gemini primary is required. The OpenAI fallback joins the chain
    /// only when `OPENAI_API_KEY` is set and non-empty; without it, a
    /// primary failure propagates immediately.
    pub fn from_env(config: &RuntimeConfig) -> Result<Self, ProviderError> {
        let mut chain = Self::new().push(
            Arc::new(GeminiProvider::from_env()?),
            config.primary_model.clone(),
        );

        if ApiCredential::env_present(OPENAI_API_KEY_ENV) {
            chain = chain.push(
                Arc::new(OpenAiProvider::from_env()?),
                config.fallback_model.clone(),
            );
        } else {
            tracing::debug!(
                "{} not set, primary provider failures will not fall back",
                OPENAI_API_KEY_ENV
            );
        }

        Ok(chain)
    }

    /// Walk the chain once, returning the first successful completion.
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        base: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        let mut last_error = None;

        for entry in &self.entries {
            let config = CompletionConfig {
                model: entry.model.clone(),
                ..base.clone()
            };

            match entry.provider.complete(messages, &config).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    tracing::warn!(
                        provider = entry.provider.name(),
                        model = %entry.model,
                        error = %e,
                        "provider call failed"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| ProviderError::NotConfigured("empty provider chain".to_string())))
    }
}

impl Default for ProviderChain {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ProviderChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries: Vec<String> = self
            .entries
            .iter()
            .map(|e| format!("{}:{}", e.provider.name(), e.model))
            .collect();
        f.debug_struct("ProviderChain").field("entries", &entries).finish()
    }
}
