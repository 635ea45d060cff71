//! Runtime configuration resolved once at startup.
//!
//! Credential resolution is explicit: the provider chain reads its keys
//! from the environment when it is built (see `ProviderChain::from_env`),
//! and nothing mutates process-wide state at load time.

use std::time::Duration;
use thiserror::Error;

use crate::providers::CompletionConfig;

/// Default model for the primary (Gemini) provider family.
pub const DEFAULT_PRIMARY_MODEL: &str = "gemini-2.0-flash";

/// Default model for the fallback (OpenAI) provider family.
pub const DEFAULT_FALLBACK_MODEL: &str = "gpt-4o-mini";

const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(600);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid duration in {var}: {source}")]
    InvalidDuration {
        var: &'static str,
        #[source]
        source: humantime::DurationError,
    },
}

/// Runtime configuration for brief generation.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Model run by the primary provider
    pub primary_model: String,

    /// Model run by the fallback provider (when configured)
    pub fallback_model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Ceiling on generated output tokens
    pub max_tokens: u32,

    /// Per-request provider timeout
    pub request_timeout: Duration,

    /// Cache freshness window
    pub cache_ttl: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            primary_model: DEFAULT_PRIMARY_MODEL.to_string(),
            fallback_model: DEFAULT_FALLBACK_MODEL.to_string(),
            temperature: 0.3,
            max_tokens: 400,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

impl RuntimeConfig {
    /// Build the configuration from the environment.
    ///
    /// Recognized overrides:
    /// - `POLICYLENS_MODEL` - primary model identifier
    /// - `POLICYLENS_FALLBACK_MODEL` - fallback model identifier
    /// - `POLICYLENS_CACHE_TTL` - humantime duration, e.g. `600s` or `10m`
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(model) = std::env::var("POLICYLENS_MODEL") {
            config.primary_model = model;
        }
        if let Ok(model) = std::env::var("POLICYLENS_FALLBACK_MODEL") {
            config.fallback_model = model;
        }
        if let Ok(raw) = std::env::var("POLICYLENS_CACHE_TTL") {
            config.cache_ttl =
                humantime::parse_duration(&raw).map_err(|source| ConfigError::InvalidDuration {
                    var: "POLICYLENS_CACHE_TTL",
                    source,
                })?;
        }

        Ok(config)
    }

    /// Completion parameters shared by every chain entry; the chain swaps
    /// in the per-provider model.
    pub fn completion_config(&self) -> CompletionConfig {
        CompletionConfig {
            model: self.primary_model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            timeout: self.request_timeout,
        }
    }
}
