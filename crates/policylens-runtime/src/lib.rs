//! # policylens-runtime
//!
//! LLM-facing runtime for PolicyLens.
//!
//! This crate owns everything with a side effect: the provider abstraction
//! (Gemini primary, OpenAI fallback, tried in order within a single
//! invocation attempt), secure credential handling, the time-bounded memo
//! cache, and the [`BriefGenerator`] pipeline that ties them together.
//!
//! The deterministic pieces — prompt text, fence stripping, schema
//! validation — live in `policylens-core` and are only called from here.
//!
//! ## Example
//!
//! ```rust,ignore
//! use policylens_runtime::{BriefGenerator, InMemoryCache, ProviderChain, RuntimeConfig};
//!
//! let config = RuntimeConfig::from_env()?;
//! let chain = ProviderChain::from_env(&config)?;
//! let cache = Arc::new(InMemoryCache::new(config.cache_ttl));
//! let generator = BriefGenerator::new(chain, cache, config);
//!
//! let brief = generator.generate(&request).await?;
//! ```

pub mod cache;
pub mod config;
pub mod generator;
pub mod providers;

pub use cache::{BriefCache, CacheKey, Clock, InMemoryCache, ManualClock, SystemClock};
pub use config::{ConfigError, RuntimeConfig};
pub use generator::{BriefGenerator, GenerateError};
pub use providers::{
    ApiCredential, ChatMessage, CompletionConfig, CompletionResponse, CredentialSource,
    GeminiProvider, LlmProvider, OpenAiProvider, ProviderChain, ProviderError,
};
