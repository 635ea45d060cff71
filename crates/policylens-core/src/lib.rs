//! # policylens-core
//!
//! Deterministic domain logic for PolicyLens: brief types, prompt
//! construction, and completion-text parsing.
//!
//! This crate never performs I/O and never calls an LLM. The runtime crate
//! feeds it completion text; everything here is a pure function of its
//! inputs, which keeps the whole extraction pipeline testable without a
//! provider in the loop.
//!
//! ## Example
//!
//! ```rust,ignore
//! use policylens_core::{build_prompt, language_name, parse_brief, Audience};
//!
//! let prompt = build_prompt(document, Audience::Citizen.label(), language_name("en"));
//! // ... send prompt to a provider, get completion text back ...
//! let brief = parse_brief(&completion_text)?;
//! ```

pub mod brief;
pub mod extract;
pub mod prompt;

mod schema;

pub use brief::{
    Audience, BriefRequest, BriefResult, Language, RequestError, MAX_DOCUMENT_LEN,
    MIN_DOCUMENT_LEN,
};
pub use extract::{parse_brief, strip_code_fence, BriefError};
pub use prompt::{build_prompt, language_name};
