//! Request and result types for policy briefs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum accepted document length, in bytes.
pub const MIN_DOCUMENT_LEN: usize = 50;

/// Maximum accepted document length, in bytes.
pub const MAX_DOCUMENT_LEN: usize = 10_000;

/// Errors from inbound request validation.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("document length {len} bytes is outside the accepted {min}..={max} range", min = MIN_DOCUMENT_LEN, max = MAX_DOCUMENT_LEN)]
    DocumentLength { len: usize },
}

/// Who the brief is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    Citizen,
    Journalist,
    SmallBusinessOwner,
}

impl Audience {
    /// Human-readable label embedded in the prompt.
    pub fn label(&self) -> &'static str {
        match self {
            Audience::Citizen => "citizen",
            Audience::Journalist => "journalist",
            Audience::SmallBusinessOwner => "small business owner",
        }
    }
}

impl Default for Audience {
    fn default() -> Self {
        Audience::Citizen
    }
}

/// Language the brief should be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Sw,
    Am,
}

impl Language {
    /// The two-letter wire code.
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Sw => "sw",
            Language::Am => "am",
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::En
    }
}

/// An inbound brief request.
///
/// Field constraints are enforced at the HTTP boundary before the request
/// reaches the generation pipeline: audience and language are closed enums
/// (unknown labels are rejected during deserialization) and the document
/// length is checked with [`BriefRequest::validate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BriefRequest {
    pub document: String,
    #[serde(default)]
    pub audience: Audience,
    #[serde(default)]
    pub language: Language,
}

impl BriefRequest {
    /// Check the document length bounds.
    pub fn validate(&self) -> Result<(), RequestError> {
        let len = self.document.len();
        if !(MIN_DOCUMENT_LEN..=MAX_DOCUMENT_LEN).contains(&len) {
            return Err(RequestError::DocumentLength { len });
        }
        Ok(())
    }
}

/// A generated policy brief.
///
/// `confidence` stays a plain string: completion validation is shape-only
/// (field presence and primitive types), so an unexpected confidence value
/// passes through rather than being rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BriefResult {
    pub summary: String,
    pub key_obligations: Vec<String>,
    pub effective_date: String,
    pub confidence: String,
}

impl BriefResult {
    /// Degraded payload returned when the completion could not be parsed
    /// or did not match the brief schema. Never cached.
    pub fn parse_failure() -> Self {
        Self {
            summary: "Could not generate structured summary.".to_string(),
            key_obligations: vec!["Document may be too vague or complex.".to_string()],
            effective_date: "unknown".to_string(),
            confidence: "low".to_string(),
        }
    }

    /// Degraded payload returned when no provider produced a completion.
    /// Never cached.
    pub fn service_unavailable() -> Self {
        Self {
            summary: "LLM service unavailable.".to_string(),
            key_obligations: vec!["Try again later.".to_string()],
            effective_date: "unknown".to_string(),
            confidence: "low".to_string(),
        }
    }
}
