//! Completion-text extraction: fence stripping, JSON parsing, validation.
//!
//! Providers are instructed to return bare JSON, but models routinely wrap
//! output in a Markdown code fence anyway. Extraction tolerates that one
//! wrapper and nothing else: strip the fence if present, parse, validate
//! against the brief schema, deserialize.

use serde_json::Value;
use thiserror::Error;

use crate::brief::BriefResult;
use crate::schema::validate_brief_schema;

/// The recoverable parse-or-validation error class.
///
/// Every variant means the same thing to callers: the provider responded,
/// but the text was not a usable brief.
#[derive(Error, Debug)]
pub enum BriefError {
    #[error("completion is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("completion does not match the brief schema: {}", .0.join("; "))]
    Schema(Vec<String>),
}

/// Strip a leading Markdown code fence from completion text.
///
/// A ```` ```json ```` opener (or a generic ```` ``` ```` opener) is
/// removed along with everything from the first subsequent fence marker
/// onward. Text with no leading fence is returned as-is; an unclosed fence
/// keeps the whole remainder.
pub fn strip_code_fence(text: &str) -> &str {
    let body = if let Some(rest) = text.strip_prefix("```json") {
        rest
    } else if let Some(rest) = text.strip_prefix("```") {
        rest
    } else {
        return text;
    };

    match body.find("```") {
        Some(end) => &body[..end],
        None => body,
    }
}

/// Parse completion text into a validated [`BriefResult`].
///
/// Surrounding whitespace is trimmed and a single code-fence wrapper is
/// tolerated. The JSON is validated shape-only (required fields, primitive
/// types); unknown fields are ignored.
pub fn parse_brief(raw: &str) -> Result<BriefResult, BriefError> {
    let text = strip_code_fence(raw.trim());
    let value: Value = serde_json::from_str(text)?;

    if let Err(errors) = validate_brief_schema(&value) {
        tracing::debug!(?errors, "completion failed brief schema validation");
        return Err(BriefError::Schema(errors));
    }

    Ok(serde_json::from_value(value)?)
}
