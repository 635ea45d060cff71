//! Prompt construction for the policy analyst persona.
//!
//! A brief request produces exactly one prompt, sent as a single user turn.
//! The prompt pins the persona, the audience, the output language, and the
//! four-field JSON contract the completion must satisfy.

/// Persona statement opening every prompt.
pub const ANALYST_PERSONA: &str = "You are PolicyLens, an expert public policy analyst.";

/// Resolve a language code to the name embedded in the prompt.
///
/// Unrecognized codes fall back to English rather than failing the request.
pub fn language_name(code: &str) -> &'static str {
    match code {
        "en" => "English",
        "sw" => "Swahili",
        "am" => "Amharic",
        _ => "English",
    }
}

/// Build the full prompt for one brief request.
pub fn build_prompt(document: &str, audience_label: &str, language: &str) -> String {
    format!(
        r#"{persona}
Audience: {audience}
Language: {language}

Document:
{document}

Respond in valid JSON with:
- "summary": one-sentence overview
- "key_obligations": list of 2-4 items
- "effective_date": "YYYY-MM-DD" or "unknown"
- "confidence": "high", "medium", or "low"

Only output JSON. No extra text.
"#,
        persona = ANALYST_PERSONA,
        audience = audience_label,
        language = language,
        document = document,
    )
}
