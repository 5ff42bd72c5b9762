//! Extraction of the insight object from the model's reply text

use kzd_common::Insight;

use super::gemini_client::GeminiError;

/// Remove a surrounding markdown code fence, if any
///
/// Handles both ```` ```json ```` and bare ```` ``` ```` openers; the closing
/// fence is optional.
pub fn strip_code_fence(raw: &str) -> &str {
    let text = raw.trim();
    let inner = if let Some(rest) = text.strip_prefix("```json") {
        rest
    } else if let Some(rest) = text.strip_prefix("```") {
        rest
    } else {
        return text;
    };
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Substring from the first `{` to the last `}`
fn embedded_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parse the model reply into a normalized insight
pub fn parse_insight(raw: &str) -> Result<Insight, GeminiError> {
    let cleaned = strip_code_fence(raw);

    let insight: Insight = match serde_json::from_str(cleaned) {
        Ok(insight) => insight,
        Err(error) => embedded_object(cleaned)
            .and_then(|object| serde_json::from_str(object).ok())
            .ok_or_else(|| GeminiError::Parse(format!("Reply is not an insight object: {error}")))?,
    };

    if !insight.is_usable() {
        return Err(GeminiError::Parse("Reply has an empty mainInsight".to_string()));
    }

    let mut insight = insight.normalize();
    insight.debug_error = None;
    Ok(insight)
}
