/*!
 * Parsing of LLM responses.
 *
 * Review and harmonization calls answer with a `{id: text}` JSON object, but
 * models regularly wrap it in prose or markdown fences. Everything here is
 * tolerant of that wrapping and reports what could not be recovered as a
 * [`BatchFailure::MalformedResponse`].
 */

use std::collections::HashMap;

use serde_json::Value;

use crate::errors::BatchFailure;

/// Extract the JSON object from a potentially wrapped response
pub fn extract_json(response: &str) -> Result<&str, BatchFailure> {
    let trimmed = response.trim();

    if trimmed.starts_with('{') {
        return Ok(trimmed);
    }

    // Markdown code fence with language specifier
    if let Some(start) = trimmed.find("```json") {
        if let Some(end) = trimmed[start + 7..].find("```") {
            return Ok(trimmed[start + 7..start + 7 + end].trim());
        }
    }

    // Plain code fence
    if let Some(start) = trimmed.find("```") {
        if let Some(end) = trimmed[start + 3..].find("```") {
            let json = trimmed[start + 3..start + 3 + end].trim();
            if json.starts_with('{') {
                return Ok(json);
            }
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if end > start {
            return Ok(&trimmed[start..=end]);
        }
    }

    Err(BatchFailure::MalformedResponse(format!(
        "no JSON object in response: {}",
        preview(trimmed)
    )))
}

/// Parse an `{id: text}` object.
///
/// Non-string values are rendered as their JSON text so that a number or a
/// nested value from the model still counts as an answer for that id.
pub fn parse_id_map(response: &str) -> Result<HashMap<String, String>, BatchFailure> {
    let json = extract_json(response)?;

    let value: Value = serde_json::from_str(json)
        .map_err(|e| BatchFailure::MalformedResponse(format!("invalid JSON ({}): {}", e, preview(json))))?;

    let Value::Object(object) = value else {
        return Err(BatchFailure::MalformedResponse("response is not a JSON object".to_string()));
    };

    Ok(object
        .into_iter()
        .map(|(id, value)| {
            let text = match value {
                Value::String(text) => text,
                other => other.to_string(),
            };
            (id, text)
        })
        .collect())
}

/// Answer for a single item, falling back to the raw response.
///
/// A reply that parses as an object yields the value stored under `id` (or
/// `None` when the id is absent). Anything else is taken verbatim as the text,
/// so a model that answers a single-item request with bare text still counts.
pub fn single_answer(response: &str, id: &str) -> Option<String> {
    match parse_id_map(response) {
        Ok(mut map) => map.remove(id),
        Err(_) => {
            let text = response.trim();
            if text.is_empty() { None } else { Some(text.to_string()) }
        }
    }
}

fn preview(text: &str) -> String {
    const MAX: usize = 120;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(MAX).collect::<String>())
    }
}
