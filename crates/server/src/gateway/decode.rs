//! Best-effort decoding of model output into product suggestions.
//!
//! Models are asked for a bare JSON array but routinely wrap it in a
//! Markdown code fence. Decoding tries the text as-is, then once more with a
//! single surrounding fence removed, and finally degrades to a synthetic
//! suggestion built from the query. It never fails.

use super::ProductSuggestion;

const FENCE: &str = "```";

/// Decode `raw` model output, falling back to a suggestion built from `query`.
#[must_use]
pub fn decode_suggestions(raw: &str, query: &str) -> Vec<ProductSuggestion> {
    let trimmed = raw.trim();

    if let Some(suggestions) = strict_decode(trimmed) {
        return suggestions;
    }

    if let Some(suggestions) = strip_code_fence(trimmed).and_then(strict_decode) {
        return suggestions;
    }

    tracing::debug!(raw_len = raw.len(), "model output not decodable, using fallback suggestion");
    vec![fallback_suggestion(query)]
}

/// The degraded result returned when the model output cannot be interpreted.
#[must_use]
pub fn fallback_suggestion(query: &str) -> ProductSuggestion {
    ProductSuggestion {
        name: query.to_string(),
        description: format!("Search for: {query}"),
    }
}

fn strict_decode(text: &str) -> Option<Vec<ProductSuggestion>> {
    serde_json::from_str(text).ok()
}

/// Remove one leading fence (with optional language tag) and its closing fence.
///
/// Returns `None` when `text` does not start with a fence.
fn strip_code_fence(text: &str) -> Option<&str> {
    let rest = text.strip_prefix(FENCE)?;

    // A language tag is a single word directly after the opening fence.
    let body = match rest.split_once('\n') {
        Some((first_line, remainder)) if is_language_tag(first_line) => remainder,
        _ => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };

    let body = match body.find(FENCE) {
        Some(end) => body.get(..end).unwrap_or(body),
        None => body,
    };

    Some(body.trim())
}

fn is_language_tag(line: &str) -> bool {
    let line = line.trim();
    line.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(suggestions: &[ProductSuggestion]) -> Vec<&str> {
        suggestions.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_plain_json_array() {
        let raw = r#"[{"name": "Trail Runner", "description": "Lightweight running shoe"},
                      {"name": "Road Racer", "description": "Carbon-plated racing flat"}]"#;
        let suggestions = decode_suggestions(raw, "running shoes");
        assert_eq!(names(&suggestions), vec!["Trail Runner", "Road Racer"]);
        assert_eq!(suggestions[1].description, "Carbon-plated racing flat");
    }

    #[test]
    fn test_json_fence_with_language_tag() {
        let raw = "```json\n[{\"name\": \"Desk Lamp\", \"description\": \"LED, dimmable\"}]\n```";
        let suggestions = decode_suggestions(raw, "lamp");
        assert_eq!(names(&suggestions), vec!["Desk Lamp"]);
    }

    #[test]
    fn test_fence_without_language_tag() {
        let raw = "```\n[{\"name\": \"Kettle\", \"description\": \"1.7L electric\"}]\n```\n";
        let suggestions = decode_suggestions(raw, "kettle");
        assert_eq!(names(&suggestions), vec!["Kettle"]);
    }

    #[test]
    fn test_fence_with_tag_on_same_line_as_json() {
        let raw = "```json[{\"name\": \"Mug\", \"description\": \"Ceramic\"}]```";
        let suggestions = decode_suggestions(raw, "mug");
        assert_eq!(names(&suggestions), vec!["Mug"]);
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let raw = r#"[{"name": "Tent", "description": "2-person", "price": 199}]"#;
        let suggestions = decode_suggestions(raw, "tent");
        assert_eq!(names(&suggestions), vec!["Tent"]);
    }

    #[test]
    fn test_empty_array_is_valid() {
        assert!(decode_suggestions("[]", "nothing").is_empty());
    }

    #[test]
    fn test_malformed_json_falls_back() {
        let suggestions = decode_suggestions(r#"[{"name": "Broken""#, "headphones");
        assert_eq!(suggestions, vec![fallback_suggestion("headphones")]);
        assert_eq!(suggestions[0].description, "Search for: headphones");
    }

    #[test]
    fn test_prose_wrapped_json_falls_back() {
        let raw = "Sure! Here are some ideas:\n[{\"name\": \"Sofa\", \"description\": \"Grey\"}]";
        assert_eq!(
            decode_suggestions(raw, "sofa"),
            vec![fallback_suggestion("sofa")]
        );
    }

    #[test]
    fn test_wrong_shape_falls_back() {
        assert_eq!(
            decode_suggestions(r#"{"name": "Single", "description": "Not an array"}"#, "chair"),
            vec![fallback_suggestion("chair")]
        );
        assert_eq!(
            decode_suggestions(r#"["just", "strings"]"#, "chair"),
            vec![fallback_suggestion("chair")]
        );
    }

    #[test]
    fn test_empty_output_falls_back() {
        assert_eq!(decode_suggestions("   ", "socks"), vec![fallback_suggestion("socks")]);
    }

    #[test]
    fn test_strip_code_fence_requires_leading_fence() {
        assert_eq!(strip_code_fence("[1, 2]"), None);
        assert_eq!(strip_code_fence("```js\n[1]\n```"), Some("[1]"));
    }
}
