//! Strict-JSON extraction from free-form model output.
//!
//! Models wrap payloads in commentary and code fences even when asked not
//! to, so the extraction here is the most permissive viable strategy: strip
//! any fence markers, then take the first balanced `{...}` span.

/// Remove a leading ```` ```json ```` (or bare ```` ``` ````) fence and a
/// trailing ```` ``` ```` fence, if present.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    for prefix in ["```json", "```"] {
        if let Some(rest) = text.strip_prefix(prefix) {
            text = rest;
            break;
        }
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Return the first balanced `{...}` span in `raw`, tolerating leading and
/// trailing commentary. The scan is string-aware so braces inside quoted
/// values never unbalance it. Returns `None` when no complete object exists.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let text = strip_code_fences(raw);
    let start = text.find('{')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_object_from_fenced_block() {
        let raw = "Here you go:\n```json\n{\"a\": 1}\n```\nHope that helps!";
        assert_eq!(extract_json_object(raw), Some("{\"a\": 1}"));
    }

    #[test]
    fn extracts_first_balanced_span_with_nesting() {
        let raw = "prefix {\"outer\": {\"inner\": [1, 2]}} trailing {\"b\": 2}";
        assert_eq!(
            extract_json_object(raw),
            Some("{\"outer\": {\"inner\": [1, 2]}}")
        );
    }

    #[test]
    fn braces_inside_strings_do_not_unbalance() {
        let raw = r#"{"note": "use { and } freely", "n": 1}"#;
        assert_eq!(extract_json_object(raw), Some(raw));
    }

    #[test]
    fn escaped_quotes_inside_strings_are_handled() {
        let raw = r#"{"quote": "she said \"hi}\" loudly"}"#;
        assert_eq!(extract_json_object(raw), Some(raw));
    }

    #[test]
    fn unterminated_object_yields_none() {
        assert_eq!(extract_json_object("{\"a\": [1, 2]"), None);
        assert_eq!(extract_json_object("no json here"), None);
    }

    #[test]
    fn bare_fence_without_language_tag() {
        let raw = "```\n{\"ok\": true}\n```";
        assert_eq!(extract_json_object(raw), Some("{\"ok\": true}"));
    }
}
