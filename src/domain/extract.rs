//! JSON payload extraction from raw model output.
//!
//! Models asked for JSON still wrap it in prose, markdown fences, or both.
//! These helpers locate the most likely JSON payload inside a response so the
//! synthesizers can attempt a structured parse before falling back, plus a
//! pair of lenient value readers shared by the synthesizers. Extraction never
//! fails: when nothing JSON-shaped is found the caller degrades from the raw
//! text.

/// Returns the best JSON candidate inside `response`, as a slice of the input.
///
/// Search order:
/// 1. Fenced code block (```json or bare ```), content trimmed.
/// 2. First balanced `{...}` object or `[...]` array, whichever opens first.
///
/// Returns `None` when neither is present (e.g. plain prose); the caller
/// decides what to do with the raw text.
pub fn extract_json_payload(response: &str) -> Option<&str> {
    let trimmed = response.trim();

    if let Some(json) = from_code_block(trimmed) {
        return Some(json);
    }

    let obj_start = trimmed.find('{');
    let arr_start = trimmed.find('[');

    // Pick whichever opens first; prefer an object on a tie.
    let (start, open, close) = match (obj_start, arr_start) {
        (Some(o), Some(a)) if a < o => (a, '[', ']'),
        (Some(o), _) => (o, '{', '}'),
        (None, Some(a)) => (a, '[', ']'),
        (None, None) => return None,
    };

    balanced_slice(trimmed, start, open, close)
}

/// Content of the first fenced code block, if any.
fn from_code_block(s: &str) -> Option<&str> {
    let patterns = ["```json\n", "```json\r\n", "```\n", "```\r\n"];

    for pattern in patterns {
        if let Some(start) = s.find(pattern) {
            let body_start = start + pattern.len();
            if let Some(end) = s[body_start..].find("```") {
                return Some(s[body_start..body_start + end].trim());
            }
        }
    }
    None
}

/// Slice from `start` to the matching close delimiter, honoring JSON string
/// and escape rules. Byte offsets come from `char_indices` so multi-byte
/// text inside strings cannot split a code point.
fn balanced_slice(s: &str, start: usize, open: char, close: char) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (offset, c) in s[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            _ if in_string => {}
            c if c == open => depth += 1,
            c if c == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[start..start + offset + close.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Reads a JSON value as a non-empty list of non-empty strings.
///
/// Non-string entries and blank entries are skipped; an empty or missing list
/// reads as `None` so callers substitute their placeholder.
pub(crate) fn string_list(value: &serde_json::Value) -> Option<Vec<String>> {
    let items: Vec<String> = value
        .as_array()?
        .iter()
        .filter_map(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

/// Reads a numeric JSON value as a risk score, clamped into 1..=10.
pub(crate) fn score_in_range(value: &serde_json::Value) -> Option<u8> {
    let raw = value.as_f64()?;
    Some((raw.round() as i64).clamp(1, 10) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_plain_object() {
        let raw = r#"{"summary": "ok"}"#;
        assert_eq!(extract_json_payload(raw), Some(raw));
    }

    #[test]
    fn extracts_object_embedded_in_prose() {
        let raw = r#"Aquí está el análisis: {"summary": "ok", "score": 7} Espero que sirva."#;
        assert_eq!(extract_json_payload(raw), Some(r#"{"summary": "ok", "score": 7}"#));
    }

    #[test]
    fn extracts_from_labeled_code_block() {
        let raw = "El resultado:\n\n```json\n{\"summary\": \"ok\"}\n```\n\nListo.";
        assert_eq!(extract_json_payload(raw), Some("{\"summary\": \"ok\"}"));
    }

    #[test]
    fn extracts_from_unlabeled_code_block() {
        let raw = "```\n{\"a\": 1}\n```";
        assert_eq!(extract_json_payload(raw), Some("{\"a\": 1}"));
    }

    #[test]
    fn prefers_array_when_it_opens_first() {
        let raw = r#"[{"x": 1}, {"x": 2}] y un objeto suelto {"x": 3}"#;
        assert_eq!(extract_json_payload(raw), Some(r#"[{"x": 1}, {"x": 2}]"#));
    }

    #[test]
    fn nested_braces_and_escaped_quotes_stay_balanced() {
        let raw = r#"pre {"a": {"b": "llave \" y } dentro"}, "c": [1, 2]} post"#;
        assert_eq!(
            extract_json_payload(raw),
            Some(r#"{"a": {"b": "llave \" y } dentro"}, "c": [1, 2]}"#)
        );
    }

    #[test]
    fn multibyte_text_inside_strings_keeps_offsets_right() {
        let raw = r#"Según el análisis: {"resumen": "cláusula de garantía, año 2024 ✓"} fin"#;
        assert_eq!(
            extract_json_payload(raw),
            Some(r#"{"resumen": "cláusula de garantía, año 2024 ✓"}"#)
        );
    }

    #[test]
    fn truncated_json_yields_none() {
        assert_eq!(extract_json_payload(r#"{"summary": "se cortó"#), None);
    }

    #[test]
    fn plain_prose_yields_none() {
        assert_eq!(extract_json_payload("El documento parece completo."), None);
        assert_eq!(extract_json_payload(""), None);
    }

    #[test]
    fn unterminated_code_block_falls_through_to_balanced_scan() {
        let raw = "```json\n{\"a\": 1}";
        assert_eq!(extract_json_payload(raw), Some("{\"a\": 1}"));
    }

    mod lenient_readers {
        use super::*;
        use serde_json::json;

        #[test]
        fn string_list_skips_blank_and_non_string_entries() {
            let value = json!(["hallazgo uno", "", 42, "  ", "hallazgo dos"]);
            assert_eq!(
                string_list(&value),
                Some(vec!["hallazgo uno".to_string(), "hallazgo dos".to_string()])
            );
        }

        #[test]
        fn string_list_reads_empty_as_none() {
            assert_eq!(string_list(&json!([])), None);
            assert_eq!(string_list(&json!([1, 2])), None);
            assert_eq!(string_list(&json!("no es lista")), None);
            assert_eq!(string_list(&serde_json::Value::Null), None);
        }

        #[test]
        fn scores_clamp_into_range() {
            assert_eq!(score_in_range(&json!(7)), Some(7));
            assert_eq!(score_in_range(&json!(7.6)), Some(8));
            assert_eq!(score_in_range(&json!(99)), Some(10));
            assert_eq!(score_in_range(&json!(0)), Some(1));
            assert_eq!(score_in_range(&json!(-3)), Some(1));
            assert_eq!(score_in_range(&json!("alto")), None);
            assert_eq!(score_in_range(&serde_json::Value::Null), None);
        }
    }
}
