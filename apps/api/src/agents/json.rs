//! Lenient JSON extraction for model output.
//!
//! Models wrap JSON in fences, prepend prose, or append explanations. We try the
//! fence-stripped reply first, then each balanced `[...]` / `{...}` span in turn.

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::llm_client::strip_json_fences;

/// Opening brackets tried before giving up, so pathological replies stay cheap.
const MAX_CANDIDATE_SPANS: usize = 16;

/// Returns the first JSON value in `text` that deserializes as `T`.
pub fn extract_json<T: DeserializeOwned>(text: &str) -> Option<T> {
    let stripped = strip_json_fences(text);
    if let Ok(value) = serde_json::from_str::<T>(stripped) {
        return Some(value);
    }

    stripped
        .char_indices()
        .filter(|(_, c)| *c == '[' || *c == '{')
        .take(MAX_CANDIDATE_SPANS)
        .filter_map(|(start, _)| balanced_span(&stripped[start..]))
        .find_map(|span| serde_json::from_str::<T>(span).ok())
}

/// `extract_json`, substituting `fallback` (and logging) when nothing parses.
pub fn extract_json_or<T: DeserializeOwned>(text: &str, fallback: T, context: &str) -> T {
    match extract_json(text) {
        Some(value) => value,
        None => {
            warn!(
                "{context}: could not extract JSON from model output, using fallback ({:?}...)",
                text.chars().take(80).collect::<String>()
            );
            fallback
        }
    }
}

/// The shortest prefix of `text` (which starts with `[` or `{`) whose brackets
/// balance, ignoring brackets inside string literals.
fn balanced_span(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            ']' | '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde::Deserialize;

    use super::*;

    #[test]
    fn test_plain_array() {
        assert_eq!(extract_json::<Vec<usize>>("[2, 0, 1]"), Some(vec![2, 0, 1]));
    }

    #[test]
    fn test_fenced_array() {
        assert_eq!(
            extract_json::<Vec<usize>>("```json\n[1, 0]\n```"),
            Some(vec![1, 0])
        );
    }

    #[test]
    fn test_array_inside_prose() {
        let text = "Here is the ranking: [3, 1, 0, 2]. Index 3 matches the JD best.";
        assert_eq!(extract_json::<Vec<usize>>(text), Some(vec![3, 1, 0, 2]));
    }

    #[test]
    fn test_skips_non_json_brackets() {
        let text = "[Note] the order is [1, 0]";
        assert_eq!(extract_json::<Vec<usize>>(text), Some(vec![1, 0]));
    }

    #[test]
    fn test_object_with_brackets_in_strings() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct Analysis {
            keywords: Vec<String>,
        }
        let text = "Sure!\n{\"keywords\": [\"C++ [legacy]\", \"Rust\"]}\nThanks";
        assert_eq!(
            extract_json::<Analysis>(text),
            Some(Analysis {
                keywords: vec!["C++ [legacy]".to_string(), "Rust".to_string()]
            })
        );
    }

    #[test]
    fn test_map_shape() {
        let text = r#"{"0": ["Rust"], "2": []}"#;
        let map: HashMap<String, Vec<String>> = extract_json(text).unwrap();
        assert_eq!(map["0"], vec!["Rust"]);
    }

    #[test]
    fn test_wrong_shape_is_none() {
        assert_eq!(extract_json::<Vec<usize>>("{\"a\": 1}"), None);
        assert_eq!(extract_json::<Vec<usize>>("no json here"), None);
    }

    #[test]
    fn test_unbalanced_is_none() {
        assert_eq!(extract_json::<Vec<usize>>("[1, 2"), None);
    }

    #[test]
    fn test_fallback_used_on_garbage() {
        let fallback = vec![0usize, 1, 2];
        assert_eq!(
            extract_json_or("I cannot rank these.", fallback.clone(), "test"),
            fallback
        );
    }
}
