//! Turns generative-backend content into plain text.
//!
//! Providers disagree on the shape of `message.content`: a string, a list of
//! parts, a `{ "text": ... }` object, or a string that is itself a serialized
//! object (sometimes with Python-style quoting). The chain below is applied in
//! order and always produces a string.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Unwrap backend content to trimmed text
pub fn normalize_content(content: &Value) -> String {
    let text = match content {
        // 1. multi-part content
        Value::Array(parts) => parts.iter().map(part_text).collect::<Vec<_>>().join(" "),
        // 2. keyed structure
        Value::Object(map) => match map.get("text") {
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
            None => content.to_string(),
        },
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };

    // 3. serialized keyed structure
    let text = text.trim();
    match unwrap_serialized(text) {
        Some(inner) => inner.trim().to_string(),
        None => text.to_string(),
    }
}

fn part_text(part: &Value) -> String {
    match part {
        Value::String(text) => text.clone(),
        Value::Object(map) => match map.get("text").and_then(|t| t.as_str()) {
            Some(text) => text.to_string(),
            None => part.to_string(),
        },
        other => other.to_string(),
    }
}

/// Extract the `text` field from a stringified object, if there is one
fn unwrap_serialized(text: &str) -> Option<String> {
    if !text.starts_with('{') || !text.contains("text") {
        return None;
    }

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(text) {
        return map.get("text").and_then(|t| t.as_str()).map(str::to_string);
    }

    python_literal_text(text)
}

/// `{'type': 'text', 'text': '...'}` as printed by Python
fn python_literal_text(text: &str) -> Option<String> {
    static TEXT_FIELD: OnceLock<Regex> = OnceLock::new();
    let re = TEXT_FIELD.get_or_init(|| {
        Regex::new(r#"['"]text['"]\s*:\s*(?:'((?:[^'\\]|\\.)*)'|"((?:[^"\\]|\\.)*)")"#)
            .expect("valid text-field pattern")
    });

    let captures = re.captures(text)?;
    let raw = captures.get(1).or_else(|| captures.get(2))?.as_str();

    Some(unescape(raw))
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_string_trimmed() {
        assert_eq!(normalize_content(&json!("  1 ||| tasty \n")), "1 ||| tasty");
    }

    #[test]
    fn test_joins_parts() {
        let content = json!([{ "type": "text", "text": "Hello" }, "world"]);
        assert_eq!(normalize_content(&content), "Hello world");
    }

    #[test]
    fn test_extracts_text_field() {
        assert_eq!(normalize_content(&json!({ "type": "text", "text": "Hi" })), "Hi");
    }

    #[test]
    fn test_object_without_text_is_serialized() {
        assert_eq!(normalize_content(&json!({ "answer": 1 })), r#"{"answer":1}"#);
    }

    #[test]
    fn test_unwraps_stringified_json() {
        let content = json!(r#"{"type": "text", "text": "0 ||| fresh"}"#);
        assert_eq!(normalize_content(&content), "0 ||| fresh");
    }

    #[test]
    fn test_unwraps_python_style_dict() {
        let content = json!(r#"{'type': 'text', 'text': 'It\'s a fine pick', 'extras': {}}"#);
        assert_eq!(normalize_content(&content), "It's a fine pick");
    }

    #[test]
    fn test_unparseable_braces_kept_verbatim() {
        let content = json!("{text is missing a close");
        assert_eq!(normalize_content(&content), "{text is missing a close");
    }

    #[test]
    fn test_null_is_empty() {
        assert_eq!(normalize_content(&Value::Null), "");
    }
}
