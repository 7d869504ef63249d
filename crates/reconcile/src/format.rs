//! Human-readable rendering of a change
//!
//! Display only: nothing here feeds back into classification.

use crate::diff::compare;
use serde_json::Value;
use similar::{ChangeTag, TextDiff};

/// A line of rendered diff output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine {
    Removed(String),
    Added(String),
    Context(String),
}

/// Render the line-level differences between two canonical values.
///
/// Both sides are pretty-printed with sorted keys so the output is stable.
/// Returns an empty list when [`compare`] finds no changed field.
pub fn diff_lines(origin: &Value, new: &Value) -> Vec<DiffLine> {
    if compare(origin, new).is_empty() {
        return Vec::new();
    }
    let before = pretty(origin);
    let after = pretty(new);

    let diff = TextDiff::from_lines(&before, &after);
    diff.iter_all_changes()
        .map(|change| {
            let line = change.value().trim_end_matches('\n').to_string();
            match change.tag() {
                ChangeTag::Delete => DiffLine::Removed(line),
                ChangeTag::Insert => DiffLine::Added(line),
                ChangeTag::Equal => DiffLine::Context(line),
            }
        })
        .collect()
}

/// Unified-diff-like text with `+`/`-` prefixes on changed lines.
///
/// Returns an empty string when there is no semantic change.
pub fn format_diff(origin: &Value, new: &Value) -> String {
    let lines = diff_lines(origin, new);
    if !lines.iter().any(|l| !matches!(l, DiffLine::Context(_))) {
        return String::new();
    }

    let mut out = String::new();
    for line in lines {
        match line {
            DiffLine::Removed(text) => out.push_str(&format!("- {text}\n")),
            DiffLine::Added(text) => out.push_str(&format!("+ {text}\n")),
            DiffLine::Context(text) => out.push_str(&format!("  {text}\n")),
        }
    }
    out
}

fn pretty(value: &Value) -> String {
    let mut text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    text.push('\n');
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_no_change_is_empty() {
        let value = json!({"name": "orders", "severity": "ERROR"});
        assert_eq!(format_diff(&value, &value.clone()), "");
        assert!(diff_lines(&value, &value).is_empty());
    }

    #[test]
    fn test_changed_field_is_prefixed() {
        let origin = json!({"name": "orders", "severity": "ERROR"});
        let new = json!({"name": "orders", "severity": "WARNING"});
        let text = format_diff(&origin, &new);
        assert!(text.contains("-   \"severity\": \"ERROR\""));
        assert!(text.contains("+   \"severity\": \"WARNING\""));
        assert!(text.contains("    \"name\": \"orders\""));
    }

    #[test]
    fn test_numeric_representation_is_not_a_change() {
        assert_eq!(format_diff(&json!({"min": 1}), &json!({"min": 1.0})), "");
    }

    #[test]
    fn test_key_order_is_irrelevant() {
        let origin: Value = serde_json::from_str(r#"{"b": 1, "a": 2}"#).unwrap();
        let new: Value = serde_json::from_str(r#"{"a": 2, "b": 1}"#).unwrap();
        assert_eq!(format_diff(&origin, &new), "");
    }
}
