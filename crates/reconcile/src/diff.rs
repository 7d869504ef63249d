//! Structural comparison of canonical representations
//!
//! Objects are compared key by key, so field order never matters. Arrays of
//! equal length are compared element-wise; arrays of different length are
//! reported as a single change.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;

/// A single changed field between origin and new
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    /// Dotted path of the field, e.g. `schedule.daily.minutes_since_midnight`
    pub path: String,
    /// Value before (absent fields are `None`)
    pub old: Option<Value>,
    /// Value after
    pub new: Option<Value>,
}

impl FieldChange {
    pub fn new(path: impl Into<String>, old: Option<Value>, new: Option<Value>) -> Self {
        Self {
            path: path.into(),
            old,
            new,
        }
    }
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.old, &self.new) {
            (None, Some(new)) => write!(f, "{}: (unset) → {}", self.path, new),
            (Some(old), None) => write!(f, "{}: {} → (unset)", self.path, old),
            (Some(old), Some(new)) => write!(f, "{}: {} → {}", self.path, old, new),
            (None, None) => write!(f, "{}", self.path),
        }
    }
}

/// Compute the changed fields between two canonical values.
///
/// Returns an empty list when the values are semantically equal.
pub fn compare(origin: &Value, new: &Value) -> Vec<FieldChange> {
    let mut changes = Vec::new();
    walk("", Some(origin), Some(new), &mut changes);
    changes
}

fn walk(path: &str, old: Option<&Value>, new: Option<&Value>, out: &mut Vec<FieldChange>) {
    match (old, new) {
        (Some(Value::Object(a)), Some(Value::Object(b))) => {
            let keys: BTreeSet<&String> = a.keys().chain(b.keys()).collect();
            for key in keys {
                walk(&join(path, key), a.get(key), b.get(key), out);
            }
        }
        (Some(Value::Array(a)), Some(Value::Array(b))) if a.len() == b.len() => {
            for (index, (x, y)) in a.iter().zip(b.iter()).enumerate() {
                walk(&format!("{path}[{index}]"), Some(x), Some(y), out);
            }
        }
        (Some(a), Some(b)) if values_equal(a, b) => {}
        (None, None) => {}
        (old, new) => out.push(FieldChange::new(path, old.cloned(), new.cloned())),
    }
}

/// Numbers compare by value so `1` and `1.0` are the same field value.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_equal_values_have_no_changes() {
        let a = json!({"name": "x", "schedule": {"daily": {"minutes_since_midnight": 0}}});
        let b = json!({"schedule": {"daily": {"minutes_since_midnight": 0}}, "name": "x"});
        assert!(compare(&a, &b).is_empty());
    }

    #[test]
    fn test_nested_change_reports_dotted_path() {
        let a = json!({"schedule": {"daily": {"minutes_since_midnight": 0}}});
        let b = json!({"schedule": {"daily": {"minutes_since_midnight": 60}}});
        let changes = compare(&a, &b);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path, "schedule.daily.minutes_since_midnight");
        assert_eq!(changes[0].old, Some(json!(0)));
        assert_eq!(changes[0].new, Some(json!(60)));
    }

    #[test]
    fn test_added_and_removed_fields() {
        let a = json!({"filter": "a = 1"});
        let b = json!({"timezone": "UTC"});
        let changes = compare(&a, &b);
        assert_eq!(changes.len(), 2);
        assert!(changes.iter().any(|c| c.path == "filter" && c.new.is_none()));
        assert!(changes.iter().any(|c| c.path == "timezone" && c.old.is_none()));
    }

    #[test]
    fn test_arrays_of_different_length_are_one_change() {
        let a = json!({"fields": ["a"]});
        let b = json!({"fields": ["a", "b"]});
        let changes = compare(&a, &b);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path, "fields");
    }

    #[test]
    fn test_array_elements_compared_in_place() {
        let a = json!({"fields": ["a", "b"]});
        let b = json!({"fields": ["a", "c"]});
        let changes = compare(&a, &b);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path, "fields[1]");
    }

    #[test]
    fn test_variant_switch_reports_both_sides() {
        let a = json!({"schedule": {"daily": {"minutes_since_midnight": 0}}});
        let b = json!({"schedule": {"hourly": {"minute_of_hour": 0}}});
        let paths: Vec<String> = compare(&a, &b).into_iter().map(|c| c.path).collect();
        assert_eq!(paths, vec!["schedule.daily", "schedule.hourly"]);
    }

    #[test]
    fn test_integer_and_float_are_equal() {
        assert!(compare(&json!({"min": 1}), &json!({"min": 1.0})).is_empty());
    }

    #[test]
    fn test_field_change_display() {
        let change = FieldChange::new("severity", Some(json!("ERROR")), Some(json!("WARNING")));
        assert_eq!(change.to_string(), "severity: \"ERROR\" → \"WARNING\"");
    }
}
