//! Field-level diffs for audit entries

use serde_json::Value;

/// Fields that change on every write and carry no information in a diff
const IGNORED_FIELDS: &[&str] = &["updated_at"];

const MAX_STRING_LEN: usize = 40;

/// Summarize the top-level fields that differ between two records
///
/// Returns `None` when nothing but bookkeeping fields changed.
pub fn generate_diff(before: &Value, after: &Value) -> Option<String> {
    let changes = match (before, after) {
        (Value::Object(before_obj), Value::Object(after_obj)) => {
            let mut changes = Vec::new();

            for (key, before_val) in before_obj {
                if IGNORED_FIELDS.contains(&key.as_str()) {
                    continue;
                }
                match after_obj.get(key) {
                    Some(after_val) if after_val == before_val => {}
                    Some(after_val) => changes.push(format!(
                        "{}: {} -> {}",
                        key,
                        format_value(before_val),
                        format_value(after_val)
                    )),
                    None => changes.push(format!("{}: {} -> (removed)", key, format_value(before_val))),
                }
            }

            for (key, after_val) in after_obj {
                if !before_obj.contains_key(key) && !IGNORED_FIELDS.contains(&key.as_str()) {
                    changes.push(format!("{}: (added) -> {}", key, format_value(after_val)));
                }
            }

            changes
        }
        _ if before != after => vec![format!("{} -> {}", format_value(before), format_value(after))],
        _ => Vec::new(),
    };

    if changes.is_empty() {
        None
    } else {
        Some(changes.join(", "))
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) if s.chars().count() > MAX_STRING_LEN => {
            let head: String = s.chars().take(MAX_STRING_LEN - 3).collect();
            format!("\"{}...\"", head)
        }
        Value::String(s) => format!("\"{}\"", s),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_changed_fields_only() {
        let before = json!({"budget_amount": 50000, "consumed": 0, "month": 7});
        let after = json!({"budget_amount": 60000, "consumed": 0, "month": 7});

        let diff = generate_diff(&before, &after).unwrap();
        assert_eq!(diff, "budget_amount: 50000 -> 60000");
    }

    #[test]
    fn test_updated_at_is_ignored() {
        let before = json!({"name": "Food", "updated_at": "2025-07-01T00:00:00Z"});
        let after = json!({"name": "Food", "updated_at": "2025-07-02T00:00:00Z"});

        assert!(generate_diff(&before, &after).is_none());
    }

    #[test]
    fn test_added_and_removed_fields() {
        let before = json!({"name": "Food", "old": true});
        let after = json!({"name": "Food", "color": "#FF0000"});

        let diff = generate_diff(&before, &after).unwrap();
        assert!(diff.contains("old: true -> (removed)"));
        assert!(diff.contains("color: (added) -> \"#FF0000\""));
    }

    #[test]
    fn test_long_strings_are_truncated_on_char_boundaries() {
        let before = json!({"description": "₱".repeat(60)});
        let after = json!({"description": "short"});

        let diff = generate_diff(&before, &after).unwrap();
        assert!(diff.contains("...\""));
    }

    #[test]
    fn test_scalar_values() {
        assert_eq!(generate_diff(&json!(1), &json!(2)).unwrap(), "1 -> 2");
        assert!(generate_diff(&json!(null), &json!(null)).is_none());
    }
}
