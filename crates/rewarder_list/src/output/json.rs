//! Deterministic JSON rendering: sorted object keys, 2-space indentation.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("serialize: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Recursively sort object keys so output is stable regardless of the
/// serializer's map ordering.
pub fn sort_json_keys(v: &serde_json::Value) -> serde_json::Value {
    match v {
        serde_json::Value::Object(m) => {
            let mut keys: Vec<_> = m.keys().collect();
            keys.sort();
            let out: std::collections::BTreeMap<String, serde_json::Value> = keys
                .into_iter()
                .filter_map(|k| m.get(k).map(|val| (k.clone(), sort_json_keys(val))))
                .collect();
            serde_json::Value::Object(serde_json::Map::from_iter(out))
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(sort_json_keys).collect())
        }
        other => other.clone(),
    }
}

/// Serialize `value` with sorted keys, 2-space indentation, and a trailing
/// newline. Addresses are plain strings throughout the data model, so output
/// diffs stay stable across runs.
pub fn to_sorted_pretty<T: serde::Serialize>(value: &T) -> Result<String, WriteError> {
    let json = serde_json::to_value(value)?;
    let sorted = sort_json_keys(&json);
    let mut out = serde_json::to_string_pretty(&sorted)?;
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_order_does_not_matter() {
        let a = serde_json::json!({"z": 1, "a": {"y": 2, "b": 3}});
        let b = serde_json::json!({"a": {"b": 3, "y": 2}, "z": 1});
        assert_eq!(to_sorted_pretty(&a).unwrap(), to_sorted_pretty(&b).unwrap());
    }

    #[test]
    fn arrays_keep_order() {
        let v = serde_json::json!({"list": [3, 1, 2]});
        let out = to_sorted_pretty(&v).unwrap();
        assert!(out.contains("3,\n"));
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["list"], serde_json::json!([3, 1, 2]));
    }

    #[test]
    fn two_space_indent_and_trailing_newline() {
        let out = to_sorted_pretty(&serde_json::json!({"a": 1})).unwrap();
        assert_eq!(out, "{\n  \"a\": 1\n}\n");
    }
}
