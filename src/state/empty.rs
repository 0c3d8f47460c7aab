//! Emptiness rule shared by reconciliation and editing.
//!
//! A value is empty when it is absent, `null`, a string that is blank after
//! trimming, or a zero-length array. Objects, numbers and booleans are never
//! empty.

use serde_json::Value;

pub fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(_) => false,
    }
}

pub fn has_value(value: Option<&Value>) -> bool {
    !is_empty(value)
}

/// The empty value of the same JSON kind as `like`.
pub fn empty_like(like: Option<&Value>) -> Value {
    match like {
        Some(Value::Array(_)) => Value::Array(Vec::new()),
        Some(Value::String(_)) => Value::String(String::new()),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_values() {
        assert!(is_empty(None));
        assert!(is_empty(Some(&Value::Null)));
        assert!(is_empty(Some(&json!("   "))));
        assert!(is_empty(Some(&json!([]))));
    }

    #[test]
    fn test_non_empty_values() {
        assert!(has_value(Some(&json!("x"))));
        assert!(has_value(Some(&json!([""]))));
        assert!(has_value(Some(&json!({}))));
        assert!(has_value(Some(&json!(0))));
        assert!(has_value(Some(&json!(false))));
    }

    #[test]
    fn test_empty_like() {
        assert_eq!(empty_like(Some(&json!(["a"]))), json!([]));
        assert_eq!(empty_like(Some(&json!("a"))), json!(""));
        assert_eq!(empty_like(None), Value::Null);
    }
}
