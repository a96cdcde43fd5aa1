//! Helpers for the dynamically typed call arguments and callback results.

use serde_json::Value;

/// Truthiness of a callback result.
///
/// `null` and `false` are falsy; every other value, including `0`, `""`
/// and empty collections, is truthy.
pub fn truthy(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_null_and_false_are_falsy() {
        assert!(!truthy(&Value::Null));
        assert!(!truthy(&json!(false)));

        assert!(truthy(&json!(true)));
        assert!(truthy(&json!(0)));
        assert!(truthy(&json!("")));
        assert!(truthy(&json!([])));
        assert!(truthy(&json!({})));
    }
}
