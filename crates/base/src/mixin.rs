//! Property merge used by the `mixin` facet.

use crate::error::{Result, WireError};
use crate::value::{Object, Value};

/// Merges the own properties of `source` into `target`. Returns the number of
/// properties written.
///
/// Both sides are snapshotted before the first write: a key is skipped when the
/// target already exposes a reference-identical value, otherwise the source wins.
pub fn merge(target: &Object, source: &Object) -> usize {
    if target.ptr_eq(source) {
        return 0;
    }
    let entries = source.entries();
    let current: Vec<Option<Value>> = entries.iter().map(|(key, _)| target.get(key)).collect();

    let mut written = 0;
    for ((key, value), current) in entries.into_iter().zip(current) {
        if current.is_some_and(|current| current.same(&value)) {
            continue;
        }
        target.set(key, value);
        written += 1;
    }
    written
}

/// Mixes `source` into `target` and returns the target. A `Null` source is skipped.
///
/// # Errors
/// Returns [`WireError::Configuration`] when either side is not an object.
pub fn mixin(target: &Value, source: &Value) -> Result<Value> {
    let Value::Object(object) = target else {
        return Err(WireError::configuration(format!(
            "mixin target must be an object, got {}",
            target.type_name()
        )));
    };
    match source {
        Value::Null => {},
        Value::Object(source) => {
            merge(object, source);
        },
        other => {
            return Err(WireError::configuration(format!(
                "introduction must be an object, got {}",
                other.type_name()
            )));
        },
    }
    Ok(target.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: serde_json::Value) -> Object {
        Value::from(value).as_object().cloned().expect("object literal")
    }

    #[test]
    fn test_later_sources_win() {
        let target = object(json!({ "a": "t", "keep": true }));
        merge(&target, &object(json!({ "a": "A", "b": "A" })));
        merge(&target, &object(json!({ "b": "B" })));

        assert_eq!(target.get("a"), Some(Value::from("A")));
        assert_eq!(target.get("b"), Some(Value::from("B")));
        assert_eq!(target.get("keep"), Some(Value::from(true)));
    }

    #[test]
    fn test_identical_values_are_not_rewritten() {
        let shared = Value::Object(Object::new());
        let target = Object::from_entries([("shared", shared.clone())]);
        let source = Object::from_entries([("shared", shared), ("n", Value::from(1))]);

        assert_eq!(merge(&target, &source), 1);
    }

    #[test]
    fn test_self_mixin_is_noop() {
        let target = Value::from(json!({ "a": 1 }));
        let result = mixin(&target, &target).expect("self mixin");

        assert_eq!(result, target);
        assert_eq!(result.to_json(), json!({ "a": 1 }));
    }

    #[test]
    fn test_rejects_non_objects() {
        let target = Value::from(json!({}));
        assert!(mixin(&target, &Value::Null).is_ok());
        assert_eq!(mixin(&target, &Value::from(3)).expect_err("number").kind(), "Configuration");
        assert_eq!(mixin(&Value::from("s"), &target).expect_err("string").kind(), "Configuration");
    }
}
