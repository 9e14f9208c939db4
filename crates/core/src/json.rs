//! Field accessors for validating loosely-typed JSON payloads.
//!
//! Remote payloads arrive as `serde_json::Value`. Models walk them with these
//! helpers so a single bad field produces a precise [`DomainError`] instead of
//! an opaque serde message, and so optional fields can be skipped leniently.

use serde_json::{Map, Value};

use crate::error::{DomainError, DomainResult};

pub type Object = Map<String, Value>;

/// Borrow `value` as a JSON object.
pub fn as_object(value: &Value) -> DomainResult<&Object> {
    value
        .as_object()
        .ok_or_else(|| DomainError::wrong_kind("object", value))
}

/// Require every field in `fields` to be present as a key.
pub fn require_keys(obj: &Object, fields: &[&'static str]) -> DomainResult<()> {
    for field in fields {
        if !obj.contains_key(*field) {
            return Err(DomainError::missing(field));
        }
    }
    Ok(())
}

fn present<'a>(obj: &'a Object, field: &str) -> Option<&'a Value> {
    obj.get(field).filter(|v| !v.is_null())
}

/// A required, non-empty string.
pub fn required_string(obj: &Object, field: &'static str) -> DomainResult<String> {
    match present(obj, field) {
        None => Err(DomainError::missing(field)),
        Some(Value::String(s)) if s.is_empty() => Err(DomainError::invalid(field, "must not be empty")),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(DomainError::invalid(
            field,
            format!("expected string, found {}", crate::error::json_kind(other)),
        )),
    }
}

/// An optional string. `null` and absent both map to `None`.
pub fn optional_string(obj: &Object, field: &'static str) -> DomainResult<Option<String>> {
    match present(obj, field) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(DomainError::invalid(
            field,
            format!("expected string, found {}", crate::error::json_kind(other)),
        )),
    }
}

/// An optional string where the empty string is treated as absent.
pub fn non_empty_string(obj: &Object, field: &'static str) -> DomainResult<Option<String>> {
    Ok(optional_string(obj, field)?.filter(|s| !s.is_empty()))
}

/// An optional integer.
pub fn optional_i64(obj: &Object, field: &'static str) -> DomainResult<Option<i64>> {
    match present(obj, field) {
        None => Ok(None),
        Some(v) => v
            .as_i64()
            .map(Some)
            .ok_or_else(|| DomainError::invalid(field, "expected integer")),
    }
}

/// An optional non-negative integer.
pub fn optional_u64(obj: &Object, field: &'static str) -> DomainResult<Option<u64>> {
    match present(obj, field) {
        None => Ok(None),
        Some(v) => v
            .as_u64()
            .map(Some)
            .ok_or_else(|| DomainError::invalid(field, "expected non-negative integer")),
    }
}

/// An optional finite number.
pub fn optional_f64(obj: &Object, field: &'static str) -> DomainResult<Option<f64>> {
    match present(obj, field) {
        None => Ok(None),
        Some(v) => v
            .as_f64()
            .filter(|n| n.is_finite())
            .map(Some)
            .ok_or_else(|| DomainError::invalid(field, "expected number")),
    }
}

/// An optional boolean. Only a literal `true` counts as enabled by callers.
pub fn optional_bool(obj: &Object, field: &'static str) -> DomainResult<Option<bool>> {
    match present(obj, field) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(DomainError::invalid(field, "expected boolean")),
    }
}

/// Non-null nested value, if any.
pub fn nested<'a>(obj: &'a Object, field: &str) -> Option<&'a Value> {
    present(obj, field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn required_string_rejects_missing_empty_and_wrong_type() {
        let v = json!({ "a": "", "b": 3 });
        let obj = as_object(&v).unwrap();

        assert_eq!(
            required_string(obj, "missing").unwrap_err(),
            DomainError::missing("missing")
        );
        assert!(matches!(
            required_string(obj, "a").unwrap_err(),
            DomainError::InvalidField { field: "a", .. }
        ));
        assert!(matches!(
            required_string(obj, "b").unwrap_err(),
            DomainError::InvalidField { field: "b", .. }
        ));
    }

    #[test]
    fn null_counts_as_absent_for_optional_fields() {
        let v = json!({ "name": null, "qty": null });
        let obj = as_object(&v).unwrap();

        assert_eq!(optional_string(obj, "name").unwrap(), None);
        assert_eq!(optional_i64(obj, "qty").unwrap(), None);
        assert!(require_keys(obj, &["name", "qty"]).is_ok());
    }

    #[test]
    fn require_keys_reports_first_missing_key() {
        let v = json!({ "line1": null, "city": "Cupertino" });
        let obj = as_object(&v).unwrap();

        assert!(require_keys(obj, &["line1", "city"]).is_ok());
        assert_eq!(
            require_keys(obj, &["line1", "state"]).unwrap_err(),
            DomainError::missing("state")
        );
    }

    #[test]
    fn non_object_payload_is_wrong_kind() {
        let err = as_object(&json!("text")).unwrap_err();
        assert!(matches!(err, DomainError::WrongKind { found: "string", .. }));
    }
}
