//! Domain error model.

use thiserror::Error;

/// Result type used across the model layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Raised when a JSON payload does not have the shape a model expects. Model
/// hydration is fail-soft, so most callers turn this into `None` plus a log
/// line rather than propagating it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The payload is not a JSON object (or not the expected JSON kind).
    #[error("expected {expected}, found {found}")]
    WrongKind {
        expected: &'static str,
        found: &'static str,
    },

    /// A required field is absent.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    /// A field is present but carries the wrong type or an invalid value.
    #[error("invalid field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl DomainError {
    pub fn missing(field: &'static str) -> Self {
        Self::MissingField(field)
    }

    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    pub fn wrong_kind(expected: &'static str, found: &serde_json::Value) -> Self {
        Self::WrongKind {
            expected,
            found: json_kind(found),
        }
    }
}

/// Human-readable name of a JSON value's kind, for error messages.
pub fn json_kind(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;

    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wrong_kind_names_the_found_type() {
        let err = DomainError::wrong_kind("object", &json!([1, 2]));
        assert_eq!(err.to_string(), "expected object, found array");
    }

    #[test]
    fn invalid_field_message_includes_reason() {
        let err = DomainError::invalid("quantity", "must be an integer");
        assert_eq!(
            err.to_string(),
            "invalid field `quantity`: must be an integer"
        );
    }
}
