//! Structured run-spec errors.
//!
//! Each [`SpecError`] names a stable [`ErrorCode`], the JSON pointer of the
//! offending field, a message and an optional hint.

use serde::Serialize;
use thiserror::Error;

/// Stable machine-readable error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    UnsupportedVersion,
    OutOfRange,
    EmptySelection,
    IneffectiveValue,
    UnknownField,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnsupportedVersion => "unsupported_version",
            Self::OutOfRange => "out_of_range",
            Self::EmptySelection => "empty_selection",
            Self::IneffectiveValue => "ineffective_value",
            Self::UnknownField => "unknown_field",
        }
    }
}

/// A problem found in a run spec
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("[{}] {path}: {message}", code.as_str())]
pub struct SpecError {
    pub code: ErrorCode,
    pub path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl SpecError {
    pub fn new(code: ErrorCode, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            path: path.into(),
            message: message.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = SpecError::new(
            ErrorCode::OutOfRange,
            "/graph/min_weight",
            "min_weight must be >= 1",
        );
        assert_eq!(
            err.to_string(),
            "[out_of_range] /graph/min_weight: min_weight must be >= 1"
        );
    }

    #[test]
    fn test_serialize_skips_empty_hint() {
        let err = SpecError::new(ErrorCode::UnknownField, "/x", "unrecognized field \"x\"");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "unknown_field");
        assert!(json.get("hint").is_none());

        let json = serde_json::to_value(err.with_hint("remove it")).unwrap();
        assert_eq!(json["hint"], "remove it");
    }
}
