use serde::{Deserialize, Serialize};
use std::fmt;

/// Response header naming the error an error response encodes.
pub const ERROR_NAME_HEADER: &str = "x-error-name";

fn bounds<T: fmt::Display>(min: &Option<T>, max: &Option<T>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("between {min} and {max}"),
        (Some(min), None) => format!("at least {min}"),
        (None, Some(max)) => format!("at most {max}"),
        (None, None) => "unbounded".to_string(),
    }
}

/// Server side decode failures. Every variant names the field it is about.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("{field:?} is missing from the request {location}")]
    MissingField { field: String, location: String },

    #[error("{field:?} must be {expected}, got {received:?}")]
    InvalidFieldType {
        field: String,
        expected: String,
        received: String,
    },

    #[error("length of {field:?} must be {}, got {length}", bounds(.min, .max))]
    InvalidLength {
        field: String,
        length: usize,
        min: Option<u64>,
        max: Option<u64>,
    },

    #[error("{field:?} must be {}, got {received}", bounds(.min, .max))]
    InvalidRange {
        field: String,
        received: String,
        min: Option<f64>,
        max: Option<f64>,
    },

    #[error("{field:?} must be one of [{}], got {received}", .allowed.join(", "))]
    InvalidEnum {
        field: String,
        received: String,
        allowed: Vec<String>,
    },

    #[error("{field:?} must match {pattern:?}, got {received:?}")]
    InvalidPattern {
        field: String,
        pattern: String,
        received: String,
    },

    #[error("invalid request body: {reason}")]
    InvalidBody { reason: String },

    #[error("unsupported content type {content_type:?}")]
    UnsupportedContentType { content_type: String },
}

impl DecodeError {
    /// Stable name used as the generic error name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            DecodeError::MissingField { .. } => "missing_field",
            DecodeError::InvalidFieldType { .. } => "invalid_field_type",
            DecodeError::InvalidLength { .. } => "invalid_length",
            DecodeError::InvalidRange { .. } => "invalid_range",
            DecodeError::InvalidEnum { .. } => "invalid_enum_value",
            DecodeError::InvalidPattern { .. } => "invalid_pattern",
            DecodeError::InvalidBody { .. } => "decode_payload",
            DecodeError::UnsupportedContentType { .. } => "unsupported_content_type",
        }
    }

    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            DecodeError::MissingField { field, .. }
            | DecodeError::InvalidFieldType { field, .. }
            | DecodeError::InvalidLength { field, .. }
            | DecodeError::InvalidRange { field, .. }
            | DecodeError::InvalidEnum { field, .. }
            | DecodeError::InvalidPattern { field, .. } => Some(field),
            DecodeError::InvalidBody { .. } | DecodeError::UnsupportedContentType { .. } => None,
        }
    }
}

/// Client side request construction failures.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("{field:?} must be {expected}, got {received}")]
    TypeMismatch {
        field: String,
        expected: String,
        received: String,
    },

    #[error("required attribute {field:?} is missing")]
    MissingField { field: String },

    #[error("{method} has no route #{index}")]
    UnknownRoute { method: String, index: usize },

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("invalid request: {0}")]
    Http(#[from] http::Error),
}

/// Body or response construction failures.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML encoding failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("XML encoding failed: {0}")]
    Xml(String),

    #[error("no encoder for content type {0:?}")]
    UnsupportedContentType(String),

    #[error("{field:?} cannot be encoded: {reason}")]
    Value { field: String, reason: String },

    #[error("invalid response: {0}")]
    Http(#[from] http::Error),
}

/// Error without a declared HTTP mapping. Serialised as the `ServiceError`
/// body by [`DefaultErrorFormatter`]; clients read the same body back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericError {
    pub name: String,
    #[serde(default)]
    pub id: String,
    pub message: String,
    #[serde(default)]
    pub temporary: bool,
    #[serde(default)]
    pub timeout: bool,
    #[serde(default)]
    pub fault: bool,
}

impl GenericError {
    /// Non-fault error with a fresh id.
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: ulid::Ulid::new().to_string(),
            message: message.into(),
            temporary: false,
            timeout: false,
            fault: false,
        }
    }

    /// Server fault (status 500 with the default formatter).
    pub fn fault(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            fault: true,
            ..Self::new(name, message)
        }
    }

    #[must_use]
    pub fn temporary(mut self) -> Self {
        self.temporary = true;
        self
    }

    #[must_use]
    pub fn timeout(mut self) -> Self {
        self.timeout = true;
        self
    }
}

impl fmt::Display for GenericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.name, self.message)
    }
}

impl std::error::Error for GenericError {}

impl From<DecodeError> for GenericError {
    fn from(err: DecodeError) -> Self {
        GenericError::new(err.name(), err.to_string())
    }
}

/// Error produced by a service method.
///
/// Named errors carry their canonical name so encoders dispatch on it
/// directly; anything else travels as a [`GenericError`].
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorValue<V> {
    Named { name: String, value: V },
    Generic(GenericError),
}

impl<V> ErrorValue<V> {
    pub fn named(name: impl Into<String>, value: V) -> Self {
        ErrorValue::Named {
            name: name.into(),
            value,
        }
    }

    /// Canonical name of the error.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            ErrorValue::Named { name, .. } => name,
            ErrorValue::Generic(err) => &err.name,
        }
    }
}

impl<V> From<GenericError> for ErrorValue<V> {
    fn from(err: GenericError) -> Self {
        ErrorValue::Generic(err)
    }
}

impl<V> From<DecodeError> for ErrorValue<V> {
    fn from(err: DecodeError) -> Self {
        ErrorValue::Generic(err.into())
    }
}

/// Status and body the generic encoder writes for a [`GenericError`].
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedError {
    pub status: u16,
    pub body: serde_json::Value,
}

/// Turns generic errors into response bodies. Injected into the error
/// encoders so services can change the error shape.
pub trait ErrorFormatter: Send + Sync {
    fn format(&self, err: &GenericError) -> FormattedError;
}

/// Writes the `ServiceError` shape `{name, id, message, temporary, timeout,
/// fault}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorFormatter;

impl ErrorFormatter for DefaultErrorFormatter {
    fn format(&self, err: &GenericError) -> FormattedError {
        let status = if err.timeout {
            504
        } else if err.temporary {
            503
        } else if err.fault {
            500
        } else {
            400
        };
        let body = serde_json::to_value(err).unwrap_or_else(|_| {
            serde_json::json!({ "name": err.name, "message": err.message })
        });
        FormattedError { status, body }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_formatter_statuses() {
        let f = DefaultErrorFormatter;
        assert_eq!(f.format(&GenericError::new("bad", "x")).status, 400);
        assert_eq!(f.format(&GenericError::fault("boom", "x")).status, 500);
        assert_eq!(f.format(&GenericError::new("busy", "x").temporary()).status, 503);
        assert_eq!(f.format(&GenericError::new("slow", "x").timeout()).status, 504);
    }

    #[test]
    fn service_error_body_shape() {
        let body = DefaultErrorFormatter.format(&GenericError::new("bad", "oops")).body;
        let keys: Vec<_> = body
            .as_object()
            .map(|o| o.keys().cloned().collect())
            .unwrap_or_default();
        assert_eq!(keys, vec!["name", "id", "message", "temporary", "timeout", "fault"]);
    }

    #[test]
    fn decode_errors_become_non_fault_generic_errors() {
        let err: GenericError = DecodeError::InvalidFieldType {
            field: "id".into(),
            expected: "int".into(),
            received: "abc".into(),
        }
        .into();
        assert_eq!(err.name, "invalid_field_type");
        assert!(!err.fault);
        assert!(err.message.contains("\"id\""));
    }

    #[test]
    fn range_message_lists_bounds() {
        let err = DecodeError::InvalidRange {
            field: "n".into(),
            received: "11".into(),
            min: Some(1.0),
            max: Some(10.0),
        };
        assert_eq!(err.to_string(), "\"n\" must be between 1 and 10, got 11");
    }
}
