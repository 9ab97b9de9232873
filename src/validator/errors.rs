//! Validation error types
//!
//! Every rejection names the offending field and maps to an HTTP-style status
//! code that the write path surfaces to its caller unchanged.

use thiserror::Error;

use super::options::IndexOperation;

/// Status reported for an accepted document.
pub const STATUS_OK: u16 = 200;

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Fieldless discriminant of [`ValidationError`], useful for matching and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    NotAnObject,
    MissingIdentifier,
    InvalidIdentifier,
    MissingRequiredField,
    NullValue,
    TypeMismatch,
    UncoercibleValue,
    InvalidArrayShape,
    InvalidDefaultSortField,
    InvalidGeopointShape,
    UndeclaredField,
}

impl ValidationErrorKind {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            ValidationErrorKind::NotAnObject => "NOT_AN_OBJECT",
            ValidationErrorKind::MissingIdentifier => "MISSING_IDENTIFIER",
            ValidationErrorKind::InvalidIdentifier => "INVALID_IDENTIFIER",
            ValidationErrorKind::MissingRequiredField => "MISSING_REQUIRED_FIELD",
            ValidationErrorKind::NullValue => "NULL_VALUE",
            ValidationErrorKind::TypeMismatch => "TYPE_MISMATCH",
            ValidationErrorKind::UncoercibleValue => "UNCOERCIBLE_VALUE",
            ValidationErrorKind::InvalidArrayShape => "INVALID_ARRAY_SHAPE",
            ValidationErrorKind::InvalidDefaultSortField => "INVALID_DEFAULT_SORT_FIELD",
            ValidationErrorKind::InvalidGeopointShape => "INVALID_GEOPOINT_SHAPE",
            ValidationErrorKind::UndeclaredField => "UNDECLARED_FIELD",
        }
    }
}

/// Reasons a document is rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Top-level value is not a JSON object
    #[error("Document must be a JSON object, got {actual}.")]
    NotAnObject { actual: String },

    /// Identifier required by the operation is absent
    #[error("Document is missing the `{field}` field, which is required for {operation}.")]
    MissingIdentifier {
        field: String,
        operation: IndexOperation,
    },

    /// Identifier present but not a string
    #[error("Document's `{field}` field should be a string.")]
    InvalidIdentifier { field: String },

    #[error("Field `{field}` has been declared in the schema, but is not found in the document.")]
    MissingRequiredField { field: String },

    #[error("Field `{field}` must not be null.")]
    NullValue { field: String },

    #[error("Field `{field}` must be {expected}, got {actual}.")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("Field `{field}` must be {expected}: cannot coerce {value}.")]
    UncoercibleValue {
        field: String,
        expected: String,
        value: String,
    },

    #[error("Field `{field}` {reason}.")]
    InvalidArrayShape { field: String, reason: String },

    #[error("Field `{field}` has been declared as a default sorting field, but {reason}.")]
    InvalidDefaultSortField { field: String, reason: String },

    #[error("Field `{field}` must be a 2 element array: [lat, lng].")]
    InvalidGeopointShape { field: String },

    #[error("Field `{field}` is not declared in the schema.")]
    UndeclaredField { field: String },
}

impl ValidationError {
    pub fn kind(&self) -> ValidationErrorKind {
        match self {
            ValidationError::NotAnObject { .. } => ValidationErrorKind::NotAnObject,
            ValidationError::MissingIdentifier { .. } => ValidationErrorKind::MissingIdentifier,
            ValidationError::InvalidIdentifier { .. } => ValidationErrorKind::InvalidIdentifier,
            ValidationError::MissingRequiredField { .. } => {
                ValidationErrorKind::MissingRequiredField
            }
            ValidationError::NullValue { .. } => ValidationErrorKind::NullValue,
            ValidationError::TypeMismatch { .. } => ValidationErrorKind::TypeMismatch,
            ValidationError::UncoercibleValue { .. } => ValidationErrorKind::UncoercibleValue,
            ValidationError::InvalidArrayShape { .. } => ValidationErrorKind::InvalidArrayShape,
            ValidationError::InvalidDefaultSortField { .. } => {
                ValidationErrorKind::InvalidDefaultSortField
            }
            ValidationError::InvalidGeopointShape { .. } => {
                ValidationErrorKind::InvalidGeopointShape
            }
            ValidationError::UndeclaredField { .. } => ValidationErrorKind::UndeclaredField,
        }
    }

    /// HTTP-style status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            // 422 Unprocessable: the value was understood but cannot be converted
            ValidationError::UncoercibleValue { .. } => 422,
            // 400 Bad Request
            _ => 400,
        }
    }

    /// Name of the offending field, if the error concerns one
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::NotAnObject { .. } => None,
            ValidationError::MissingIdentifier { field, .. }
            | ValidationError::InvalidIdentifier { field }
            | ValidationError::MissingRequiredField { field }
            | ValidationError::NullValue { field }
            | ValidationError::TypeMismatch { field, .. }
            | ValidationError::UncoercibleValue { field, .. }
            | ValidationError::InvalidArrayShape { field, .. }
            | ValidationError::InvalidDefaultSortField { field, .. }
            | ValidationError::InvalidGeopointShape { field }
            | ValidationError::UndeclaredField { field } => Some(field.as_str()),
        }
    }

    pub(crate) fn invalid_array(field: &str, reason: &str) -> Self {
        ValidationError::InvalidArrayShape {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn invalid_sort_field(field: &str, reason: &str) -> Self {
        ValidationError::InvalidDefaultSortField {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let mismatch = ValidationError::TypeMismatch {
            field: "price".into(),
            expected: "a float".into(),
            actual: "string".into(),
        };
        assert_eq!(mismatch.status_code(), 400);

        let uncoercible = ValidationError::UncoercibleValue {
            field: "price".into(),
            expected: "a float".into(),
            value: "\"cheap\"".into(),
        };
        assert_eq!(uncoercible.status_code(), 422);
    }

    #[test]
    fn test_display_names_field_and_types() {
        let err = ValidationError::TypeMismatch {
            field: "age".into(),
            expected: "an int32".into(),
            actual: "string".into(),
        };
        assert_eq!(err.to_string(), "Field `age` must be an int32, got string.");
        assert_eq!(err.field(), Some("age"));
        assert_eq!(err.kind().code(), "TYPE_MISMATCH");
    }

    #[test]
    fn test_missing_identifier_mentions_operation() {
        let err = ValidationError::MissingIdentifier {
            field: "id".into(),
            operation: IndexOperation::Delete,
        };
        assert!(err.to_string().contains("delete"));
        assert_eq!(err.kind(), ValidationErrorKind::MissingIdentifier);
    }

    #[test]
    fn test_not_an_object_has_no_field() {
        let err = ValidationError::NotAnObject {
            actual: "array".into(),
        };
        assert!(err.field().is_none());
    }
}
