//! Schema construction and loading errors

use thiserror::Error;

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while building or loading a field schema
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A field was declared without a name
    #[error("Field names must not be empty")]
    EmptyFieldName,

    /// The same field name was declared twice
    #[error("Field `{0}` is declared more than once")]
    DuplicateField(String),

    /// Type name not recognised
    #[error("Field type `{0}` is not supported")]
    UnknownFieldType(String),

    /// Arrays may only hold scalar or geopoint elements
    #[error("Arrays of `{0}` are not supported")]
    InvalidArrayElement(String),

    /// Default sorting field is unusable
    #[error("Default sorting field `{field}` {reason}")]
    InvalidSortingField { field: String, reason: String },

    /// Schema file could not be parsed
    #[error("Malformed schema '{source_name}': {reason}")]
    Malformed { source_name: String, reason: String },

    /// Schema file could not be read
    #[error("Failed to read schema file: {0}")]
    Io(#[from] std::io::Error),
}

impl SchemaError {
    pub(crate) fn invalid_sorting_field(field: &str, reason: &str) -> Self {
        SchemaError::InvalidSortingField {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn malformed(source_name: impl Into<String>, reason: impl ToString) -> Self {
        SchemaError::Malformed {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }
}
