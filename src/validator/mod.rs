//! Document validation and type coercion
//!
//! Checks a parsed document against a [`FieldSchema`](crate::schema::FieldSchema)
//! before it is written to the index, and repairs mistyped values in place
//! when the dirty-value policy allows.
//!
//! # Design Principles
//!
//! - Validation is stateless and synchronous
//! - Documents are mutated in place, never rebuilt
//! - The first hard failure aborts the whole document
//! - Drops are silent; they are not reported as errors or warnings

mod coercion;
mod document;
mod element;
mod errors;
mod geopoint;
mod options;

pub use coercion::{
    coerce_bool, coerce_float, coerce_int32, coerce_int64, coerce_string, CoerceOutcome,
    CoercionContext, Document, ValueCursor,
};
pub use document::{validate_document, DocumentValidator};
pub use element::coerce_field;
pub use errors::{ValidationError, ValidationErrorKind, ValidationResult, STATUS_OK};
pub use geopoint::coerce_geopoint;
pub use options::{DirtyValues, IndexOperation};
