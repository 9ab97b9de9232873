//! Field schema subsystem
//!
//! The schema is the read-only contract the validator checks documents against:
//! one descriptor per indexed field, looked up by exact name or prefix.

mod errors;
mod loader;
mod types;

pub use errors::{SchemaError, SchemaResult};
pub use loader::{CollectionSchema, SchemaLoader};
pub use types::{Field, FieldSchema, FieldType, ID_FIELD};
