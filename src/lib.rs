//! indexguard - schema-driven validation and type coercion for index writes
//!
//! Sits between an inbound write request and the index storage layer. Given a
//! field schema and a parsed JSON document, decides whether the document is
//! acceptable for a write operation and, where the dirty-value policy permits,
//! repairs mistyped values in place.
//!
//! ```
//! use indexguard::schema::{Field, FieldSchema, FieldType};
//! use indexguard::validator::{validate_document, DirtyValues, IndexOperation};
//! use serde_json::json;
//!
//! let schema = FieldSchema::new(vec![
//!     Field::new("title", FieldType::String),
//!     Field::optional("price", FieldType::Float),
//! ])
//! .unwrap();
//!
//! let mut doc = json!({"id": "1", "title": "A", "price": "19.99"});
//! validate_document(
//!     &mut doc,
//!     0,
//!     "",
//!     &schema,
//!     IndexOperation::Create,
//!     None,
//!     DirtyValues::CoerceOrReject,
//! )
//! .unwrap();
//! assert_eq!(doc["price"], json!(19.99));
//! ```

pub mod config;
pub mod schema;
pub mod validator;

pub use config::ValidatorConfig;
pub use schema::{Field, FieldSchema, FieldType};
pub use validator::{
    validate_document, DirtyValues, DocumentValidator, IndexOperation, ValidationError,
    ValidationResult,
};
