//! Document validator
//!
//! Validation semantics:
//! - `id` must be present for update and delete, and must be a string
//! - Delete only looks at `id`
//! - The default sorting field must hold a single number; create and upsert
//!   must supply it. If the schema declares it, the declaration must be a
//!   required numeric type. Never dropped, whatever the dirty-value policy
//! - Create and upsert must supply every required field; update and emplace
//!   may be partial
//! - Declared fields are checked in declaration order and the first failure
//!   aborts validation
//! - Undeclared fields follow the fallback type, if one is configured
//!
//! A rejected document may already have been partially repaired. Callers must
//! discard it.

use serde_json::Value;

use super::coercion::{json_type_name, CoercionContext, Document};
use super::element::coerce_field;
use super::errors::{ValidationError, ValidationResult};
use super::options::{DirtyValues, IndexOperation};
use crate::config::ValidatorConfig;
use crate::schema::{Field, FieldSchema, FieldType, ID_FIELD};

/// Validates `document` for `operation`, repairing mistyped values in place as
/// `dirty_values` allows.
///
/// `default_sorting_field` may be empty when the collection has none. Fields
/// missing from `schema` are coerced to `fallback_field_type` when it is a
/// concrete type and left untouched otherwise.
pub fn validate_document(
    document: &mut Value,
    seq_id: u32,
    default_sorting_field: &str,
    schema: &FieldSchema,
    operation: IndexOperation,
    fallback_field_type: Option<&FieldType>,
    dirty_values: DirtyValues,
) -> ValidationResult<()> {
    let ctx = CoercionContext::new(dirty_values, fallback_field_type, operation)
        .with_sort_field(Some(default_sorting_field));
    run(document, seq_id, schema, &ctx, false)
}

/// Validator bound to one schema and configuration.
///
/// Holds no mutable state, so it can be shared across threads validating
/// independent documents.
#[derive(Debug, Clone)]
pub struct DocumentValidator<'a> {
    schema: &'a FieldSchema,
    config: ValidatorConfig,
}

impl<'a> DocumentValidator<'a> {
    pub fn new(schema: &'a FieldSchema, config: ValidatorConfig) -> Self {
        Self { schema, config }
    }

    pub fn schema(&self) -> &FieldSchema {
        self.schema
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Default sorting field from the config, else from the schema.
    pub fn default_sorting_field(&self) -> Option<&str> {
        self.config
            .default_sorting_field
            .as_deref()
            .filter(|name| !name.is_empty())
            .or_else(|| self.schema.default_sorting_field())
    }

    /// Validates a document for the given operation.
    pub fn validate(
        &self,
        document: &mut Value,
        seq_id: u32,
        operation: IndexOperation,
    ) -> ValidationResult<()> {
        let ctx = CoercionContext::new(
            self.config.dirty_values,
            self.config.fallback_field_type.as_ref(),
            operation,
        )
        .with_sort_field(self.default_sorting_field());
        run(
            document,
            seq_id,
            self.schema,
            &ctx,
            self.config.reject_undeclared_fields,
        )
    }
}

fn run(
    document: &mut Value,
    seq_id: u32,
    schema: &FieldSchema,
    ctx: &CoercionContext<'_>,
    reject_undeclared: bool,
) -> ValidationResult<()> {
    let span = tracing::debug_span!(
        "validate_document",
        seq_id,
        operation = %ctx.operation,
        policy = %ctx.dirty_values
    );
    let _enter = span.enter();

    let result = validate_object(document, schema, ctx, reject_undeclared);
    if let Err(err) = &result {
        tracing::debug!(code = err.kind().code(), status = err.status_code(), "document rejected: {}", err);
    }
    result
}

fn validate_object(
    document: &mut Value,
    schema: &FieldSchema,
    ctx: &CoercionContext<'_>,
    reject_undeclared: bool,
) -> ValidationResult<()> {
    let document = match document {
        Value::Object(map) => map,
        other => {
            return Err(ValidationError::NotAnObject {
                actual: json_type_name(other).to_string(),
            })
        }
    };

    check_identifier(document, ctx.operation)?;
    if ctx.operation == IndexOperation::Delete {
        return Ok(());
    }

    if let Some(sort_field) = ctx.sort_field {
        check_sort_field_declaration(schema, sort_field)?;
        check_default_sorting_field(document, sort_field, ctx.operation)?;
    }

    for field in schema.iter() {
        if field.is_identifier() || field.field_type.is_auto() {
            continue;
        }
        validate_declared_field(field, document, ctx)?;
    }

    let undeclared: Vec<String> = document
        .keys()
        .filter(|name| name.as_str() != ID_FIELD && !schema.contains(name))
        .cloned()
        .collect();

    for name in undeclared {
        // already known to hold a number
        if ctx.sort_field == Some(name.as_str()) {
            continue;
        }
        match ctx.fallback_field_type {
            Some(fallback) if !fallback.is_auto() => {
                if document.get(&name).map_or(true, Value::is_null) {
                    continue;
                }
                let field = Field::optional(name, fallback.clone());
                coerce_field(&field, document, ctx)?;
            }
            None if reject_undeclared => {
                return Err(ValidationError::UndeclaredField { field: name });
            }
            _ => {}
        }
    }

    Ok(())
}

fn check_identifier(document: &Document, operation: IndexOperation) -> ValidationResult<()> {
    match document.get(ID_FIELD) {
        None if operation.requires_identifier() => Err(ValidationError::MissingIdentifier {
            field: ID_FIELD.to_string(),
            operation,
        }),
        Some(id) if !id.is_string() => Err(ValidationError::InvalidIdentifier {
            field: ID_FIELD.to_string(),
        }),
        _ => Ok(()),
    }
}

/// A declared sorting field must be a required single number.
fn check_sort_field_declaration(schema: &FieldSchema, sort_field: &str) -> ValidationResult<()> {
    let Some(field) = schema.get(sort_field) else {
        return Ok(());
    };
    if !field.field_type.is_numeric() {
        return Err(ValidationError::invalid_sort_field(
            sort_field,
            &format!("it is declared as {} rather than a single number", field.field_type),
        ));
    }
    if field.optional {
        return Err(ValidationError::invalid_sort_field(
            sort_field,
            "it is declared optional",
        ));
    }
    Ok(())
}

fn check_default_sorting_field(
    document: &Document,
    sort_field: &str,
    operation: IndexOperation,
) -> ValidationResult<()> {
    match document.get(sort_field) {
        None if operation.requires_full_document() => Err(ValidationError::invalid_sort_field(
            sort_field,
            "is not found in the document",
        )),
        None => Ok(()),
        Some(value) if !value.is_number() => Err(ValidationError::invalid_sort_field(
            sort_field,
            &format!("its value is {} rather than a single number", json_type_name(value)),
        )),
        Some(_) => Ok(()),
    }
}

fn validate_declared_field(
    field: &Field,
    document: &mut Document,
    ctx: &CoercionContext<'_>,
) -> ValidationResult<()> {
    match document.get(&field.name) {
        None => {
            if !field.optional && ctx.operation.requires_full_document() {
                return Err(ValidationError::MissingRequiredField {
                    field: field.name.clone(),
                });
            }
        }
        Some(_) => {
            coerce_field(field, document, ctx)?;
        }
    }
    Ok(())
}
