//! Per-field dispatch
//!
//! Routes a field's value to the coercer for its declared type. Array fields
//! are walked element by element so the type coercers never deal with arrays
//! themselves.

use serde_json::Value;

use super::coercion::{
    coerce_bool, coerce_float, coerce_int32, coerce_int64, coerce_string, CoerceOutcome,
    CoercionContext, Document, ValueCursor,
};
use super::errors::{ValidationError, ValidationResult};
use super::geopoint::coerce_geopoint;
use crate::schema::{Field, FieldType};

/// Coerces the value stored under `field.name` to the field's declared type.
///
/// A missing value is left alone; presence rules are the caller's concern.
/// A null value fails a required field under every policy. On an optional
/// field it counts as absence: create and upsert remove it, while update and
/// emplace keep it so the stored value gets cleared.
pub fn coerce_field(
    field: &Field,
    document: &mut Document,
    ctx: &CoercionContext<'_>,
) -> ValidationResult<CoerceOutcome> {
    if matches!(document.get(&field.name), Some(Value::Null)) {
        if !field.optional {
            return Err(ValidationError::NullValue {
                field: field.name.clone(),
            });
        }
        if ctx.operation.requires_full_document() {
            document.shift_remove(&field.name);
            return Ok(CoerceOutcome::Erased);
        }
        return Ok(CoerceOutcome::Unchanged);
    }

    match &field.field_type {
        FieldType::Array(element_type) => coerce_array(field, element_type, document, ctx),
        scalar => coerce_value(scalar, ctx, field, document, ValueCursor::Field),
    }
}

fn coerce_value(
    target: &FieldType,
    ctx: &CoercionContext<'_>,
    field: &Field,
    document: &mut Document,
    cursor: ValueCursor,
) -> ValidationResult<CoerceOutcome> {
    match target {
        FieldType::String => coerce_string(ctx, field, document, cursor),
        FieldType::Int32 => coerce_int32(ctx, field, document, cursor),
        FieldType::Int64 => coerce_int64(ctx, field, document, cursor),
        FieldType::Float => coerce_float(ctx, field, document, cursor),
        FieldType::Bool => coerce_bool(ctx, field, document, cursor),
        FieldType::Geopoint => coerce_geopoint(ctx, field, document, cursor),
        FieldType::Auto => Ok(CoerceOutcome::Unchanged),
        FieldType::Array(_) => Err(ValidationError::invalid_array(
            &field.name,
            "must not contain nested arrays",
        )),
    }
}

fn array_len(document: &Document, field_name: &str) -> usize {
    document
        .get(field_name)
        .and_then(Value::as_array)
        .map_or(0, Vec::len)
}

fn coerce_array(
    field: &Field,
    element_type: &FieldType,
    document: &mut Document,
    ctx: &CoercionContext<'_>,
) -> ValidationResult<CoerceOutcome> {
    match document.get(&field.name) {
        None => return Ok(CoerceOutcome::Unchanged),
        Some(Value::Array(_)) => {}
        // scalars are never wrapped into arrays
        Some(_) => {
            if ctx.dirty_values.drops_on_failure() && ctx.can_erase_field(field) {
                document.shift_remove(&field.name);
                tracing::debug!(field = %field.name, policy = %ctx.dirty_values, "dropped non-array value");
                return Ok(CoerceOutcome::Erased);
            }
            return Err(ValidationError::invalid_array(&field.name, "must be an array"));
        }
    }

    let mut index = 0;
    let mut erased = 0;
    let mut coerced = 0;
    while index < array_len(document, &field.name) {
        match coerce_value(element_type, ctx, field, document, ValueCursor::Element(index))? {
            // the next element has shifted into `index`
            CoerceOutcome::Erased => erased += 1,
            CoerceOutcome::Coerced => {
                coerced += 1;
                index += 1;
            }
            CoerceOutcome::Unchanged => index += 1,
        }
    }

    if erased > 0 && array_len(document, &field.name) == 0 && !ctx.can_erase_field(field) {
        return Err(ValidationError::invalid_array(
            &field.name,
            "has no valid elements left after dropping invalid ones",
        ));
    }

    if erased + coerced == 0 {
        Ok(CoerceOutcome::Unchanged)
    } else {
        tracing::trace!(field = %field.name, erased, coerced, "array elements repaired");
        Ok(CoerceOutcome::Coerced)
    }
}
