//! Geopoint coercer
//!
//! A geopoint is a `[lat, lng]` pair of numbers. Shape defects (not an array,
//! wrong arity, non-numeric coordinates) always reject the document: a partial
//! point would index a location that was never supplied. Integer coordinates
//! are a subtype mismatch and follow the dirty-value policy like any scalar.

use serde_json::{Number, Value};

use super::coercion::{
    resolve_mismatch, value_at, CoerceOutcome, CoercionContext, Document, ValueCursor,
};
use super::errors::{ValidationError, ValidationResult};
use crate::schema::{Field, FieldType};

/// Coerces the value under the cursor to a `[lat, lng]` float pair.
pub fn coerce_geopoint(
    ctx: &CoercionContext<'_>,
    field: &Field,
    document: &mut Document,
    cursor: ValueCursor,
) -> ValidationResult<CoerceOutcome> {
    let Some(value) = value_at(document, &field.name, cursor) else {
        return Ok(CoerceOutcome::Unchanged);
    };

    let pair = match value.as_array() {
        Some(pair) if pair.len() == 2 && pair.iter().all(Value::is_number) => pair,
        _ => {
            return Err(ValidationError::InvalidGeopointShape {
                field: field.name.clone(),
            })
        }
    };

    if pair.iter().all(Value::is_f64) {
        return Ok(CoerceOutcome::Unchanged);
    }

    resolve_mismatch(
        ctx,
        field,
        document,
        cursor,
        &FieldType::Geopoint,
        "integer coordinates",
        |value| {
            let coordinates = value
                .as_array()?
                .iter()
                .map(|c| c.as_f64().and_then(Number::from_f64).map(Value::Number))
                .collect::<Option<Vec<_>>>()?;
            Some(Value::Array(coordinates))
        },
    )
}
