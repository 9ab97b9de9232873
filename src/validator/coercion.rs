//! Scalar type coercers
//!
//! Each coercer inspects one value, either a top-level field or one element of
//! an array field, and leaves it alone when it already has the target type.
//! Otherwise the dirty-value policy decides between rejecting the document,
//! erasing the value, or converting it in place.

use serde_json::{Map, Number, Value};

use super::errors::{ValidationError, ValidationResult};
use super::options::{DirtyValues, IndexOperation};
use crate::schema::{Field, FieldType};

/// A parsed, mutable document.
pub type Document = Map<String, Value>;

/// Position of the value being coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueCursor {
    /// The value stored directly under the field name
    Field,
    /// Element at this index of the array stored under the field name
    Element(usize),
}

impl ValueCursor {
    pub fn is_element(&self) -> bool {
        matches!(self, ValueCursor::Element(_))
    }
}

/// What a coercer did to the value under the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoerceOutcome {
    /// Value already matched
    Unchanged,
    /// Value rewritten in place
    Coerced,
    /// Value removed. For array elements the cursor index now holds the next
    /// element, so callers must not advance.
    Erased,
}

impl CoerceOutcome {
    pub fn is_erased(&self) -> bool {
        matches!(self, CoerceOutcome::Erased)
    }
}

/// Settings shared by every coercer during one validation call.
#[derive(Debug, Clone, Copy)]
pub struct CoercionContext<'a> {
    pub dirty_values: DirtyValues,
    pub fallback_field_type: Option<&'a FieldType>,
    pub operation: IndexOperation,
    /// Name of the default sorting field, if the collection has one
    pub sort_field: Option<&'a str>,
}

impl<'a> CoercionContext<'a> {
    pub fn new(
        dirty_values: DirtyValues,
        fallback_field_type: Option<&'a FieldType>,
        operation: IndexOperation,
    ) -> Self {
        Self {
            dirty_values,
            fallback_field_type,
            operation,
            sort_field: None,
        }
    }

    pub fn with_sort_field(mut self, sort_field: Option<&'a str>) -> Self {
        self.sort_field = sort_field.filter(|name| !name.is_empty());
        self
    }

    /// Whether `field` ranks documents, either by schema declaration or by
    /// the name this call was given.
    pub fn is_sort_field(&self, field: &Field) -> bool {
        field.default_sort || self.sort_field == Some(field.name.as_str())
    }

    /// A whole field may only disappear if the write tolerates its absence.
    /// The default sorting field never disappears.
    pub fn can_erase_field(&self, field: &Field) -> bool {
        !self.is_sort_field(field) && (field.optional || self.operation.is_partial())
    }
}

pub(crate) fn value_at<'d>(
    document: &'d Document,
    field_name: &str,
    cursor: ValueCursor,
) -> Option<&'d Value> {
    let value = document.get(field_name)?;
    match cursor {
        ValueCursor::Field => Some(value),
        ValueCursor::Element(index) => value.as_array()?.get(index),
    }
}

pub(crate) fn value_at_mut<'d>(
    document: &'d mut Document,
    field_name: &str,
    cursor: ValueCursor,
) -> Option<&'d mut Value> {
    let value = document.get_mut(field_name)?;
    match cursor {
        ValueCursor::Field => Some(value),
        ValueCursor::Element(index) => value.as_array_mut()?.get_mut(index),
    }
}

/// Returns the JSON type name for error messages.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "int"
            } else {
                "float"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Removes the value under the cursor. When the field itself must stay, the
/// document is left untouched and `error` builds the failure from it.
pub(crate) fn erase<E>(
    ctx: &CoercionContext<'_>,
    field: &Field,
    document: &mut Document,
    cursor: ValueCursor,
    error: E,
) -> ValidationResult<CoerceOutcome>
where
    E: FnOnce(&Document) -> ValidationError,
{
    match cursor {
        ValueCursor::Element(index) => {
            if let Some(items) = document.get_mut(&field.name).and_then(Value::as_array_mut) {
                if index < items.len() {
                    items.remove(index);
                }
            }
            tracing::debug!(field = %field.name, index, policy = %ctx.dirty_values, "dropped array element");
            Ok(CoerceOutcome::Erased)
        }
        ValueCursor::Field if ctx.is_sort_field(field) => Err(ValidationError::invalid_sort_field(
            &field.name,
            "its value does not match the declared type and cannot be dropped",
        )),
        ValueCursor::Field if ctx.can_erase_field(field) => {
            document.shift_remove(&field.name);
            tracing::debug!(field = %field.name, policy = %ctx.dirty_values, "dropped field");
            Ok(CoerceOutcome::Erased)
        }
        ValueCursor::Field => Err(error(&*document)),
    }
}

// Longest rendering of an offending value kept in error messages
const MAX_SHOWN_VALUE_LEN: usize = 64;

fn show_value(value: Option<&Value>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    let rendered = value.to_string();
    match rendered.char_indices().nth(MAX_SHOWN_VALUE_LEN) {
        Some((cut, _)) => format!("{}...", &rendered[..cut]),
        None => rendered,
    }
}

/// Applies the dirty-value policy to a value already known not to match
/// `target`. `convert` is only consulted by the coercing policies.
pub(crate) fn resolve_mismatch<F>(
    ctx: &CoercionContext<'_>,
    field: &Field,
    document: &mut Document,
    cursor: ValueCursor,
    target: &FieldType,
    actual: &str,
    convert: F,
) -> ValidationResult<CoerceOutcome>
where
    F: FnOnce(&Value) -> Option<Value>,
{
    let converted = match value_at(document, &field.name, cursor) {
        None => return Ok(CoerceOutcome::Unchanged),
        Some(value) if ctx.dirty_values.attempts_coercion() => convert(value),
        Some(_) => None,
    };

    if let Some(new_value) = converted {
        if let Some(slot) = value_at_mut(document, &field.name, cursor) {
            *slot = new_value;
        }
        tracing::debug!(field = %field.name, from = actual, to = %target, "coerced value");
        return Ok(CoerceOutcome::Coerced);
    }

    let mismatch = |_: &Document| ValidationError::TypeMismatch {
        field: field.name.clone(),
        expected: target.describe(cursor.is_element()),
        actual: actual.to_string(),
    };
    let uncoercible = |document: &Document| ValidationError::UncoercibleValue {
        field: field.name.clone(),
        expected: target.describe(cursor.is_element()),
        value: show_value(value_at(document, &field.name, cursor)),
    };

    match ctx.dirty_values {
        DirtyValues::Reject => Err(mismatch(&*document)),
        DirtyValues::Drop => erase(ctx, field, document, cursor, mismatch),
        DirtyValues::CoerceOrReject => Err(uncoercible(&*document)),
        DirtyValues::CoerceOrDrop => erase(ctx, field, document, cursor, uncoercible),
    }
}

// 2^63, the first float past the i64 range
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Converts strings holding integer literals and integral floats into an
/// integer within `min..=max`.
fn to_integer(value: &Value, min: i64, max: i64) -> Option<Value> {
    let integer = match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => i,
            None => {
                let f = n.as_f64()?;
                if !f.is_finite() || f.fract() != 0.0 || f < -I64_BOUND || f >= I64_BOUND {
                    return None;
                }
                f as i64
            }
        },
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };

    (min..=max).contains(&integer).then(|| Value::from(integer))
}

fn is_int32(value: &Value) -> bool {
    value
        .as_i64()
        .map_or(false, |n| i32::try_from(n).is_ok())
}

/// Coerces the value under the cursor to a string.
pub fn coerce_string(
    ctx: &CoercionContext<'_>,
    field: &Field,
    document: &mut Document,
    cursor: ValueCursor,
) -> ValidationResult<CoerceOutcome> {
    let actual = match value_at(document, &field.name, cursor) {
        None | Some(Value::String(_)) => return Ok(CoerceOutcome::Unchanged),
        Some(value) => json_type_name(value),
    };

    resolve_mismatch(ctx, field, document, cursor, &FieldType::String, actual, |value| {
        match value {
            Value::Number(n) => Some(Value::String(n.to_string())),
            Value::Bool(b) => Some(Value::String(b.to_string())),
            _ => None,
        }
    })
}

/// Coerces the value under the cursor to a 32-bit integer.
pub fn coerce_int32(
    ctx: &CoercionContext<'_>,
    field: &Field,
    document: &mut Document,
    cursor: ValueCursor,
) -> ValidationResult<CoerceOutcome> {
    let actual = match value_at(document, &field.name, cursor) {
        None => return Ok(CoerceOutcome::Unchanged),
        Some(value) if is_int32(value) => return Ok(CoerceOutcome::Unchanged),
        // integers that only fit in 64 bits
        Some(value) if value.is_i64() || value.is_u64() => "int64",
        Some(value) => json_type_name(value),
    };

    resolve_mismatch(ctx, field, document, cursor, &FieldType::Int32, actual, |value| {
        to_integer(value, i32::MIN as i64, i32::MAX as i64)
    })
}

/// Coerces the value under the cursor to a 64-bit integer.
pub fn coerce_int64(
    ctx: &CoercionContext<'_>,
    field: &Field,
    document: &mut Document,
    cursor: ValueCursor,
) -> ValidationResult<CoerceOutcome> {
    let actual = match value_at(document, &field.name, cursor) {
        None => return Ok(CoerceOutcome::Unchanged),
        Some(value) if value.is_i64() => return Ok(CoerceOutcome::Unchanged),
        Some(value) if value.is_u64() => "uint64",
        Some(value) => json_type_name(value),
    };

    resolve_mismatch(ctx, field, document, cursor, &FieldType::Int64, actual, |value| {
        to_integer(value, i64::MIN, i64::MAX)
    })
}

/// Coerces the value under the cursor to a float. Integers already count as
/// floats and are left as they are.
pub fn coerce_float(
    ctx: &CoercionContext<'_>,
    field: &Field,
    document: &mut Document,
    cursor: ValueCursor,
) -> ValidationResult<CoerceOutcome> {
    let actual = match value_at(document, &field.name, cursor) {
        None | Some(Value::Number(_)) => return Ok(CoerceOutcome::Unchanged),
        Some(value) => json_type_name(value),
    };

    resolve_mismatch(ctx, field, document, cursor, &FieldType::Float, actual, |value| {
        let parsed = match value {
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            Value::Number(n) => n.as_f64()?,
            _ => return None,
        };
        Number::from_f64(parsed).map(Value::Number)
    })
}

/// Coerces the value under the cursor to a boolean.
pub fn coerce_bool(
    ctx: &CoercionContext<'_>,
    field: &Field,
    document: &mut Document,
    cursor: ValueCursor,
) -> ValidationResult<CoerceOutcome> {
    let actual = match value_at(document, &field.name, cursor) {
        None | Some(Value::Bool(_)) => return Ok(CoerceOutcome::Unchanged),
        Some(value) => json_type_name(value),
    };

    resolve_mismatch(ctx, field, document, cursor, &FieldType::Bool, actual, |value| {
        match value.as_str() {
            Some("true") => Some(Value::Bool(true)),
            Some("false") => Some(Value::Bool(false)),
            _ => None,
        }
    })
}
