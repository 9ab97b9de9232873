//! Field type and field descriptor definitions
//!
//! Supported types:
//! - string: UTF-8 string
//! - int32: 32-bit signed integer
//! - int64: 64-bit signed integer
//! - float: floating point number
//! - bool: Boolean
//! - geopoint: `[lat, lng]` pair of numbers
//! - `T[]`: homogeneous array of any of the above
//! - auto: accepted as-is, never coerced

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Bound;
use std::str::FromStr;

use super::errors::{SchemaError, SchemaResult};

/// Name of the reserved identifier field.
pub const ID_FIELD: &str = "id";

/// Declared type of an indexed field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FieldType {
    String,
    Int32,
    Int64,
    Float,
    Bool,
    /// Latitude/longitude pair
    Geopoint,
    /// Homogeneous array of a non-array element type
    Array(Box<FieldType>),
    /// Any value; the field is stored without coercion
    Auto,
}

impl FieldType {
    /// Creates an array type, rejecting nested arrays and `auto` elements.
    pub fn array_of(element: FieldType) -> SchemaResult<Self> {
        match element {
            FieldType::Array(_) | FieldType::Auto => {
                Err(SchemaError::InvalidArrayElement(element.to_string()))
            }
            element => Ok(FieldType::Array(Box::new(element))),
        }
    }

    /// Returns the scalar type name used in messages and schema files.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Int32 => "int32",
            FieldType::Int64 => "int64",
            FieldType::Float => "float",
            FieldType::Bool => "bool",
            FieldType::Geopoint => "geopoint",
            FieldType::Array(_) => "array",
            FieldType::Auto => "auto",
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, FieldType::Array(_))
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, FieldType::Auto)
    }

    /// Whether values of this type can rank documents as a default sorting field.
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Int32 | FieldType::Int64 | FieldType::Float)
    }

    /// Element type for arrays, the type itself otherwise.
    pub fn element_type(&self) -> &FieldType {
        match self {
            FieldType::Array(element) => element,
            other => other,
        }
    }

    /// Human readable expectation, e.g. "an int32" or "an array of string".
    pub fn describe(&self, in_array: bool) -> String {
        let name = self.element_type().type_name();
        if in_array || self.is_array() {
            format!("an array of {}", name)
        } else {
            let article = match name.as_bytes().first() {
                Some(b'a' | b'e' | b'i' | b'o' | b'u') => "an",
                _ => "a",
            };
            format!("{} {}", article, name)
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Array(element) => write!(f, "{}[]", element),
            other => f.write_str(other.type_name()),
        }
    }
}

impl FromStr for FieldType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(element) = s.strip_suffix("[]") {
            return FieldType::array_of(element.parse()?);
        }

        match s {
            "string" => Ok(FieldType::String),
            "int32" => Ok(FieldType::Int32),
            "int64" => Ok(FieldType::Int64),
            "float" => Ok(FieldType::Float),
            "bool" => Ok(FieldType::Bool),
            "geopoint" => Ok(FieldType::Geopoint),
            "auto" => Ok(FieldType::Auto),
            other => Err(SchemaError::UnknownFieldType(other.to_string())),
        }
    }
}

impl TryFrom<String> for FieldType {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        value.to_string()
    }
}

/// Field descriptor as declared in a collection schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether the field may be absent on create/upsert
    #[serde(default)]
    pub optional: bool,
    /// Set by the owning schema for its default sorting field
    #[serde(skip)]
    pub default_sort: bool,
}

impl Field {
    /// Create a required field
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            optional: false,
            default_sort: false,
        }
    }

    /// Create an optional field
    pub fn optional(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            optional: true,
            ..Self::new(name, field_type)
        }
    }

    /// Whether this is the reserved document identifier
    pub fn is_identifier(&self) -> bool {
        self.name == ID_FIELD
    }
}

/// Read-only field schema.
///
/// Keeps fields in declaration order and indexes them by name so that lookups
/// and prefix scans stay cheap. Once built it is never mutated, so a single
/// instance can be shared by any number of validating threads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSchema {
    fields: Vec<Field>,
    index: BTreeMap<String, usize>,
    default_sorting_field: Option<String>,
}

impl FieldSchema {
    /// Builds a schema from fields in declaration order.
    pub fn new(fields: Vec<Field>) -> SchemaResult<Self> {
        let mut index = BTreeMap::new();
        for (position, field) in fields.iter().enumerate() {
            if field.name.is_empty() {
                return Err(SchemaError::EmptyFieldName);
            }
            if let FieldType::Array(element) = &field.field_type {
                if element.is_array() || element.is_auto() {
                    return Err(SchemaError::InvalidArrayElement(element.to_string()));
                }
            }
            if index.insert(field.name.clone(), position).is_some() {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }
        }

        Ok(Self {
            fields,
            index,
            default_sorting_field: None,
        })
    }

    /// Marks `name` as the default sorting field.
    ///
    /// The field must be declared, numeric, single valued and required.
    pub fn with_default_sorting_field(mut self, name: &str) -> SchemaResult<Self> {
        let position = *self
            .index
            .get(name)
            .ok_or_else(|| SchemaError::invalid_sorting_field(name, "is not declared"))?;

        let field = &mut self.fields[position];
        if !field.field_type.is_numeric() {
            return Err(SchemaError::invalid_sorting_field(
                name,
                "is not a numeric single-valued type",
            ));
        }
        if field.optional {
            return Err(SchemaError::invalid_sorting_field(name, "cannot be optional"));
        }

        field.default_sort = true;
        self.default_sorting_field = Some(name.to_string());
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.index.get(name).map(|&position| &self.fields[position])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    /// Fields whose name starts with `prefix`, in lexicographic order.
    pub fn with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a Field> + 'a {
        self.index
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(move |(name, _)| name.starts_with(prefix))
            .map(move |(_, &position)| &self.fields[position])
    }

    pub fn default_sorting_field(&self) -> Option<&str> {
        self.default_sorting_field.as_deref()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
