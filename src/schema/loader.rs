//! Collection schema loading
//!
//! Collection schemas are JSON documents of the form
//!
//! ```json
//! {
//!   "name": "products",
//!   "fields": [
//!     {"name": "title", "type": "string"},
//!     {"name": "points", "type": "int32"},
//!     {"name": "tags", "type": "string[]", "optional": true}
//!   ],
//!   "default_sorting_field": "points"
//! }
//! ```
//!
//! One file per collection, `<name>.json`, inside the schema directory.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::errors::{SchemaError, SchemaResult};
use super::types::{Field, FieldSchema};

#[derive(Debug, Deserialize)]
struct CollectionSchemaFile {
    name: String,
    fields: Vec<Field>,
    #[serde(default)]
    default_sorting_field: Option<String>,
}

/// A named collection and its field schema.
#[derive(Debug, Clone)]
pub struct CollectionSchema {
    pub name: String,
    pub fields: FieldSchema,
}

impl CollectionSchema {
    /// Parses a collection schema from JSON text.
    pub fn from_json_str(content: &str) -> SchemaResult<Self> {
        Self::parse(content, "<in-memory>")
    }

    fn parse(content: &str, source_name: &str) -> SchemaResult<Self> {
        let file: CollectionSchemaFile = serde_json::from_str(content)
            .map_err(|e| SchemaError::malformed(source_name, format!("Invalid JSON: {}", e)))?;

        let mut fields = FieldSchema::new(file.fields)?;
        if let Some(sort_field) = file.default_sorting_field.filter(|s| !s.is_empty()) {
            fields = fields.with_default_sorting_field(&sort_field)?;
        }

        Ok(Self {
            name: file.name,
            fields,
        })
    }
}

/// Registry of collection schemas read from disk or registered directly.
pub struct SchemaLoader {
    schema_dir: PathBuf,
    schemas: HashMap<String, CollectionSchema>,
}

impl SchemaLoader {
    pub fn new(schema_dir: &Path) -> Self {
        Self {
            schema_dir: schema_dir.to_path_buf(),
            schemas: HashMap::new(),
        }
    }

    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Loads every `*.json` file in the schema directory.
    ///
    /// A missing directory is treated as empty.
    pub fn load_all(&mut self) -> SchemaResult<usize> {
        if !self.schema_dir.exists() {
            return Ok(0);
        }

        let mut loaded = 0;
        for entry in fs::read_dir(&self.schema_dir)? {
            let path = entry?.path();
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            let schema = Self::load_file(&path)?;
            tracing::debug!(collection = %schema.name, path = %path.display(), "loaded schema");
            self.schemas.insert(schema.name.clone(), schema);
            loaded += 1;
        }

        Ok(loaded)
    }

    /// Reads and parses a single schema file.
    pub fn load_file(path: &Path) -> SchemaResult<CollectionSchema> {
        let content = fs::read_to_string(path)?;
        CollectionSchema::parse(&content, &path.display().to_string())
    }

    /// Registers a schema, replacing any previous schema of the same name.
    pub fn register(&mut self, schema: CollectionSchema) {
        self.schemas.insert(schema.name.clone(), schema);
    }

    pub fn get(&self, name: &str) -> Option<&CollectionSchema> {
        self.schemas.get(name)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
