//! Validator configuration
//!
//! Settings for a [`DocumentValidator`](crate::validator::DocumentValidator),
//! typically read from the collection's JSON configuration:
//!
//! ```json
//! {
//!   "default_sorting_field": "points",
//!   "fallback_field_type": "string",
//!   "dirty_values": "coerce_or_drop",
//!   "reject_undeclared_fields": false
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::schema::FieldType;
use crate::validator::DirtyValues;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read validator config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid validator config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Validator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Overrides the schema's default sorting field when set
    #[serde(default)]
    pub default_sorting_field: Option<String>,

    /// Type applied to fields missing from the schema (default: none)
    #[serde(default)]
    pub fallback_field_type: Option<FieldType>,

    /// Policy for mistyped values (default: coerce_or_reject)
    #[serde(default)]
    pub dirty_values: DirtyValues,

    /// Reject fields missing from the schema when no fallback type applies
    #[serde(default = "default_reject_undeclared")]
    pub reject_undeclared_fields: bool,
}

fn default_reject_undeclared() -> bool {
    false
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            default_sorting_field: None,
            fallback_field_type: None,
            dirty_values: DirtyValues::default(),
            reject_undeclared_fields: default_reject_undeclared(),
        }
    }
}

impl ValidatorConfig {
    /// Create a config with the given dirty-value policy
    pub fn with_dirty_values(dirty_values: DirtyValues) -> Self {
        Self {
            dirty_values,
            ..Default::default()
        }
    }

    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn load_file(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}
