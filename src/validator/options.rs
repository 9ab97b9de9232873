//! Write operation and dirty-value policy definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Write intent of the request carrying the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexOperation {
    Create,
    Upsert,
    Update,
    Emplace,
    Delete,
}

impl IndexOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexOperation::Create => "create",
            IndexOperation::Upsert => "upsert",
            IndexOperation::Update => "update",
            IndexOperation::Emplace => "emplace",
            IndexOperation::Delete => "delete",
        }
    }

    /// Create and upsert replace the whole document, so every required field
    /// must be supplied.
    pub fn requires_full_document(&self) -> bool {
        matches!(self, IndexOperation::Create | IndexOperation::Upsert)
    }

    /// Update and emplace may carry only the fields being changed.
    pub fn is_partial(&self) -> bool {
        matches!(self, IndexOperation::Update | IndexOperation::Emplace)
    }

    /// Operations that address an existing document and cannot have an
    /// identifier assigned for them.
    pub fn requires_identifier(&self) -> bool {
        matches!(self, IndexOperation::Update | IndexOperation::Delete)
    }
}

impl fmt::Display for IndexOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndexOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "create" => Ok(IndexOperation::Create),
            "upsert" => Ok(IndexOperation::Upsert),
            "update" => Ok(IndexOperation::Update),
            "emplace" => Ok(IndexOperation::Emplace),
            "delete" => Ok(IndexOperation::Delete),
            other => Err(format!("Unknown index operation `{}`", other)),
        }
    }
}

/// Tolerance for values whose type does not match the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirtyValues {
    /// Fail the document
    Reject,
    /// Silently remove the offending value
    Drop,
    /// Convert, failing the document if conversion is impossible
    #[default]
    CoerceOrReject,
    /// Convert, removing the value if conversion is impossible
    CoerceOrDrop,
}

impl DirtyValues {
    pub fn as_str(&self) -> &'static str {
        match self {
            DirtyValues::Reject => "reject",
            DirtyValues::Drop => "drop",
            DirtyValues::CoerceOrReject => "coerce_or_reject",
            DirtyValues::CoerceOrDrop => "coerce_or_drop",
        }
    }

    pub fn attempts_coercion(&self) -> bool {
        matches!(self, DirtyValues::CoerceOrReject | DirtyValues::CoerceOrDrop)
    }

    /// Whether a value that cannot be used ends up removed rather than rejected.
    pub fn drops_on_failure(&self) -> bool {
        matches!(self, DirtyValues::Drop | DirtyValues::CoerceOrDrop)
    }
}

impl fmt::Display for DirtyValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DirtyValues {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reject" => Ok(DirtyValues::Reject),
            "drop" => Ok(DirtyValues::Drop),
            "coerce_or_reject" => Ok(DirtyValues::CoerceOrReject),
            "coerce_or_drop" => Ok(DirtyValues::CoerceOrDrop),
            other => Err(format!("Unknown dirty values policy `{}`", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_presence_rules() {
        assert!(IndexOperation::Create.requires_full_document());
        assert!(IndexOperation::Upsert.requires_full_document());
        assert!(!IndexOperation::Update.requires_full_document());
        assert!(IndexOperation::Update.is_partial());
        assert!(IndexOperation::Emplace.is_partial());
        assert!(!IndexOperation::Delete.is_partial());
    }

    #[test]
    fn test_identifier_rules() {
        assert!(IndexOperation::Update.requires_identifier());
        assert!(IndexOperation::Delete.requires_identifier());
        assert!(!IndexOperation::Create.requires_identifier());
        assert!(!IndexOperation::Emplace.requires_identifier());
    }

    #[test]
    fn test_parse_operation() {
        assert_eq!("UPSERT".parse::<IndexOperation>().unwrap(), IndexOperation::Upsert);
        assert!("merge".parse::<IndexOperation>().is_err());
    }

    #[test]
    fn test_parse_dirty_values() {
        assert_eq!(
            "coerce_or_drop".parse::<DirtyValues>().unwrap(),
            DirtyValues::CoerceOrDrop
        );
        assert_eq!("REJECT".parse::<DirtyValues>().unwrap(), DirtyValues::Reject);
        assert!("ignore".parse::<DirtyValues>().is_err());
    }

    #[test]
    fn test_dirty_values_default_and_serde() {
        assert_eq!(DirtyValues::default(), DirtyValues::CoerceOrReject);
        let json = serde_json::to_string(&DirtyValues::CoerceOrDrop).unwrap();
        assert_eq!(json, "\"coerce_or_drop\"");
    }

    #[test]
    fn test_policy_flags() {
        assert!(!DirtyValues::Reject.attempts_coercion());
        assert!(DirtyValues::Drop.drops_on_failure());
        assert!(DirtyValues::CoerceOrDrop.attempts_coercion());
        assert!(!DirtyValues::CoerceOrReject.drops_on_failure());
    }
}
