//! Coercion Scenario Tests
//!
//! End-to-end scenarios for the write path:
//! - Schemas and validator settings read from disk
//! - Scalar coercion of top-level fields
//! - Partial array repair
//! - Geopoint shape handling
//! - Identifier rules per operation

use indexguard::schema::{SchemaLoader, FieldSchema};
use indexguard::validator::{DocumentValidator, DirtyValues, IndexOperation, ValidationErrorKind, STATUS_OK};
use indexguard::{ValidationError, ValidatorConfig};
use serde_json::{json, Value};
use std::fs;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

const PRODUCTS: &str = r#"{
    "name": "products",
    "fields": [
        {"name": "title", "type": "string"},
        {"name": "price", "type": "float"},
        {"name": "tags", "type": "string[]", "optional": true},
        {"name": "loc", "type": "geopoint", "optional": true},
        {"name": "stops", "type": "geopoint[]", "optional": true},
        {"name": "ratings", "type": "int32[]", "optional": true},
        {"name": "meta", "type": "auto", "optional": true}
    ]
}"#;

fn setup_test_loader() -> (TempDir, SchemaLoader) {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("products.json"), PRODUCTS).unwrap();
    fs::write(tmp.path().join("notes.txt"), "not a schema").unwrap();

    let mut loader = SchemaLoader::new(tmp.path());
    assert_eq!(loader.load_all().unwrap(), 1);

    (tmp, loader)
}

fn products(loader: &SchemaLoader) -> &FieldSchema {
    &loader.get("products").unwrap().fields
}

fn run(doc: &mut Value, operation: IndexOperation, policy: DirtyValues) -> Result<(), ValidationError> {
    let (_tmp, loader) = setup_test_loader();
    let validator = DocumentValidator::new(products(&loader), ValidatorConfig::with_dirty_values(policy));
    validator.validate(doc, 7, operation)
}

// =============================================================================
// Scalar Coercion Scenarios
// =============================================================================

/// A numeric string in a float field is repaired under coerce-or-reject.
#[test]
fn test_price_string_coerced() {
    let mut doc = json!({"id": "1", "title": "A", "price": "19.99"});
    run(&mut doc, IndexOperation::Create, DirtyValues::CoerceOrReject).unwrap();
    assert_eq!(doc, json!({"id": "1", "title": "A", "price": 19.99}));
}

/// The same document is refused under reject, naming the field.
#[test]
fn test_price_string_rejected() {
    let mut doc = json!({"id": "1", "title": "A", "price": "19.99"});
    let err = run(&mut doc, IndexOperation::Create, DirtyValues::Reject).unwrap_err();

    assert_eq!(err.kind(), ValidationErrorKind::TypeMismatch);
    assert_eq!(err.field(), Some("price"));
    assert_eq!(err.status_code(), 400);
    assert!(err.to_string().contains("price"));
    assert_eq!(doc["price"], json!("19.99"));
}

/// Uncoercible values map to the unprocessable status.
#[test]
fn test_uncoercible_status() {
    let mut doc = json!({"id": "1", "title": "A", "price": "free"});
    let err = run(&mut doc, IndexOperation::Create, DirtyValues::CoerceOrReject).unwrap_err();
    assert_eq!(err.kind(), ValidationErrorKind::UncoercibleValue);
    assert_eq!(err.status_code(), 422);
    assert_ne!(err.status_code(), STATUS_OK);
}

/// Auto fields accept anything.
#[test]
fn test_auto_field_untouched() {
    let mut doc = json!({"id": "1", "title": "A", "price": 1, "meta": {"k": [1, "v"]}});
    run(&mut doc, IndexOperation::Create, DirtyValues::Reject).unwrap();
    assert_eq!(doc["meta"], json!({"k": [1, "v"]}));
}

// =============================================================================
// Array Scenarios
// =============================================================================

/// Mixed array elements are stringified under coerce-or-drop.
#[test]
fn test_mixed_tags_coerced() {
    let mut doc = json!({"id": "2", "tags": ["a", 5]});
    run(&mut doc, IndexOperation::Update, DirtyValues::CoerceOrDrop).unwrap();
    assert_eq!(doc["tags"], json!(["a", "5"]));
}

/// Bad elements are dropped in place and the survivors keep their order.
#[test]
fn test_invalid_elements_dropped_in_order() {
    let mut doc = json!({
        "id": "2",
        "title": "A",
        "price": 1.0,
        "ratings": ["x", 1, "y", "z", 2, 3.5, "4"]
    });
    run(&mut doc, IndexOperation::Create, DirtyValues::CoerceOrDrop).unwrap();
    assert_eq!(doc["ratings"], json!([1, 2, 4]));
}

/// Drop without coercion keeps only elements that already match.
#[test]
fn test_drop_keeps_matching_elements() {
    let mut doc = json!({"id": "2", "ratings": ["1", 2, null, 3]});
    run(&mut doc, IndexOperation::Emplace, DirtyValues::Drop).unwrap();
    assert_eq!(doc["ratings"], json!([2, 3]));
}

/// An empty array is a valid array.
#[test]
fn test_empty_array_accepted() {
    let mut doc = json!({"id": "2", "title": "A", "price": 1, "tags": []});
    run(&mut doc, IndexOperation::Create, DirtyValues::Reject).unwrap();
    assert_eq!(doc["tags"], json!([]));
}

// =============================================================================
// Geopoint Scenarios
// =============================================================================

/// Three coordinates are never acceptable.
#[test]
fn test_geopoint_wrong_arity() {
    for policy in [
        DirtyValues::Reject,
        DirtyValues::Drop,
        DirtyValues::CoerceOrReject,
        DirtyValues::CoerceOrDrop,
    ] {
        let mut doc = json!({"id": "3", "loc": [1, 2, 3]});
        let err = run(&mut doc, IndexOperation::Update, policy).unwrap_err();
        assert_eq!(err.kind(), ValidationErrorKind::InvalidGeopointShape);
        assert_eq!(err.field(), Some("loc"));
        assert_eq!(doc["loc"], json!([1, 2, 3]));
    }
}

/// Integer coordinates become floats when coercion is allowed.
#[test]
fn test_geopoint_integer_coordinates() {
    let mut doc = json!({"id": "3", "loc": [48, 2]});
    run(&mut doc, IndexOperation::Update, DirtyValues::CoerceOrReject).unwrap();
    assert_eq!(doc["loc"], json!([48.0, 2.0]));
    assert!(doc["loc"][0].is_f64());

    let mut doc = json!({"id": "3", "loc": [48, 2.35]});
    let err = run(&mut doc, IndexOperation::Update, DirtyValues::Reject).unwrap_err();
    assert_eq!(err.kind(), ValidationErrorKind::TypeMismatch);
}

/// Each point of a geopoint array is checked on its own.
#[test]
fn test_geopoint_array() {
    let mut doc = json!({"id": "3", "stops": [[1.5, 2.5], [3, 4]]});
    run(&mut doc, IndexOperation::Update, DirtyValues::CoerceOrDrop).unwrap();
    assert_eq!(doc["stops"], json!([[1.5, 2.5], [3.0, 4.0]]));

    let mut doc = json!({"id": "3", "stops": [[1.5, 2.5], "nowhere"]});
    let err = run(&mut doc, IndexOperation::Update, DirtyValues::CoerceOrDrop).unwrap_err();
    assert_eq!(err.kind(), ValidationErrorKind::InvalidGeopointShape);
}

// =============================================================================
// Operation Scenarios
// =============================================================================

/// Update may omit fields create would require.
#[test]
fn test_update_partial_document() {
    let mut doc = json!({"id": "4", "tags": ["new"]});
    run(&mut doc, IndexOperation::Update, DirtyValues::Reject).unwrap();

    let mut doc = json!({"id": "4", "tags": ["new"]});
    let err = run(&mut doc, IndexOperation::Create, DirtyValues::Reject).unwrap_err();
    assert_eq!(err.kind(), ValidationErrorKind::MissingRequiredField);
    assert_eq!(err.field(), Some("title"));
}

/// Delete needs nothing but the identifier.
#[test]
fn test_delete_requires_identifier() {
    let mut doc = json!({"title": "A"});
    let err = run(&mut doc, IndexOperation::Delete, DirtyValues::CoerceOrDrop).unwrap_err();
    assert_eq!(err.kind(), ValidationErrorKind::MissingIdentifier);
    assert_eq!(err.kind().code(), "MISSING_IDENTIFIER");

    let mut doc = json!({"id": "5", "price": "garbage"});
    run(&mut doc, IndexOperation::Delete, DirtyValues::Reject).unwrap();
    assert_eq!(doc["price"], json!("garbage"));
}

/// Create without an identifier leaves assignment to the caller.
#[test]
fn test_create_without_identifier() {
    let mut doc = json!({"title": "A", "price": 2});
    run(&mut doc, IndexOperation::Create, DirtyValues::Reject).unwrap();
    assert!(doc.get("id").is_none());
}

// =============================================================================
// Configuration Scenarios
// =============================================================================

/// Validator settings read from a file drive the whole write path.
#[test]
fn test_config_from_file() {
    let (tmp, loader) = setup_test_loader();
    let config_path = tmp.path().join("validator.json");
    fs::write(
        &config_path,
        r#"{
            "default_sorting_field": "price",
            "fallback_field_type": "string",
            "dirty_values": "COERCE_OR_DROP"
        }"#,
    )
    .unwrap();

    let config = ValidatorConfig::load_file(&config_path);
    // policy names are case-insensitive only through FromStr
    assert!(config.is_err());

    fs::write(
        &config_path,
        r#"{
            "default_sorting_field": "price",
            "fallback_field_type": "string",
            "dirty_values": "coerce_or_drop"
        }"#,
    )
    .unwrap();
    let config = ValidatorConfig::load_file(&config_path).unwrap();
    let validator = DocumentValidator::new(products(&loader), config);

    let mut doc = json!({"id": "6", "title": 10, "price": 3, "colour": 5, "shape": {"x": 1}});
    validator.validate(&mut doc, 1, IndexOperation::Upsert).unwrap();
    assert_eq!(
        doc,
        json!({"id": "6", "title": "10", "price": 3, "colour": "5"})
    );

    let mut doc = json!({"id": "6", "title": "A"});
    let err = validator.validate(&mut doc, 2, IndexOperation::Upsert).unwrap_err();
    assert_eq!(err.kind(), ValidationErrorKind::InvalidDefaultSortField);
}

/// Policy names parse case-insensitively.
#[test]
fn test_policy_from_str() {
    assert_eq!("COERCE_OR_DROP".parse::<DirtyValues>().unwrap(), DirtyValues::CoerceOrDrop);
    assert_eq!("Upsert".parse::<IndexOperation>().unwrap(), IndexOperation::Upsert);
    assert!("sometimes".parse::<DirtyValues>().is_err());
}
