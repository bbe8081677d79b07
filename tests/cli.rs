//! End-to-end tests for the command functions behind the CLI.

use bson_schema_bridge::commands::{self, CommandKind, DefinitionFormat};
use bson_schema_bridge::{CollectionOpts, ConversionOpts};
use bson_schema_types::{BsonSchema, NumberPolicy, ValidationAction, ValidationLevel};
use schema_core::SchemaNode;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const USER_SCHEMA: &str = r#"
type: object
fields:
  name: { type: string, min_length: 1 }
  email: { type: string, format: email }
  age:
    type: optional
    inner: { type: number, int: true, minimum: 0 }
  nickname:
    type: nullable
    inner: { type: string }
"#;

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_to_bson_default_options() {
    let dir = TempDir::new().unwrap();
    let schema = write(&dir, "user.yaml", USER_SCHEMA);

    let output = commands::to_bson(&schema, &ConversionOpts::default()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(json["bsonType"], "object");
    assert_eq!(
        json["required"],
        serde_json::json!(["name", "email", "nickname"])
    );
    assert_eq!(json["properties"]["age"]["bsonType"], "int");
    assert_eq!(
        json["properties"]["nickname"],
        serde_json::json!({ "anyOf": [{ "bsonType": "string" }, { "bsonType": "null" }] })
    );
}

#[test]
fn test_to_bson_custom_options() {
    let dir = TempDir::new().unwrap();
    let schema = write(&dir, "user.yaml", USER_SCHEMA);
    let opts = ConversionOpts {
        nullable_widening: false,
        number_policy: NumberPolicy::Ambiguous,
    };

    let output = commands::to_bson(&schema, &opts).unwrap();
    let descriptor = BsonSchema::from_json(&output).unwrap();
    let properties = descriptor.as_typed().unwrap().keywords.properties.clone().unwrap();
    assert_eq!(properties["nickname"], BsonSchema::typed(bson_schema_types::BsonType::String));
    assert!(matches!(properties["age"], BsonSchema::Alternatives(_)));
}

#[test]
fn test_from_bson_formats() {
    let dir = TempDir::new().unwrap();
    let descriptor = write(
        &dir,
        "user.schema.json",
        r#"{
            "bsonType": "object",
            "required": ["name"],
            "properties": {
                "name": { "bsonType": "string" },
                "tags": { "bsonType": "array", "items": { "bsonType": "string" } }
            }
        }"#,
    );

    let yaml = commands::from_bson(&descriptor, DefinitionFormat::Yaml).unwrap();
    let from_yaml = SchemaNode::from_yaml(&yaml).unwrap();
    let json = commands::from_bson(&descriptor, DefinitionFormat::Json).unwrap();
    let from_json = SchemaNode::from_json(&json).unwrap();
    assert_eq!(from_yaml, from_json);

    let SchemaNode::Object(obj) = from_yaml else {
        panic!("Expected Object");
    };
    assert_eq!(obj.required_fields(), vec!["name"]);
}

#[test]
fn test_validator_commands() {
    let dir = TempDir::new().unwrap();
    let schema = write(&dir, "user.yaml", USER_SCHEMA);
    let collection_opts = CollectionOpts {
        validation_level: ValidationLevel::Moderate,
        validation_action: ValidationAction::Warn,
    };

    let bare = commands::validator(
        &schema,
        &ConversionOpts::default(),
        CommandKind::None,
        None,
        &collection_opts,
    )
    .unwrap();
    let bare: serde_json::Value = serde_json::from_str(&bare).unwrap();
    assert_eq!(bare["$jsonSchema"]["bsonType"], "object");

    let coll_mod = commands::validator(
        &schema,
        &ConversionOpts::default(),
        CommandKind::CollMod,
        Some("users"),
        &collection_opts,
    )
    .unwrap();
    let coll_mod: serde_json::Value = serde_json::from_str(&coll_mod).unwrap();
    assert_eq!(coll_mod["collMod"], "users");
    assert_eq!(coll_mod["validationLevel"], "moderate");
    assert_eq!(coll_mod["validationAction"], "warn");
    assert_eq!(coll_mod["validator"], bare);
}

#[test]
fn test_validator_requires_collection() {
    let dir = TempDir::new().unwrap();
    let schema = write(&dir, "user.yaml", USER_SCHEMA);
    let result = commands::validator(
        &schema,
        &ConversionOpts::default(),
        CommandKind::Create,
        None,
        &CollectionOpts::default(),
    );
    assert!(result.is_err());
}

#[test]
fn test_check_documents() {
    let dir = TempDir::new().unwrap();
    let schema = write(&dir, "user.yaml", USER_SCHEMA);
    let descriptor_json = commands::to_bson(&schema, &ConversionOpts::default()).unwrap();
    let descriptor = write(&dir, "user.schema.json", &descriptor_json);
    let documents = write(
        &dir,
        "users.jsonl",
        concat!(
            r#"{"name": "Ada", "email": "ada@example.com", "nickname": null}"#,
            "\n",
            r#"{"name": "Bob", "email": "not-an-email", "nickname": "B"}"#,
            "\n",
            r#"{"name": "Cy", "email": "cy@example.org", "age": 30, "nickname": "C"}"#,
            "\n",
        ),
    );

    let report = commands::check(&descriptor, &documents).unwrap();
    assert_eq!(report.total, 3);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].index, 1);
    assert!(!report.is_success());
}

#[test]
fn test_missing_file_errors() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.yaml");
    let err = commands::to_bson(&missing, &ConversionOpts::default()).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to load schema definition"));
}

#[test]
fn test_unsupported_schema_errors() {
    let dir = TempDir::new().unwrap();
    let schema = write(
        &dir,
        "job.yaml",
        "type: object\nfields:\n  run: { type: function }\n",
    );
    let err = commands::to_bson(&schema, &ConversionOpts::default()).unwrap_err();
    assert!(format!("{err:#}").contains("function"));
}
