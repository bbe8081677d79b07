//! MongoDB `$jsonSchema` descriptors for schema-core trees.
//!
//! This crate provides bidirectional conversion between schema-core's
//! `SchemaNode` and the `$jsonSchema` descriptor vocabulary used by MongoDB
//! collection validators.
//!
//! # Modules
//!
//! - [`descriptor`] - Descriptor tree and its JSON/YAML wire form
//! - [`forward`] - SchemaNode → descriptor conversion
//! - [`reverse`] - descriptor → SchemaNode conversion
//! - [`validator`] - `$jsonSchema` validators and collection commands
//!
//! # Example
//!
//! ```rust
//! use bson_schema_types::{bson_to_schema, schema_to_bson, BsonType};
//! use schema_core::SchemaNode;
//!
//! let node = SchemaNode::object([("name", SchemaNode::string())]);
//! let descriptor = schema_to_bson(&node).unwrap();
//! assert_eq!(descriptor.bson_type(), Some(BsonType::Object));
//!
//! let back = bson_to_schema(&descriptor).unwrap();
//! assert!(back.accepts(&bson::bson!({ "name": "Alice" })));
//! ```

pub mod config;
pub mod descriptor;
pub mod error;
pub mod forward;
pub mod patterns;
pub mod reverse;
pub mod validator;

pub use config::{ConversionConfig, NumberPolicy};
pub use descriptor::{
    AdditionalProperties, Alternatives, Annotations, BsonSchema, BsonType, Items, Keywords,
    TypedSchema,
};
pub use error::{ConversionError, DescriptorError};
pub use forward::{schema_to_bson, schema_to_bson_with_config};
pub use reverse::bson_to_schema;
pub use validator::{
    build_validator, build_validator_with_config, CollectionValidation, ValidationAction,
    ValidationLevel, Validator,
};
