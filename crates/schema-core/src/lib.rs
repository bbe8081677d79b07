//! Core validation-schema types for bson-schema-bridge.
//!
//! This crate provides the application-side half of the bridge:
//!
//! - [`SchemaNode`] - Closed tree of schema combinators (objects, arrays, strings, ...)
//! - [`Refinement`] - Post-structural checks (property counts, unique items)
//! - [`SchemaNode::parse`] - Executes a schema against a BSON value
//! - [`SchemaNode::from_file`] - Loads schema definitions from YAML or JSON
//!
//! # Architecture
//!
//! ```text
//! schema-core (this crate)
//!    │
//!    └─── bson-schema-types   (SchemaNode <-> MongoDB $jsonSchema)
//! ```
//!
//! # Example
//!
//! ```rust
//! use bson::bson;
//! use schema_core::SchemaNode;
//!
//! let schema = SchemaNode::object([
//!     ("name", SchemaNode::string()),
//!     ("nickname", SchemaNode::string().optional()),
//! ]);
//!
//! assert!(schema.accepts(&bson!({ "name": "Alice" })));
//! assert!(!schema.accepts(&bson!({ "nickname": "Al" })));
//! ```

pub mod formats;
pub mod refine;
pub mod schema;
pub mod types;
pub mod validate;

pub use refine::{values_equal, Refinement};
pub use schema::SchemaError;
pub use types::{
    ArraySchema, EnumSchema, LiteralSchema, LiteralValue, NumberSchema, ObjectSchema,
    RecordSchema, SchemaNode, StringFormat, StringSchema, StringTransform, TupleSchema,
    UnionSchema, UnknownKeys, WrappedSchema,
};
pub use validate::{Issue, ValidationError};
