//! Pattern literals shared by both conversion directions.

pub use schema_core::formats::{EMAIL_PATTERN, UUID_PATTERN};

/// Canonical text form of an ObjectId: 24 hex digits, either case.
///
/// A string node whose only constraint is this exact pattern converts to
/// `bsonType: objectId`, and `objectId` converts back to a string node with it.
pub const OBJECT_ID_PATTERN: &str = "^[0-9a-fA-F]{24}$";
