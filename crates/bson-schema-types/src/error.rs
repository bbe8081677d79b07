//! Error types for descriptor handling and conversion.

/// A schema tree could not be converted.
///
/// Both variants are fatal to the conversion call; there are no partial results.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// Schema node variant has no `$jsonSchema` mapping
    #[error("Unsupported source schema type: {0}")]
    UnsupportedSourceType(String),

    /// `bsonType` has no schema node mapping
    #[error("Unsupported target BSON type: {0}")]
    UnsupportedTargetKind(String),
}

/// A descriptor could not be read, parsed, or rendered.
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    /// Node declares both `bsonType` and `anyOf`
    #[error("Descriptor node declares both bsonType and anyOf")]
    KindAndAlternatives,

    /// `bsonType` given as an empty list
    #[error("Descriptor node has an empty bsonType list")]
    EmptyTypeList,

    /// Error reading descriptor file
    #[error("Failed to read descriptor file: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing JSON
    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error parsing YAML
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Error rendering BSON
    #[error("Failed to encode BSON: {0}")]
    BsonError(#[from] bson::ser::Error),
}
