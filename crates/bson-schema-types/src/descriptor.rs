//! `$jsonSchema` descriptor tree.
//!
//! A descriptor node is either a single-kind node (`bsonType` plus keywords), an
//! alternatives node (`anyOf`), or an unconstrained node that accepts anything. The
//! enum shape makes a node carrying both a kind and alternatives unrepresentable;
//! the wire parser rejects such input.

use crate::error::DescriptorError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// BSON type vocabulary used by `bsonType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BsonType {
    /// 64-bit binary floating point
    #[serde(rename = "double")]
    Double,
    /// UTF-8 string
    #[serde(rename = "string")]
    String,
    /// Embedded document
    #[serde(rename = "object")]
    Object,
    /// Array
    #[serde(rename = "array")]
    Array,
    /// Database-assigned object identifier
    #[serde(rename = "objectId")]
    ObjectId,
    /// Boolean
    #[serde(rename = "bool")]
    Bool,
    /// UTC datetime
    #[serde(rename = "date")]
    Date,
    /// Null
    #[serde(rename = "null")]
    Null,
    /// Regular expression
    #[serde(rename = "regex")]
    Regex,
    /// 32-bit integer
    #[serde(rename = "int")]
    Int,
    /// Internal replication timestamp
    #[serde(rename = "timestamp")]
    Timestamp,
    /// 64-bit integer
    #[serde(rename = "long")]
    Long,
    /// 128-bit decimal
    #[serde(rename = "decimal")]
    Decimal,
    /// UUID binary
    #[serde(rename = "uuid")]
    Uuid,
    /// Binary data
    #[serde(rename = "binData")]
    BinData,
    /// Any BSON type
    #[serde(rename = "mixed")]
    Mixed,
}

impl BsonType {
    /// The `bsonType` string for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Double => "double",
            Self::String => "string",
            Self::Object => "object",
            Self::Array => "array",
            Self::ObjectId => "objectId",
            Self::Bool => "bool",
            Self::Date => "date",
            Self::Null => "null",
            Self::Regex => "regex",
            Self::Int => "int",
            Self::Timestamp => "timestamp",
            Self::Long => "long",
            Self::Decimal => "decimal",
            Self::Uuid => "uuid",
            Self::BinData => "binData",
            Self::Mixed => "mixed",
        }
    }

    /// Check if this kind is one of the numeric kinds.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Double | Self::Int | Self::Long | Self::Decimal)
    }
}

impl fmt::Display for BsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `additionalProperties`: a strict/open flag or a descriptor for all other keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    /// `true` keeps the object open, `false` closes it
    Allowed(bool),
    /// Every undeclared key must match this descriptor
    Schema(Box<BsonSchema>),
}

/// `items`: one descriptor for every element, or positional descriptors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Items {
    /// Every element matches this descriptor
    Single(Box<BsonSchema>),
    /// Element `i` matches descriptor `i`
    Tuple(Vec<BsonSchema>),
}

/// Keywords of a single-kind node.
///
/// Keywords that do not apply to the node's kind are carried but ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keywords {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Closed set of allowed values
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<serde_json::Value>>,

    // Object keywords
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, BsonSchema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_properties: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_properties: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,

    // Array keywords
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Items>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,

    // String keywords
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    // Numeric keywords
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<f64>,
}

/// Free-text annotations carried by alternatives and unconstrained nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotations {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// A single-kind descriptor node.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedSchema {
    /// The node's kind
    pub bson_type: BsonType,
    /// Constraints and annotations
    pub keywords: Keywords,
}

impl TypedSchema {
    /// Create a node of the given kind with no keywords.
    pub fn new(bson_type: BsonType) -> Self {
        Self {
            bson_type,
            keywords: Keywords::default(),
        }
    }

    /// Create a node of the given kind with the given keywords.
    pub fn with_keywords(bson_type: BsonType, keywords: Keywords) -> Self {
        Self {
            bson_type,
            keywords,
        }
    }
}

/// An alternatives node: matches any one of its members.
#[derive(Debug, Clone, PartialEq)]
pub struct Alternatives {
    /// Members, in order
    pub any_of: Vec<BsonSchema>,
    pub annotations: Annotations,
}

/// A node in a `$jsonSchema` descriptor tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBsonSchema", into = "RawBsonSchema")]
pub enum BsonSchema {
    /// Single-kind node
    Typed(TypedSchema),
    /// Matches any one of several nodes
    Alternatives(Alternatives),
    /// No kind: accepts anything
    Unconstrained(Annotations),
}

impl BsonSchema {
    /// Create a bare node of the given kind.
    pub fn typed(bson_type: BsonType) -> Self {
        Self::Typed(TypedSchema::new(bson_type))
    }

    /// Create an alternatives node over `members`.
    pub fn alternatives(members: Vec<BsonSchema>) -> Self {
        Self::Alternatives(Alternatives {
            any_of: members,
            annotations: Annotations::default(),
        })
    }

    /// Create a node that accepts anything.
    pub fn unconstrained() -> Self {
        Self::Unconstrained(Annotations::default())
    }

    /// Kind of a single-kind node.
    pub fn bson_type(&self) -> Option<BsonType> {
        match self {
            Self::Typed(t) => Some(t.bson_type),
            _ => None,
        }
    }

    /// Borrow the single-kind payload, if this is a single-kind node.
    pub fn as_typed(&self) -> Option<&TypedSchema> {
        match self {
            Self::Typed(t) => Some(t),
            _ => None,
        }
    }

    /// Load a descriptor from a file.
    ///
    /// Files ending in `.yaml` or `.yml` are read as YAML, anything else as JSON.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DescriptorError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml(&content),
            _ => Self::from_json(&content),
        }
    }

    /// Parse a descriptor from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, DescriptorError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a descriptor from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, DescriptorError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Render this descriptor as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, DescriptorError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// Wire representation. Every keyword is optional here; the conversion into
// `BsonSchema` decides which shape the node has.

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum BsonTypeSpec {
    One(BsonType),
    Many(Vec<BsonType>),
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBsonSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bson_type: Option<BsonTypeSpec>,
    #[serde(default, alias = "oneOf", skip_serializing_if = "Option::is_none")]
    any_of: Option<Vec<BsonSchema>>,
    #[serde(flatten)]
    keywords: Keywords,
}

impl TryFrom<RawBsonSchema> for BsonSchema {
    type Error = DescriptorError;

    fn try_from(raw: RawBsonSchema) -> Result<Self, Self::Error> {
        let annotations = Annotations {
            title: raw.keywords.title.clone(),
            description: raw.keywords.description.clone(),
        };
        match (raw.bson_type, raw.any_of) {
            (Some(_), Some(_)) => Err(DescriptorError::KindAndAlternatives),
            (None, Some(any_of)) => Ok(Self::Alternatives(Alternatives {
                any_of,
                annotations,
            })),
            (Some(BsonTypeSpec::One(bson_type)), None) => {
                Ok(Self::Typed(TypedSchema::with_keywords(bson_type, raw.keywords)))
            }
            (Some(BsonTypeSpec::Many(kinds)), None) => match kinds.as_slice() {
                [] => Err(DescriptorError::EmptyTypeList),
                [only] => Ok(Self::Typed(TypedSchema::with_keywords(*only, raw.keywords))),
                _ => {
                    let mut keywords = raw.keywords;
                    keywords.title = None;
                    keywords.description = None;
                    let any_of = kinds
                        .iter()
                        .map(|kind| Self::Typed(TypedSchema::with_keywords(*kind, keywords.clone())))
                        .collect();
                    Ok(Self::Alternatives(Alternatives {
                        any_of,
                        annotations,
                    }))
                }
            },
            (None, None) => Ok(Self::Unconstrained(annotations)),
        }
    }
}

impl From<BsonSchema> for RawBsonSchema {
    fn from(schema: BsonSchema) -> Self {
        match schema {
            BsonSchema::Typed(t) => Self {
                bson_type: Some(BsonTypeSpec::One(t.bson_type)),
                any_of: None,
                keywords: t.keywords,
            },
            BsonSchema::Alternatives(alt) => Self {
                bson_type: None,
                any_of: Some(alt.any_of),
                keywords: annotation_keywords(alt.annotations),
            },
            BsonSchema::Unconstrained(annotations) => Self {
                bson_type: None,
                any_of: None,
                keywords: annotation_keywords(annotations),
            },
        }
    }
}

fn annotation_keywords(annotations: Annotations) -> Keywords {
    Keywords {
        title: annotations.title,
        description: annotations.description,
        ..Keywords::default()
    }
}
