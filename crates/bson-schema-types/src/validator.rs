//! Collection validator documents.
//!
//! A validator wraps a descriptor under the `$jsonSchema` operator. Command
//! documents for `create` and `collMod` are assembled here but never sent.

use crate::config::ConversionConfig;
use crate::descriptor::BsonSchema;
use crate::error::{ConversionError, DescriptorError};
use crate::forward::schema_to_bson_with_config;
use bson::{doc, Document};
use schema_core::SchemaNode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A collection validator: `{ "$jsonSchema": <descriptor> }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Validator {
    #[serde(rename = "$jsonSchema")]
    pub json_schema: BsonSchema,
}

impl Validator {
    /// Wrap an existing descriptor.
    pub fn new(json_schema: BsonSchema) -> Self {
        Self { json_schema }
    }

    /// Render as a BSON document.
    pub fn to_document(&self) -> Result<Document, DescriptorError> {
        Ok(bson::to_document(self)?)
    }
}

/// Build a validator from a schema node with the default configuration.
pub fn build_validator(node: &SchemaNode) -> Result<Validator, ConversionError> {
    build_validator_with_config(node, &ConversionConfig::default())
}

/// Build a validator from a schema node.
pub fn build_validator_with_config(
    node: &SchemaNode,
    config: &ConversionConfig,
) -> Result<Validator, ConversionError> {
    let json_schema = schema_to_bson_with_config(node, config)?;
    Ok(Validator::new(json_schema))
}

/// Which writes the server validates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationLevel {
    /// No validation
    Off,
    /// Every insert and update
    #[default]
    Strict,
    /// Inserts, and updates to documents that already validate
    Moderate,
}

impl ValidationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Strict => "strict",
            Self::Moderate => "moderate",
        }
    }
}

impl fmt::Display for ValidationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "off" => Ok(Self::Off),
            "strict" => Ok(Self::Strict),
            "moderate" => Ok(Self::Moderate),
            other => Err(format!("unknown validation level: {other}")),
        }
    }
}

/// What the server does with an invalid write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationAction {
    /// Reject the write
    #[default]
    Error,
    /// Accept the write and log a warning
    Warn,
}

impl ValidationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
        }
    }
}

impl fmt::Display for ValidationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "error" => Ok(Self::Error),
            "warn" => Ok(Self::Warn),
            other => Err(format!("unknown validation action: {other}")),
        }
    }
}

/// A validator together with the collection's validation options.
///
/// # Example
///
/// ```rust
/// use bson_schema_types::{build_validator, CollectionValidation, ValidationAction};
/// use schema_core::SchemaNode;
///
/// let validator = build_validator(&SchemaNode::object([("name", SchemaNode::string())])).unwrap();
/// let command = CollectionValidation::new(validator)
///     .with_validation_action(ValidationAction::Warn)
///     .coll_mod_command("users")
///     .unwrap();
/// assert_eq!(command.get_str("collMod").unwrap(), "users");
/// assert_eq!(command.get_str("validationAction").unwrap(), "warn");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionValidation {
    pub validator: Validator,
    pub validation_level: ValidationLevel,
    pub validation_action: ValidationAction,
}

impl CollectionValidation {
    /// Use `validator` with the server's default level and action.
    pub fn new(validator: Validator) -> Self {
        Self {
            validator,
            validation_level: ValidationLevel::default(),
            validation_action: ValidationAction::default(),
        }
    }

    pub fn with_validation_level(mut self, level: ValidationLevel) -> Self {
        self.validation_level = level;
        self
    }

    pub fn with_validation_action(mut self, action: ValidationAction) -> Self {
        self.validation_action = action;
        self
    }

    /// `create` command for a new collection named `collection`.
    pub fn create_command(&self, collection: &str) -> Result<Document, DescriptorError> {
        Ok(doc! {
            "create": collection,
            "validator": self.validator.to_document()?,
            "validationLevel": self.validation_level.as_str(),
            "validationAction": self.validation_action.as_str(),
        })
    }

    /// `collMod` command that replaces the validator of `collection`.
    pub fn coll_mod_command(&self, collection: &str) -> Result<Document, DescriptorError> {
        Ok(doc! {
            "collMod": collection,
            "validator": self.validator.to_document()?,
            "validationLevel": self.validation_level.as_str(),
            "validationAction": self.validation_action.as_str(),
        })
    }
}
