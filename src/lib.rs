//! bson-schema-bridge library
//!
//! Translates application validation schemas into MongoDB `$jsonSchema`
//! validators and back.
//!
//! # Crates
//!
//! - `schema_core` - Schema node tree, definition files and document validation
//! - `bson_schema_types` - `$jsonSchema` descriptors and both conversion directions
//!
//! # CLI Usage
//!
//! ```bash
//! # Schema definition → $jsonSchema descriptor
//! bson-schema-bridge to-bson --schema user.yaml --number-policy ambiguous
//!
//! # Descriptor → schema definition
//! bson-schema-bridge from-bson --descriptor user.schema.json --format yaml
//!
//! # collMod command for an existing collection
//! bson-schema-bridge validator --schema user.yaml --collection users --command coll-mod
//!
//! # Validate sample documents against a descriptor
//! bson-schema-bridge check --descriptor user.schema.json --documents users.jsonl
//! ```

use bson_schema_types::{ConversionConfig, NumberPolicy, ValidationAction, ValidationLevel};
use clap::{ArgAction, Parser};

pub mod commands;
pub mod documents;

pub use bson_schema_types;
pub use schema_core;

#[derive(Parser, Clone, Debug)]
pub struct ConversionOpts {
    /// Emit anyOf [T, null] for nullable nodes
    #[arg(
        long,
        default_value_t = true,
        action = ArgAction::Set,
        env = "BSON_SCHEMA_NULLABLE_WIDENING"
    )]
    pub nullable_widening: bool,

    /// Numeric kind selection: single or ambiguous
    #[arg(long, default_value = "single", env = "BSON_SCHEMA_NUMBER_POLICY")]
    pub number_policy: NumberPolicy,
}

impl Default for ConversionOpts {
    fn default() -> Self {
        Self {
            nullable_widening: true,
            number_policy: NumberPolicy::Single,
        }
    }
}

// CLI options → converter configuration
impl From<&ConversionOpts> for ConversionConfig {
    fn from(opts: &ConversionOpts) -> Self {
        ConversionConfig::new()
            .with_nullable_widening(opts.nullable_widening)
            .with_number_policy(opts.number_policy)
    }
}

#[derive(Parser, Clone, Debug, Default)]
pub struct CollectionOpts {
    /// Which writes are validated: off, strict or moderate
    #[arg(long, default_value = "strict")]
    pub validation_level: ValidationLevel,

    /// What happens to invalid writes: error or warn
    #[arg(long, default_value = "error")]
    pub validation_action: ValidationAction,
}
