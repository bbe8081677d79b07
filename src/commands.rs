//! Command implementations behind the CLI.
//!
//! Each command loads its inputs, runs the conversion and returns the text to
//! print, so the binary stays a thin argument-parsing layer.

use crate::documents::load_documents;
use crate::{CollectionOpts, ConversionOpts};
use anyhow::Context;
use bson::{Bson, Document};
use bson_schema_types::{
    bson_to_schema, build_validator_with_config, schema_to_bson_with_config, BsonSchema,
    CollectionValidation, ConversionConfig,
};
use clap::ValueEnum;
use schema_core::{SchemaNode, ValidationError};
use std::fmt;
use std::path::Path;

/// Text format for schema definitions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum DefinitionFormat {
    #[default]
    #[value(name = "yaml")]
    Yaml,
    #[value(name = "json")]
    Json,
}

/// Which document the `validator` command prints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum CommandKind {
    /// The bare `{ $jsonSchema: ... }` validator
    #[default]
    #[value(name = "none")]
    None,
    /// A `create` command for a new collection
    #[value(name = "create")]
    Create,
    /// A `collMod` command for an existing collection
    #[value(name = "coll-mod")]
    CollMod,
}

fn load_schema(path: &Path) -> anyhow::Result<SchemaNode> {
    SchemaNode::from_file(path)
        .with_context(|| format!("Failed to load schema definition from {path:?}"))
}

fn load_descriptor(path: &Path) -> anyhow::Result<BsonSchema> {
    BsonSchema::from_file(path).with_context(|| format!("Failed to load descriptor from {path:?}"))
}

/// Convert a schema definition file to a pretty-printed `$jsonSchema` descriptor.
pub fn to_bson(schema_path: &Path, opts: &ConversionOpts) -> anyhow::Result<String> {
    let node = load_schema(schema_path)?;
    let config = ConversionConfig::from(opts);
    tracing::debug!(
        "Converting {:?} with nullable_widening={} number_policy={}",
        schema_path,
        config.nullable_widening,
        config.number_policy
    );
    let descriptor = schema_to_bson_with_config(&node, &config)
        .with_context(|| format!("Failed to convert schema from {schema_path:?}"))?;
    Ok(descriptor.to_json_pretty()?)
}

/// Convert a descriptor file to a schema definition.
pub fn from_bson(descriptor_path: &Path, format: DefinitionFormat) -> anyhow::Result<String> {
    let descriptor = load_descriptor(descriptor_path)?;
    let node = bson_to_schema(&descriptor)
        .with_context(|| format!("Failed to convert descriptor from {descriptor_path:?}"))?;
    match format {
        DefinitionFormat::Yaml => Ok(node.to_yaml()?),
        DefinitionFormat::Json => Ok(serde_json::to_string_pretty(&node)?),
    }
}

/// Build a validator, or a command document carrying it, as relaxed extended JSON.
pub fn validator(
    schema_path: &Path,
    opts: &ConversionOpts,
    command: CommandKind,
    collection: Option<&str>,
    collection_opts: &CollectionOpts,
) -> anyhow::Result<String> {
    let node = load_schema(schema_path)?;
    let validator = build_validator_with_config(&node, &ConversionConfig::from(opts))
        .with_context(|| format!("Failed to build validator from {schema_path:?}"))?;

    let document = match command {
        CommandKind::None => validator.to_document()?,
        CommandKind::Create | CommandKind::CollMod => {
            let Some(collection) = collection else {
                anyhow::bail!("--collection is required for the {command:?} command");
            };
            let validation = CollectionValidation::new(validator)
                .with_validation_level(collection_opts.validation_level)
                .with_validation_action(collection_opts.validation_action);
            if command == CommandKind::Create {
                validation.create_command(collection)?
            } else {
                validation.coll_mod_command(collection)?
            }
        }
    };
    render_relaxed(document)
}

fn render_relaxed(document: Document) -> anyhow::Result<String> {
    let value = Bson::Document(document).into_relaxed_extjson();
    Ok(serde_json::to_string_pretty(&value)?)
}

/// A document rejected by `check`.
#[derive(Debug)]
pub struct Rejection {
    /// Position in the input
    pub index: usize,
    pub error: ValidationError,
}

/// Outcome of validating sample documents.
#[derive(Debug)]
pub struct CheckReport {
    pub total: usize,
    pub rejected: Vec<Rejection>,
}

impl CheckReport {
    pub fn is_success(&self) -> bool {
        self.rejected.is_empty()
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rejection in &self.rejected {
            writeln!(f, "document {}: {}", rejection.index, rejection.error)?;
        }
        write!(
            f,
            "{} of {} documents accepted",
            self.total - self.rejected.len(),
            self.total
        )
    }
}

/// Convert a descriptor back to a schema and validate each sample document with it.
pub fn check(descriptor_path: &Path, documents_path: &Path) -> anyhow::Result<CheckReport> {
    let descriptor = load_descriptor(descriptor_path)?;
    let node = bson_to_schema(&descriptor)
        .with_context(|| format!("Failed to convert descriptor from {descriptor_path:?}"))?;
    let documents = load_documents(documents_path)?;

    let mut rejected = Vec::new();
    for (index, document) in documents.iter().enumerate() {
        if let Err(error) = node.parse(document) {
            tracing::debug!("Document {} rejected: {}", index, error);
            rejected.push(Rejection { index, error });
        }
    }
    Ok(CheckReport {
        total: documents.len(),
        rejected,
    })
}
