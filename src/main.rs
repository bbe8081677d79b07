//! Command-line interface for bson-schema-bridge
//!
//! # Usage Examples
//!
//! ## Forward conversion
//! ```bash
//! # Descriptor with nullable widening and one numeric kind per number
//! bson-schema-bridge to-bson --schema user.yaml
//!
//! # Every numeric kind a value could be stored as
//! BSON_SCHEMA_NUMBER_POLICY=ambiguous bson-schema-bridge to-bson --schema user.yaml
//! ```
//!
//! ## Reverse conversion
//! ```bash
//! bson-schema-bridge from-bson --descriptor user.schema.json --format json
//! ```
//!
//! ## Validators
//! ```bash
//! # create command with warn-only validation
//! bson-schema-bridge validator \
//!   --schema user.yaml \
//!   --collection users \
//!   --command create \
//!   --validation-action warn
//! ```
//!
//! ## Checking sample documents
//! ```bash
//! bson-schema-bridge check --descriptor user.schema.json --documents users.jsonl
//! ```

use bson_schema_bridge::commands::{self, CommandKind, DefinitionFormat};
use bson_schema_bridge::{CollectionOpts, ConversionOpts};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bson-schema-bridge")]
#[command(about = "Convert validation schemas to and from MongoDB $jsonSchema validators")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a schema definition into a $jsonSchema descriptor
    ToBson {
        /// Schema definition file (YAML, or JSON with a .json extension)
        #[arg(long, value_name = "PATH")]
        schema: PathBuf,

        #[command(flatten)]
        conversion: ConversionOpts,
    },

    /// Convert a $jsonSchema descriptor into a schema definition
    FromBson {
        /// Descriptor file (JSON, or YAML with a .yaml/.yml extension)
        #[arg(long, value_name = "PATH")]
        descriptor: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: DefinitionFormat,
    },

    /// Build a collection validator from a schema definition
    Validator {
        /// Schema definition file
        #[arg(long, value_name = "PATH")]
        schema: PathBuf,

        /// Collection name (required for create and coll-mod)
        #[arg(long)]
        collection: Option<String>,

        /// Wrap the validator in a command document
        #[arg(long, value_enum, default_value = "none")]
        command: CommandKind,

        #[command(flatten)]
        conversion: ConversionOpts,

        #[command(flatten)]
        collection_opts: CollectionOpts,
    },

    /// Validate sample documents against a $jsonSchema descriptor
    Check {
        /// Descriptor file
        #[arg(long, value_name = "PATH")]
        descriptor: PathBuf,

        /// Documents: a JSON array, one JSON document, or JSON lines
        #[arg(long, value_name = "PATH")]
        documents: PathBuf,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::ToBson { schema, conversion } => {
            println!("{}", commands::to_bson(&schema, &conversion)?);
        }
        Commands::FromBson { descriptor, format } => {
            println!("{}", commands::from_bson(&descriptor, format)?);
        }
        Commands::Validator {
            schema,
            collection,
            command,
            conversion,
            collection_opts,
        } => {
            let output = commands::validator(
                &schema,
                &conversion,
                command,
                collection.as_deref(),
                &collection_opts,
            )?;
            println!("{output}");
        }
        Commands::Check {
            descriptor,
            documents,
        } => {
            let report = commands::check(&descriptor, &documents)?;
            println!("{report}");
            if !report.is_success() {
                anyhow::bail!(
                    "{} of {} documents rejected",
                    report.rejected.len(),
                    report.total
                );
            }
        }
    }

    Ok(())
}
