//! Tessera command-line inspector.
//!
//! Reads a content type schema and stored rows from JSON files and runs them
//! through the mapping engine.

mod error;
mod formatter;
mod input;

use clap::{Parser, Subcommand};
use error::CliError;
use formatter::OutputFormat;
use std::path::PathBuf;
use tessera_core::{ContentFactory, ContentMapper, MapperConfig, TypeRegistry};

/// Tessera content inspector
#[derive(Parser, Debug)]
#[command(name = "tessera")]
#[command(version, about = "Inspect Tessera content rows, models and block trees")]
pub struct Args {
    /// Fail on stored field types that do not resolve
    #[arg(long, global = true)]
    pub strict: bool,

    /// Output format
    #[arg(long, global = true, default_value = "table", value_enum)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate the schema and print the stored field rows
    Rows {
        /// Content type schema (JSON)
        #[arg(long)]
        schema: PathBuf,
        /// Stored content entity (JSON)
        #[arg(long)]
        content: PathBuf,
    },
    /// Load stored rows into a dynamic model and print it
    Load {
        #[arg(long)]
        schema: PathBuf,
        #[arg(long)]
        content: PathBuf,
    },
    /// Create a new model from the schema and print the rows it saves to
    New {
        #[arg(long)]
        schema: PathBuf,
    },
    /// Rebuild a block tree from flat block records and print it
    Blocks {
        /// Block records (JSON array)
        #[arg(long)]
        content: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tessera=info")),
        )
        .init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), CliError> {
    let mut config = MapperConfig::new();
    if args.strict {
        config = config.with_strict_field_types();
    }

    let registry = TypeRegistry::global();
    let provider = input::offline_services();
    let mapper = ContentMapper::new(registry.clone(), provider.clone()).with_config(config.clone());
    let formatter = formatter::create_formatter(args.format);

    let output = match args.command {
        Command::Rows { schema, content } => {
            let content_type = input::read_schema(&schema)?;
            let entity = input::read_entity(&content)?;
            if entity.type_id != content_type.id {
                tracing::warn!(
                    entity_type = %entity.type_id,
                    content_type = %content_type.id,
                    "content was saved with a different content type"
                );
            }
            tracing::info!(content_type = %content_type.id, rows = entity.fields.len(), "read content");
            formatter.format_rows(&entity)
        }
        Command::Load { schema, content } => {
            let content_type = input::read_schema(&schema)?;
            let entity = input::read_entity(&content)?;
            let model = mapper.to_dynamic(&entity, &content_type).await?;
            formatter.format_model(&model)
        }
        Command::New { schema } => {
            let content_type = input::read_schema(&schema)?;
            let factory = ContentFactory::new(registry, provider).with_config(&config);
            let model = factory.create_dynamic(&content_type).await?;
            let saved = mapper.to_entity(&model, &content_type, None)?;
            formatter.format_rows(&saved.entity)
        }
        Command::Blocks { content } => {
            let records = input::read_blocks(&content)?;
            let blocks = mapper.unflatten_blocks(&records).await?;
            formatter.format_blocks(&blocks)
        }
    };

    println!("{}", output);
    Ok(())
}
