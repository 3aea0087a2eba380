//! CLI entry point for querygen

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use querygen::config::GeneratorConfig;

/// Long flags that may also be spelled with a single dash (`-schema`)
const LONG_FLAGS: &[&str] = &[
    "schema",
    "output",
    "table",
    "templates",
    "builtin-templates",
    "single-file",
    "dry-run",
    "config",
    "help",
    "version",
];

#[derive(Parser)]
#[command(name = "querygen")]
#[command(about = "Generate sqlc queries from SQL migration files")]
#[command(version)]
struct Cli {
    /// Path to configuration file (TOML format)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to SQL migration file (required)
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Output directory for generated SQL files [default: queries]
    #[arg(long)]
    output: Option<PathBuf>,

    /// Generate queries for one table (format: schema.table or just table)
    #[arg(long)]
    table: Option<String>,

    /// Directory containing template files [default: pkg/tool/templates]
    #[arg(long)]
    templates: Option<PathBuf>,

    /// Use the templates compiled into querygen
    #[arg(long)]
    builtin_templates: bool,

    /// Generate all queries into a single file (only when table not specified)
    #[arg(long)]
    single_file: bool,

    /// Dry run - show what would be generated without writing files
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate query files (default)
    Generate,
    /// Inspect schema (show parsed tables for debugging)
    Inspect,
}

fn main() {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));

    if let Err(e) = run(cli) {
        error!("Error generating queries: {:#}", e);
        eprintln!("Error generating queries: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Load configuration first (before logging, so we can use config.log_level)
    let mut config = GeneratorConfig::load(cli.config.as_deref())?;

    init_logging(&config);

    // Apply CLI overrides
    if let Some(schema) = cli.schema {
        config.schema_file = schema;
    }
    if let Some(output) = cli.output {
        config.output_dir = output;
    }
    if let Some(table) = cli.table {
        config.table = Some(table);
    }
    if let Some(templates) = cli.templates {
        config.templates_dir = templates;
    }
    if cli.builtin_templates {
        config.builtin_templates = true;
    }
    if cli.single_file {
        config.single_file = true;
    }
    if cli.dry_run {
        config.dry_run = true;
    }

    if !config.has_schema() {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    }

    if let Some(Commands::Inspect) = cli.command {
        return inspect_schema(&config);
    }

    config.validate()?;

    info!("Generating queries from schema: {:?}", config.schema_file);
    let files = querygen::generate(&config)?;

    if config.dry_run {
        println!("Dry run mode - would generate:");
        for file in &files {
            println!("  {}", file.display());
        }
        return Ok(());
    }

    println!(
        "Successfully generated SQLC queries in {}",
        config.output_dir.display()
    );
    Ok(())
}

/// Priority: RUST_LOG env var > config.log_level > default (debug for dev, info for release)
fn init_logging(config: &GeneratorConfig) {
    let default_level = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };
    let log_level = config.log_level.as_deref().unwrap_or(default_level);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Accept Go-style single-dash long flags (`-schema x`, `-single-file`)
fn normalize_args(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    args.into_iter()
        .map(|arg| {
            let Some(s) = arg.to_str() else {
                return arg;
            };
            let Some(flag) = s.strip_prefix('-') else {
                return arg;
            };
            if flag.starts_with('-') {
                return arg;
            }
            let name = flag.split('=').next().unwrap_or(flag);
            if LONG_FLAGS.contains(&name) {
                OsString::from(format!("-{}", s))
            } else {
                arg
            }
        })
        .collect()
}

fn inspect_schema(config: &GeneratorConfig) -> Result<()> {
    let tables = querygen::parser::parse_schema_file(&config.schema_file)?;

    println!("Parsed {} tables:\n", tables.len());
    for table in &tables {
        println!("Table: {}", table.qualified_name());
        println!("  Columns:");
        for col in &table.columns {
            let nullable = if col.is_nullable { "NULL" } else { "NOT NULL" };
            let serial = if col.is_serial { " SERIAL" } else { "" };
            let default = if col.has_default() {
                format!(" DEFAULT {}", col.default_value)
            } else {
                String::new()
            };
            println!(
                "    - {} {} ({}) {}{}{}",
                col.name, col.data_type, col.element_type, nullable, serial, default
            );
        }
        if !table.primary_key.is_empty() {
            println!("  Primary Key: {:?}", table.primary_key);
        }
        if !table.unique_constraints.is_empty() {
            println!("  Unique Indexes:");
            for idx in &table.unique_constraints {
                println!("    - {} ({:?})", idx.name, idx.columns);
            }
        }
        println!();
    }

    Ok(())
}
