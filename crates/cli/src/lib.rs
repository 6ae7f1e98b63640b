//! # ddlgen CLI
//!
//! Command-line interface for ddlgen.
//!
//! ## Commands
//!
//! - `ddl` - Generate a DDL/DML script for a model version
//! - `dialects` - List the supported SQL dialects
//! - `models` - List the models and versions found in a schema directory
//!
//! The binary in the workspace root parses [`Cli`], installs logging and
//! calls [`run`]. Everything else lives here so it can be tested without a
//! process boundary.

pub mod config;

pub use config::Config;

use anyhow::{Context, Result, bail};
use clap::{ArgGroup, Args, Parser, Subcommand};
use colored::Colorize;
use ddlgen_codegen::{
    ElementFlags, FileSource, GenerateOptions, Generator, SchemaSource, StaticSource, summarize,
};
use ddlgen_core::Dialect;
use ddlgen_ir::{ModelVersion, SchemaDocument};
use std::io::Write;
use std::path::PathBuf;

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Service version recorded when nothing better is known
pub const UNKNOWN_SERVICE_VERSION: &str = "unknown";

/// Log level used when neither flag, environment nor config sets one
pub const DEFAULT_LOG_LEVEL: &str = "warn";

// ============================================================================
// Arguments
// ============================================================================

/// Multi-dialect DDL generator for JSON-described data models
#[derive(Debug, Parser)]
#[command(name = "ddlgen", version, about)]
pub struct Cli {
    /// Log level or filter directive (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Configuration file
    #[arg(long, global = true, env = "DDLGEN_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate DDL (or DML) for a model version
    Ddl(DdlArgs),

    /// List supported dialects
    Dialects,

    /// List models and versions in a schema directory
    Models(ModelsArgs),
}

#[derive(Debug, Args)]
#[command(group(
    ArgGroup::new("mode")
        .multiple(false)
        .args(["drop", "delete_data", "nologging", "logging"])
))]
pub struct DdlArgs {
    /// Include tables
    #[arg(short = 't', long)]
    pub tables: bool,

    /// Include constraints
    #[arg(short = 'c', long)]
    pub constraints: bool,

    /// Include indexes
    #[arg(short = 'i', long)]
    pub indexes: bool,

    /// Drop objects instead of creating them
    #[arg(short = 'd', long)]
    pub drop: bool,

    /// Delete all data, children before parents
    #[arg(short = 'x', long)]
    pub delete_data: bool,

    /// Switch objects to NOLOGGING (Oracle only)
    #[arg(short = 'n', long)]
    pub nologging: bool,

    /// Switch objects to LOGGING (Oracle only)
    #[arg(short = 'l', long)]
    pub logging: bool,

    /// Write the script to a file instead of stdout
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Read the schema document from this file
    #[arg(long, value_name = "FILE", conflicts_with = "schema_dir")]
    pub schema: Option<PathBuf>,

    /// Resolve documents as <DIR>/<MODEL>/<MODEL_VERSION>.json
    #[arg(long, value_name = "DIR")]
    pub schema_dir: Option<PathBuf>,

    /// Service version recorded in the audit trail
    #[arg(long, value_name = "VERSION")]
    pub service_version: Option<String>,

    /// Model name, e.g. omop
    pub model: String,

    /// Model version, e.g. 5.0.0
    pub model_version: String,

    /// postgresql, oracle, mssql, mysql or sqlite
    pub dialect: Dialect,
}

impl DdlArgs {
    /// Element selection; none given means all
    pub fn elements(&self) -> ElementFlags {
        ElementFlags {
            tables: self.tables,
            constraints: self.constraints,
            indexes: self.indexes,
        }
        .or_all()
    }

    /// Library options for these arguments
    pub fn options(&self) -> GenerateOptions {
        let mut options = GenerateOptions::new(&self.model, &self.model_version, self.dialect)
            .with_elements(self.elements());
        options.drop = self.drop;
        options.delete_data = self.delete_data;
        options.logging = self.logging;
        options.nologging = self.nologging;
        if let Some(version) = &self.service_version {
            options = options.with_service_version(version);
        }
        options
    }
}

#[derive(Debug, Args)]
pub struct ModelsArgs {
    /// Directory holding <MODEL>/<MODEL_VERSION>.json files
    #[arg(long, value_name = "DIR")]
    pub schema_dir: Option<PathBuf>,
}

// ============================================================================
// Logging
// ============================================================================

/// Pick the log filter: flag, then `RUST_LOG`, then config, then `warn`
pub fn log_directive(flag: Option<&str>, env: Option<&str>, config: Option<&str>) -> String {
    [flag, env, config]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(DEFAULT_LOG_LEVEL)
        .to_string()
}

// ============================================================================
// Commands
// ============================================================================

/// Run a parsed command, writing primary output to `out`
pub fn run(cli: &Cli, config: &Config, out: &mut dyn Write) -> Result<()> {
    match &cli.command {
        Command::Ddl(args) => run_ddl(args, config, out),
        Command::Dialects => run_dialects(out),
        Command::Models(args) => run_models(args, config, out),
    }
}

fn run_ddl(args: &DdlArgs, config: &Config, out: &mut dyn Write) -> Result<()> {
    let service_version = args
        .service_version
        .clone()
        .or_else(|| config.service_version.clone())
        .unwrap_or_else(|| UNKNOWN_SERVICE_VERSION.to_string());

    let source: Box<dyn SchemaSource> = match (&args.schema, args.schema_dir.as_ref().or(config.schema_dir.as_ref())) {
        (Some(path), _) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read schema file {}", path.display()))?;
            let document = SchemaDocument::from_json(&json)
                .with_context(|| format!("failed to parse schema file {}", path.display()))?;
            Box::new(StaticSource::new(service_version).with_document(
                &args.model,
                &args.model_version,
                document,
            ))
        }
        (None, Some(dir)) => Box::new(FileSource::new(dir, service_version)),
        (None, None) => bail!(
            "no schema source: pass --schema or --schema-dir, or set schema_dir in the config file"
        ),
    };

    tracing::debug!(
        model = %args.model,
        version = %args.model_version,
        dialect = args.dialect.identifier(),
        "generating script"
    );

    let script = Generator::new(args.options())
        .generate(source.as_ref())
        .with_context(|| {
            format!(
                "failed to generate {} script for {} {}",
                args.dialect.display_name(),
                args.model,
                args.model_version
            )
        })?;

    for warning in &script.warnings {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
    }

    match args.output.as_ref().or(config.output.as_ref()) {
        Some(path) => {
            script
                .write_to_file(path)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprint!("{}", summarize(&script));
            eprintln!("{} {}", "Wrote".green().bold(), path.display());
        }
        None => out.write_all(script.text().as_bytes())?,
    }

    Ok(())
}

fn run_dialects(out: &mut dyn Write) -> Result<()> {
    for dialect in Dialect::all() {
        writeln!(out, "{:<12}{}", dialect.identifier(), dialect.display_name())?;
    }
    Ok(())
}

fn run_models(args: &ModelsArgs, config: &Config, out: &mut dyn Write) -> Result<()> {
    let Some(dir) = args.schema_dir.as_ref().or(config.schema_dir.as_ref()) else {
        bail!("no schema directory: pass --schema-dir or set schema_dir in the config file");
    };

    let service_version = config
        .service_version
        .clone()
        .unwrap_or_else(|| UNKNOWN_SERVICE_VERSION.to_string());
    let index = FileSource::new(dir, service_version)
        .model_index()
        .with_context(|| format!("failed to list models in {}", dir.display()))?;

    if index.models.is_empty() {
        writeln!(out, "No models found in {}", dir.display())?;
        return Ok(());
    }

    for model in &index.models {
        let versions: Vec<String> = model.versions.iter().map(version_label).collect();
        writeln!(
            out,
            "{} [{}]: {}",
            model.pretty.bold(),
            model.name,
            versions.join(", ")
        )?;
    }
    Ok(())
}

/// Version name with a colored badge for pre-releases
fn version_label(version: &ModelVersion) -> String {
    match version.release_level.label() {
        Some(label) => format!(
            "{} {}",
            version.name,
            format!("({})", label)
                .as_str()
                .color(version.release_level.color())
        ),
        None => version.name.clone(),
    }
}

// ============================================================================
// Tests
// ============================================================================
