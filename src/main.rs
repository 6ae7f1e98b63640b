//! ddlgen
//!
//! Multi-dialect DDL generator for JSON-described data models.
//!
//! This is the main entry point for the command-line tool. SQL goes to
//! stdout (or the requested file); logs, warnings and errors go to stderr.

use clap::Parser;
use colored::Colorize;
use ddlgen_cli::{Cli, Config, log_directive, run};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = try_main(&cli) {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn try_main(cli: &Cli) -> anyhow::Result<()> {
    let config = Config::load_optional(cli.config.as_deref())?;

    // Initialize logging
    let env = std::env::var("RUST_LOG").ok();
    let directive = log_directive(
        cli.log.as_deref(),
        env.as_deref(),
        config.log_level.as_deref(),
    );
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(filter = %directive, "logging initialised");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(cli, &config, &mut out)
}
