//! minnow CLI
//!
//! Executes a SQL script and writes the rendered SELECT results.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{warn, Level};
use tracing_subscriber::FmtSubscriber;

use minnow_core::csv;
use minnow_core::{DiskStorage, Interpreter};

/// A minimal SQL engine over CSV-backed databases.
#[derive(Parser)]
#[command(name = "minnow")]
#[command(version, about, long_about = None)]
struct Cli {
    /// SQL script to execute.
    input: PathBuf,

    /// File receiving the rendered SELECT results.
    output: PathBuf,

    /// Directory holding the database catalog.
    #[arg(long, default_value = "dbs")]
    data_dir: PathBuf,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let script = fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;

    let mut interpreter = Interpreter::new(DiskStorage::new(&cli.data_dir));
    let result = interpreter.execute(&script);

    // SELECT results produced before any failure are still written out.
    let rendered = csv::render_results(interpreter.outputs());
    fs::write(&cli.output, rendered)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;

    match interpreter.close() {
        Ok(()) => {}
        Err(error) if result.is_ok() => return Err(error.into()),
        Err(error) => warn!(%error, "failed to flush current database"),
    }

    result?;
    Ok(())
}
