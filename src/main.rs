//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `tabcopy` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - User-facing output formatting
//!
//! All export functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use tabcopy::cli::{init_logger, Cli};
use tabcopy::{open_source_pool, run_session, SessionReport};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logger(cli.log_level.clone().into()).context("Failed to initialize logger")?;

    match run(&cli).await {
        Ok(report) => {
            println!(
                "Exported {} table{} ({} rows, {} failed) in {:.1}s",
                report.tables_exported,
                if report.tables_exported == 1 { "" } else { "s" },
                report.total_rows,
                report.tables_failed,
                report.elapsed_seconds
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("tabcopy error: {e:#}");
            process::exit(1);
        }
    }
}

async fn run(cli: &Cli) -> Result<SessionReport> {
    let specs = cli.table_specs()?;

    let pool = open_source_pool(&cli.db).await?;

    let sink = cli
        .open_sink()
        .context("Failed to open the output destination")?;
    let mut writer = cli.make_writer(sink)?;

    let report = run_session(&pool, &specs, writer.as_mut()).await?;
    Ok(report)
}
