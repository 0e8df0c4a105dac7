mod aggregate;
mod cli;
mod diagnostics;
mod error;
mod io;
mod pipeline;
mod report;
mod samples;

use anyhow::{Result, Context};
use clap::Parser;
use log::error;
use std::fs::OpenOptions;

use crate::cli::Cli;
use crate::pipeline::{Config, RunOutcome};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_path = cli.log_path();

    // Set up logging, appending to the diagnostics log
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;
    let mut builder = env_logger::Builder::new();
    builder.filter_level(log::LevelFilter::Warn);
    if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.parse_default_env();
    builder.target(env_logger::Target::Pipe(Box::new(log_file)));
    builder.init();

    let config = Config {
        workdir: cli.workdir,
        results_dir: cli.results_dir,
        report_stem: cli.report_stem,
        table_format: cli.table_format.into(),
    };

    match pipeline::run(&config) {
        Ok(RunOutcome::Completed(summary)) => {
            println!(
                "Success! {} of {} samples contributed records. Results saved to '{}'. Errors logged to '{}'.",
                summary.samples_with_records(),
                summary.samples_discovered,
                config.workdir.join(&config.results_dir).display(),
                log_path.display()
            );
        }
        Ok(RunOutcome::NoSamples) => {
            println!(
                "No sample directories found in '{}'. Nothing to do.",
                config.workdir.display()
            );
        }
        Err(e) => {
            error!("A fatal error occurred: {:#}", e);
            eprintln!("A fatal error occurred. Check '{}' for details.", log_path.display());
            std::process::exit(1);
        }
    }

    Ok(())
}
