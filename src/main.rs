//! IFRS 17 GMM command-line runner
//!
//! Loads the assumption and parameter feeds, checks the inputs, runs the engine and
//! writes the reconciliation and analysis tables.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use ifrs17_gmm::{load_assumptions, load_parameters, validate, EngineConfig, GmmEngine};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "ifrs17", about = "Run the IFRS 17 General Measurement Model")]
struct Cli {
    /// Assumption feed (CSV)
    #[arg(long)]
    assumptions: PathBuf,

    /// Parameter feed (CSV with a `Selection` column)
    #[arg(long)]
    parameters: PathBuf,

    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Evaluate groups one at a time instead of on the thread pool
    #[arg(long)]
    sequential: bool,

    #[arg(long)]
    skip_validation: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let start = Instant::now();

    let parameters = load_parameters(&cli.parameters)
        .with_context(|| format!("failed to load parameters from {}", cli.parameters.display()))?;
    let loaded = load_assumptions(&cli.assumptions)
        .with_context(|| format!("failed to load assumptions from {}", cli.assumptions.display()))?;
    println!(
        "Loaded {} assumption rows ({} blank amounts) in {:?}",
        loaded.rows.len(),
        loaded.missing_values,
        start.elapsed()
    );

    if !cli.skip_validation {
        let report = validate(&loaded, &parameters);
        report.log();
        let failures = report.failures().count();
        if failures > 0 {
            println!("Input checks: {failures} failed (see log), continuing");
        }
    }

    let config = if cli.sequential {
        EngineConfig::sequential()
    } else {
        EngineConfig::default()
    };
    let results = GmmEngine::new(parameters, config)
        .run(&loaded.rows)
        .context("GMM run failed")?;

    match cli.format {
        OutputFormat::Csv => {
            let written = results
                .write_csv(&cli.output_dir)
                .with_context(|| format!("failed to write tables to {}", cli.output_dir.display()))?;
            for path in written {
                println!("  {}", path.display());
            }
        }
        OutputFormat::Json => {
            let path = results
                .write_json(&cli.output_dir)
                .with_context(|| format!("failed to write results to {}", cli.output_dir.display()))?;
            println!("  {}", path.display());
        }
    }

    println!("Done in {:?}", start.elapsed());
    Ok(())
}
