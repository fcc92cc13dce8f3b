//! Check the assumption feed against the parameters without running the engine
//!
//! Exits with status 1 when any check fails.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use ifrs17_gmm::{load_assumptions, load_parameters, validate};

#[derive(Debug, Parser)]
#[command(name = "validate_inputs", about = "Plausibility checks for the GMM input feeds")]
struct Cli {
    #[arg(long)]
    assumptions: PathBuf,

    #[arg(long)]
    parameters: PathBuf,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<ExitCode> {
    env_logger::init();
    let cli = Cli::parse();

    let parameters = load_parameters(&cli.parameters)
        .with_context(|| format!("failed to load parameters from {}", cli.parameters.display()))?;
    let loaded = load_assumptions(&cli.assumptions)
        .with_context(|| format!("failed to load assumptions from {}", cli.assumptions.display()))?;

    let report = validate(&loaded, &parameters);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{:<48} {:<8} Detail", "Check", "Status");
        println!("{}", "-".repeat(96));
        for finding in &report.findings {
            let status = if finding.passed { "ok" } else { "FAIL" };
            println!("{:<48} {:<8} {}", finding.check, status, finding.detail);
        }
    }

    Ok(if report.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
