//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use qjob_core::{Credentials, JobResult, TIMESTAMP_FORMAT, summarize, to_csv};

use crate::cli::QuantumArgs;

/// Read circuit source from a file.
pub fn read_circuit(path: &Path) -> Result<String> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Credentials from flags or environment, or an error when the token is missing.
pub fn credentials(args: &QuantumArgs) -> Result<Credentials> {
    let token = args
        .token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Please provide IBM Quantum API token (--token or IBM_QUANTUM_TOKEN)"
            )
        })?;
    let credentials = Credentials::new(token);
    Ok(match args.instance.as_deref() {
        Some(instance) => credentials.with_instance(instance),
        None => credentials,
    })
}

/// Write results as CSV.
pub fn write_csv(path: &Path, results: &[JobResult]) -> Result<()> {
    let csv = to_csv(results)?;
    fs::write(path, csv).with_context(|| format!("Failed to write {}", path.display()))
}

/// Print a results table followed by the totals.
pub fn print_results(results: &[JobResult]) {
    println!(
        "\n  {:<28} {:>4} {:>8} {:>8} {:>7}  {}",
        style("job_id").bold(),
        style("idx").bold(),
        style("count1").bold(),
        style("count0").bold(),
        style("shots").bold(),
        style("timestamp").bold()
    );
    for r in results {
        println!(
            "  {:<28} {:>4} {:>8} {:>8} {:>7}  {}",
            style(&r.job_id).cyan(),
            r.index,
            r.count1,
            r.count0,
            r.shots,
            r.timestamp.format(TIMESTAMP_FORMAT)
        );
    }

    let summary = summarize(results);
    println!(
        "\n  Total shots: {}   Total 1s: {}   Success rate: {}",
        style(summary.total_shots).yellow(),
        style(summary.total_ones).yellow(),
        style(format!("{:.2}%", summary.success_rate_percent)).green().bold()
    );
}
