//! Run command implementation.

use std::path::Path;

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use qjob_core::{BatchProgress, ExecutionRequest, FailurePolicy, QjobConfig, Services};

use super::common::{credentials, print_results, read_circuit, write_csv};
use crate::cli::QuantumArgs;

/// Batch parameters from the command line; `None` falls back to configuration.
pub struct RunArgs<'a> {
    pub input: &'a Path,
    pub backend: Option<&'a str>,
    pub shots: Option<u32>,
    pub jobs: Option<u32>,
    pub output: Option<&'a Path>,
    pub keep_partial: bool,
    pub credentials: &'a QuantumArgs,
}

/// Build the request, checking it against the configured bounds.
pub fn request(config: &QjobConfig, args: &RunArgs<'_>, circuit: String) -> Result<ExecutionRequest> {
    let exec = &config.execution;
    let request = ExecutionRequest {
        circuit,
        backend: args.backend.unwrap_or(exec.default_backend()).to_string(),
        shots: args.shots.unwrap_or(exec.default_shots),
        job_count: args.jobs.unwrap_or(exec.default_job_count),
    };
    exec.check_request(&request).map_err(anyhow::Error::msg)?;
    Ok(request)
}

/// Execute the run command.
pub async fn execute(config: &QjobConfig, args: RunArgs<'_>) -> Result<()> {
    let source = read_circuit(args.input)?;
    let validation = qjob_core::validate(&source);
    if !validation.ok {
        anyhow::bail!("Invalid QASM: {}", validation.detail);
    }
    let credentials = credentials(args.credentials)?;
    let request = request(config, &args, source)?;

    println!(
        "{} Running {} on {} ({} jobs x {} shots)",
        style("→").cyan().bold(),
        style(args.input.display()).green(),
        style(&request.backend).yellow(),
        request.job_count,
        request.shots
    );
    println!("  {}", validation.detail);

    let services = Services::from_config(config);
    let mut options = services.batch_options();
    if args.keep_partial {
        options.policy = FailurePolicy::KeepPartial;
    }

    let bar = ProgressBar::new(u64::from(request.job_count));
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );
    bar.enable_steady_tick(std::time::Duration::from_millis(100));
    bar.set_message("connecting...");

    let observer = |p: BatchProgress<'_>| {
        bar.set_position(u64::from(p.completed()));
        bar.set_message(format!("job {} done", p.job_id));
    };
    let outcome = services
        .run_batch(&request, &credentials, &options, &observer)
        .await;
    bar.finish_and_clear();

    if !outcome.results.is_empty() {
        print_results(&outcome.results);
        if let Some(path) = args.output {
            write_csv(path, &outcome.results)?;
            println!(
                "\n{} Saved {} records to {}",
                style("✓").green().bold(),
                outcome.results.len(),
                style(path.display()).green()
            );
        }
    }

    match outcome.error() {
        None => {
            println!(
                "\n{} Successfully completed {} jobs!",
                style("✓").green().bold(),
                outcome.results.len()
            );
            Ok(())
        }
        Some(message) => anyhow::bail!("Execution failed: {message}"),
    }
}
