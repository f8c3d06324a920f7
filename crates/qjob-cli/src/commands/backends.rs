//! Backends command implementation.

use anyhow::Result;
use console::style;
use qjob_core::{QjobConfig, Services};

use super::common::credentials;
use crate::cli::QuantumArgs;

/// Execute the backends command.
pub async fn execute(config: &QjobConfig, status: bool, creds: &QuantumArgs) -> Result<()> {
    let exec = &config.execution;
    println!("{} Configured backends:\n", style("qjob").cyan().bold());

    if !status {
        for name in &exec.backends {
            let marker = if name == exec.default_backend() {
                " (default)"
            } else {
                ""
            };
            println!("  {} {}{}", style("●").dim(), style(name).bold(), marker);
        }
        return Ok(());
    }

    let credentials = credentials(creds)?;
    let services = Services::from_config(config);
    for name in &exec.backends {
        match services.backend_status(&credentials, name).await {
            Ok(availability) => {
                let dot = if availability.is_available {
                    style("●").green()
                } else {
                    style("○").yellow()
                };
                println!("  {} {:<14} {}", dot, style(name).bold(), availability);
            }
            Err(e) => {
                tracing::debug!(backend = %name, "status query failed: {e}");
                println!("  {} {:<14} Error: {}", style("○").red(), style(name).bold(), e);
            }
        }
    }
    Ok(())
}
