//! Validate command implementation.

use std::path::Path;

use anyhow::Result;
use console::style;

use super::common::read_circuit;

/// Execute the validate command.
pub fn execute(input: &Path) -> Result<()> {
    let source = read_circuit(input)?;
    let validation = qjob_core::validate(&source);
    if !validation.ok {
        anyhow::bail!("Invalid QASM: {}", validation.detail);
    }

    println!(
        "{} Valid QASM: {}",
        style("✓").green().bold(),
        validation.detail
    );
    Ok(())
}
