//! Config command implementation.

use anyhow::Result;
use qjob_core::QjobConfig;

/// Print the effective configuration.
pub fn execute(config: &QjobConfig) -> Result<()> {
    print!("{}", config.to_yaml()?);
    Ok(())
}
