//! Ask command implementation.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use qjob_assistant::QuickAction;
use qjob_core::{QjobConfig, Services};

/// Execute the ask command.
pub async fn execute(
    config: &QjobConfig,
    prompt: Option<&str>,
    quick: Option<QuickAction>,
    apply: Option<&Path>,
    api_key: Option<&str>,
) -> Result<()> {
    let api_key = api_key.unwrap_or_default();
    let services = Services::from_config(config);

    let reply = match (quick, prompt) {
        (Some(action), _) => {
            println!("{} {}", style("→").cyan().bold(), action.prompt());
            services.quick_action(action, api_key).await?
        }
        (None, Some(prompt)) => services.ask(prompt, api_key).await?,
        (None, None) => anyhow::bail!("Provide a prompt or --quick"),
    };

    println!("\n{reply}");

    if let Some(path) = apply {
        let circuit = services
            .assistant()
            .extract_circuit(&reply)
            .ok_or_else(|| anyhow::anyhow!("No OpenQASM circuit found in the reply"))?;
        let validation = qjob_core::validate(&circuit);
        fs::write(path, format!("{circuit}\n"))
            .with_context(|| format!("Failed to write {}", path.display()))?;

        let mark = if validation.ok {
            style("✓").green().bold()
        } else {
            style("!").yellow().bold()
        };
        println!(
            "\n{} Wrote circuit to {} ({})",
            mark,
            style(path.display()).green(),
            validation.detail
        );
    }

    Ok(())
}
