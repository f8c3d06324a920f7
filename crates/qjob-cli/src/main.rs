//! qjob command-line interface.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::Context;
use clap::Parser;
use console::style;
use tracing_subscriber::EnvFilter;

use qjob_cli::commands::{ask, backends, config, run, validate};
use qjob_cli::{Cli, Commands};
use qjob_core::QjobConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let result = match QjobConfig::load(cli.config.as_deref()).context("Failed to load configuration")
    {
        Ok(cfg) => dispatch(&cfg, cli.command).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

async fn dispatch(cfg: &QjobConfig, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Validate { input } => validate::execute(&input),

        Commands::Run {
            input,
            backend,
            shots,
            jobs,
            output,
            keep_partial,
            credentials,
        } => {
            run::execute(
                cfg,
                run::RunArgs {
                    input: &input,
                    backend: backend.as_deref(),
                    shots,
                    jobs,
                    output: output.as_deref(),
                    keep_partial,
                    credentials: &credentials,
                },
            )
            .await
        }

        Commands::Ask {
            prompt,
            quick,
            apply,
            api_key,
        } => {
            ask::execute(
                cfg,
                prompt.as_deref(),
                quick,
                apply.as_deref(),
                api_key.as_deref(),
            )
            .await
        }

        Commands::Backends {
            status,
            credentials,
        } => backends::execute(cfg, status, &credentials).await,

        Commands::Config => config::execute(cfg),
    }
}
