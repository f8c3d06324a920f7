//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use qjob_assistant::QuickAction;

/// qjob - batch runs of OpenQASM circuits on IBM Quantum
#[derive(Parser)]
#[command(name = "qjob")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (defaults to $QJOB_CONFIG, then ~/.qjob/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check that a file holds a valid OpenQASM 2.0 circuit
    Validate {
        /// Input file (OpenQASM 2.0)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Run a circuit as a batch of jobs
    Run {
        /// Input file (OpenQASM 2.0)
        #[arg(short, long)]
        input: PathBuf,

        /// Backend to use (defaults to the first configured backend)
        #[arg(short, long)]
        backend: Option<String>,

        /// Shots per job
        #[arg(short, long)]
        shots: Option<u32>,

        /// Number of jobs
        #[arg(short = 'n', long = "jobs")]
        jobs: Option<u32>,

        /// Write the results to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keep the jobs that completed before a failure
        #[arg(long)]
        keep_partial: bool,

        #[command(flatten)]
        credentials: QuantumArgs,
    },

    /// Ask the circuit assistant
    Ask {
        /// Free-text prompt
        #[arg(required_unless_present = "quick", conflicts_with = "quick")]
        prompt: Option<String>,

        /// Send a canned prompt instead (bell_state, random_circuit)
        #[arg(long, value_parser = parse_quick_action)]
        quick: Option<QuickAction>,

        /// Write the circuit found in the reply to this file
        #[arg(long)]
        apply: Option<PathBuf>,

        /// Groq API key
        #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },

    /// List configured backends
    Backends {
        /// Query each backend's remote status
        #[arg(long)]
        status: bool,

        #[command(flatten)]
        credentials: QuantumArgs,
    },

    /// Print the effective configuration as YAML
    Config,
}

/// IBM Quantum credentials.
#[derive(Clone, clap::Args)]
pub struct QuantumArgs {
    /// IBM Cloud API key (or a legacy IBM Quantum token with a hub/group/project --instance)
    #[arg(long, env = "IBM_QUANTUM_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// IBM Cloud service CRN, looked up from the API key when omitted
    #[arg(long, env = "IBM_SERVICE_CRN")]
    pub instance: Option<String>,
}

fn parse_quick_action(s: &str) -> Result<QuickAction, String> {
    s.parse().map_err(|e: qjob_assistant::AssistantError| e.to_string())
}
