//! CLI argument parsing and helper tests.

use std::path::Path;

use clap::Parser;
use qjob_assistant::QuickAction;
use qjob_cli::cli::QuantumArgs;
use qjob_cli::commands::{common, run, validate};
use qjob_cli::{Cli, Commands};
use qjob_core::{DEFAULT_QASM, QjobConfig};

// ============================================================================
// Argument parsing
// ============================================================================

#[test]
fn test_parse_validate() {
    let cli = Cli::try_parse_from(["qjob", "validate", "-i", "bell.qasm"]).unwrap();
    match cli.command {
        Commands::Validate { input } => assert_eq!(input, Path::new("bell.qasm")),
        _ => panic!("Expected Validate command"),
    }
}

#[test]
fn test_parse_validate_requires_input() {
    assert!(Cli::try_parse_from(["qjob", "validate"]).is_err());
}

#[test]
fn test_parse_run_full() {
    let cli = Cli::try_parse_from([
        "qjob",
        "run",
        "-i",
        "x.qasm",
        "-b",
        "ibm_lagos",
        "-s",
        "2048",
        "-n",
        "5",
        "-o",
        "out.csv",
        "--keep-partial",
        "--token",
        "abc",
    ])
    .unwrap();
    match cli.command {
        Commands::Run {
            input,
            backend,
            shots,
            jobs,
            output,
            keep_partial,
            credentials,
        } => {
            assert_eq!(input, Path::new("x.qasm"));
            assert_eq!(backend.as_deref(), Some("ibm_lagos"));
            assert_eq!(shots, Some(2048));
            assert_eq!(jobs, Some(5));
            assert_eq!(output.as_deref(), Some(Path::new("out.csv")));
            assert!(keep_partial);
            assert_eq!(credentials.token.as_deref(), Some("abc"));
        }
        _ => panic!("Expected Run command"),
    }
}

#[test]
fn test_parse_run_minimal() {
    let cli = Cli::try_parse_from(["qjob", "run", "-i", "x.qasm"]).unwrap();
    match cli.command {
        Commands::Run {
            backend,
            shots,
            jobs,
            keep_partial,
            ..
        } => {
            assert!(backend.is_none());
            assert!(shots.is_none());
            assert!(jobs.is_none());
            assert!(!keep_partial);
        }
        _ => panic!("Expected Run command"),
    }
}

#[test]
fn test_parse_ask_prompt() {
    let cli = Cli::try_parse_from(["qjob", "ask", "make a GHZ state"]).unwrap();
    match cli.command {
        Commands::Ask { prompt, quick, .. } => {
            assert_eq!(prompt.as_deref(), Some("make a GHZ state"));
            assert!(quick.is_none());
        }
        _ => panic!("Expected Ask command"),
    }
}

#[test]
fn test_parse_ask_quick_with_apply() {
    let cli = Cli::try_parse_from(["qjob", "ask", "--quick", "bell_state", "--apply", "bell.qasm"])
        .unwrap();
    match cli.command {
        Commands::Ask { prompt, quick, apply, .. } => {
            assert!(prompt.is_none());
            assert_eq!(quick, Some(QuickAction::BellState));
            assert_eq!(apply.as_deref(), Some(Path::new("bell.qasm")));
        }
        _ => panic!("Expected Ask command"),
    }
}

#[test]
fn test_parse_ask_rejects_unknown_quick_action() {
    assert!(Cli::try_parse_from(["qjob", "ask", "--quick", "teleport"]).is_err());
}

#[test]
fn test_parse_ask_needs_prompt_or_quick() {
    assert!(Cli::try_parse_from(["qjob", "ask"]).is_err());
    assert!(Cli::try_parse_from(["qjob", "ask", "hi", "--quick", "bell_state"]).is_err());
}

#[test]
fn test_parse_backends_and_config() {
    let cli = Cli::try_parse_from(["qjob", "backends", "--status"]).unwrap();
    assert!(matches!(cli.command, Commands::Backends { status: true, .. }));

    let cli = Cli::try_parse_from(["qjob", "--config", "q.yaml", "config"]).unwrap();
    assert!(matches!(cli.command, Commands::Config));
    assert_eq!(cli.config.as_deref(), Some(Path::new("q.yaml")));
}

#[test]
fn test_parse_verbosity() {
    let cli = Cli::try_parse_from(["qjob", "-vv", "config"]).unwrap();
    assert_eq!(cli.verbose, 2);
    let cli = Cli::try_parse_from(["qjob", "config", "-v"]).unwrap();
    assert_eq!(cli.verbose, 1);
}

#[test]
fn test_parse_no_subcommand_fails() {
    assert!(Cli::try_parse_from(["qjob"]).is_err());
}

// ============================================================================
// Helpers
// ============================================================================

fn quantum_args(token: Option<&str>) -> QuantumArgs {
    QuantumArgs {
        token: token.map(String::from),
        instance: None,
    }
}

#[test]
fn test_credentials_require_token() {
    let err = common::credentials(&quantum_args(Some("   "))).err().unwrap();
    assert!(err.to_string().contains("IBM Quantum API token"));
    assert!(common::credentials(&quantum_args(None)).is_err());

    let creds = common::credentials(&quantum_args(Some(" tok "))).unwrap();
    assert_eq!(creds.token, "tok");
}

#[test]
fn test_read_circuit_missing_file() {
    let err = common::read_circuit(Path::new("/definitely/not/here.qasm")).unwrap_err();
    assert!(err.to_string().contains("File not found"));
}

#[test]
fn test_validate_command() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.qasm");
    std::fs::write(&good, DEFAULT_QASM).unwrap();
    assert!(validate::execute(&good).is_ok());

    let bad = dir.path().join("bad.qasm");
    std::fs::write(&bad, "qreg q[1];").unwrap();
    let err = validate::execute(&bad).unwrap_err();
    assert!(err.to_string().starts_with("Invalid QASM"));
}

#[test]
fn test_run_request_uses_config_defaults_and_bounds() {
    let config = QjobConfig::default();
    let creds = quantum_args(Some("tok"));
    let mut args = run::RunArgs {
        input: Path::new("x.qasm"),
        backend: None,
        shots: None,
        jobs: None,
        output: None,
        keep_partial: false,
        credentials: &creds,
    };

    let request = run::request(&config, &args, DEFAULT_QASM.to_string()).unwrap();
    assert_eq!(request.backend, "ibm_brisbane");
    assert_eq!(request.shots, 1024);
    assert_eq!(request.job_count, 10);

    args.shots = Some(20_000);
    let err = run::request(&config, &args, DEFAULT_QASM.to_string()).unwrap_err();
    assert!(err.to_string().contains("shots"));

    args.shots = None;
    args.backend = Some("ibm_torino");
    assert!(run::request(&config, &args, DEFAULT_QASM.to_string()).is_err());
}

#[test]
fn test_write_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    let results = vec![qjob_core::JobResult {
        job_id: "job-a".into(),
        index: 0,
        label: "quantum_circuit".into(),
        count0: 4,
        count1: 96,
        shots: 100,
        timestamp: chrono::Local::now(),
    }];
    common::write_csv(&path, &results).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("job_id,idx,circ_name,bit1,count1,bit0,count0,shots,timestamp\n"));
    assert!(text.contains("job-a,0,quantum_circuit,1,96,0,4,100,"));
}
