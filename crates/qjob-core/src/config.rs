//! Configuration.
//!
//! Sources, lowest precedence first:
//! 1. Built-in defaults
//! 2. A YAML file: the explicit path, else `$QJOB_CONFIG`, else
//!    `~/.qjob/config.yaml` when it exists
//! 3. Environment overrides (`QJOB_BIND`)
//!
//! Credentials are never part of the configuration.

use std::fmt;
use std::net::SocketAddr;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use qjob_assistant::AssistantSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::batch::{ExecutionRequest, FailurePolicy};

/// Environment variable naming a configuration file.
pub const CONFIG_ENV: &str = "QJOB_CONFIG";

/// Environment variable overriding the dashboard bind address.
pub const BIND_ENV: &str = "QJOB_BIND";

/// Circuit loaded into a fresh session.
pub const DEFAULT_QASM: &str = "OPENQASM 2.0;
include \"qelib1.inc\";
qreg q[1];
creg c[1];
x q[0];
measure q[0] -> c[0];";

/// Backends offered by the operator surface.
pub const DEFAULT_BACKENDS: [&str; 4] = ["ibm_brisbane", "ibm_lagos", "ibm_perth", "ibm_kyoto"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Inclusive bounds for a numeric input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: u32,
    pub max: u32,
}

impl Bounds {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: u32) -> bool {
        self.range().contains(&value)
    }

    pub fn range(&self) -> RangeInclusive<u32> {
        self.min..=self.max
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.min, self.max)
    }
}

/// Complete configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QjobConfig {
    pub execution: ExecutionConfig,
    pub assistant: AssistantSettings,
    pub dashboard: DashboardConfig,
}

/// Batch defaults and input bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    pub default_qasm: String,
    pub default_shots: u32,
    pub default_job_count: u32,
    pub shots_range: Bounds,
    pub job_count_range: Bounds,
    pub backends: Vec<String>,
    /// Name recorded in every result row.
    pub circuit_label: String,
    pub failure_policy: FailurePolicy,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            default_qasm: DEFAULT_QASM.to_string(),
            default_shots: 1024,
            default_job_count: 10,
            shots_range: Bounds::new(100, 10_000),
            job_count_range: Bounds::new(1, 50),
            backends: DEFAULT_BACKENDS.iter().map(ToString::to_string).collect(),
            circuit_label: "quantum_circuit".to_string(),
            failure_policy: FailurePolicy::Abort,
        }
    }
}

impl ExecutionConfig {
    pub fn default_backend(&self) -> &str {
        self.backends.first().map_or("", String::as_str)
    }

    pub fn has_backend(&self, name: &str) -> bool {
        self.backends.iter().any(|b| b == name)
    }

    /// Reject requests outside the configured bounds or backend list.
    pub fn check_request(&self, request: &ExecutionRequest) -> Result<(), String> {
        if !self.has_backend(&request.backend) {
            return Err(format!(
                "unknown backend '{}', expected one of: {}",
                request.backend,
                self.backends.join(", ")
            ));
        }
        if !self.shots_range.contains(request.shots) {
            return Err(format!(
                "shots must be in {}, got {}",
                self.shots_range, request.shots
            ));
        }
        if !self.job_count_range.contains(request.job_count) {
            return Err(format!(
                "job count must be in {}, got {}",
                self.job_count_range, request.job_count
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub bind_address: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
        }
    }
}

impl QjobConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml(source: &str) -> Result<Self, ConfigError> {
        let config: QjobConfig =
            serde_yaml_ng::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents)
    }

    /// Load from the first configuration source found, then apply
    /// environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(explicit, |key| std::env::var(key).ok())
    }

    /// [`QjobConfig::load`] with a custom environment lookup.
    pub fn load_with(
        explicit: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let source = explicit
            .map(Path::to_path_buf)
            .or_else(|| env(CONFIG_ENV).map(PathBuf::from))
            .or_else(|| default_path().filter(|p| p.is_file()));

        let config = match source {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading configuration");
                Self::from_file(&path)?
            }
            None => Self::default(),
        };

        let config = config.merge_env(env);
        config.validate()?;
        Ok(config)
    }

    fn merge_env(mut self, env: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(bind) = env(BIND_ENV) {
            self.dashboard.bind_address = bind;
        }
        self
    }

    /// Check bounds, defaults and addresses.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let exec = &self.execution;
        for (name, bounds) in [
            ("shots_range", exec.shots_range),
            ("job_count_range", exec.job_count_range),
        ] {
            if bounds.min == 0 || bounds.min > bounds.max {
                return Err(ConfigError::Validation(format!(
                    "{name} must be a non-empty range starting above zero, got {bounds}"
                )));
            }
        }
        if !exec.shots_range.contains(exec.default_shots) {
            return Err(ConfigError::Validation(format!(
                "default_shots {} outside {}",
                exec.default_shots, exec.shots_range
            )));
        }
        if !exec.job_count_range.contains(exec.default_job_count) {
            return Err(ConfigError::Validation(format!(
                "default_job_count {} outside {}",
                exec.default_job_count, exec.job_count_range
            )));
        }
        if exec.backends.is_empty() {
            return Err(ConfigError::Validation(
                "at least one backend must be listed".into(),
            ));
        }
        if exec.circuit_label.trim().is_empty() {
            return Err(ConfigError::Validation("circuit_label must not be empty".into()));
        }
        if self.assistant.extract.header_token.is_empty() {
            return Err(ConfigError::Validation(
                "assistant.extract.header_token must not be empty".into(),
            ));
        }
        self.bind_address()?;
        Ok(())
    }

    pub fn bind_address(&self) -> Result<SocketAddr, ConfigError> {
        self.dashboard.bind_address.parse().map_err(|_| {
            ConfigError::Validation(format!(
                "invalid bind address: {}",
                self.dashboard.bind_address
            ))
        })
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml_ng::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// `~/.qjob/config.yaml`.
pub fn default_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".qjob").join("config.yaml"))
}
