//! Configuration loading from stress.toml
//!
//! Configuration can be specified in a `stress.toml` file, discovered by
//! walking up from the current directory. CLI flags override whatever the
//! file provides.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use stressmark_core::WorkloadTuning;

/// Top-level stressmark configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StressConfig {
    /// Orchestrator configuration.
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Workload tuning constants.
    #[serde(default)]
    pub workload: WorkloadTuning,
}

/// What to do when a worker fails to launch.
///
/// The wait/join phase is always tolerant; this policy only governs the
/// launch phase, making the launch/wait asymmetry explicit and testable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LaunchPolicy {
    /// A single launch failure aborts the whole run (default).
    #[default]
    FailFast,
    /// Record a launch failure as that worker's outcome and keep going.
    Continue,
}

impl FromStr for LaunchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fail-fast" => Ok(LaunchPolicy::FailFast),
            "continue" => Ok(LaunchPolicy::Continue),
            other => Err(format!(
                "unknown launch policy {other:?} (expected fail-fast or continue)"
            )),
        }
    }
}

/// Result output shape.
///
/// Resolved before the orchestrator is built so an unknown format fails
/// fast instead of discarding a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Per-worker summary lines for a human reader (default).
    #[default]
    Human,
    /// One CSV row for the wrapping measurement scripts.
    Csv,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "human" => Ok(OutputFormat::Human),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!(
                "unknown output format {other:?} (expected human or csv)"
            )),
        }
    }
}

/// Orchestrator configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RunnerConfig {
    /// Launch-failure policy: "fail-fast" or "continue".
    #[serde(default)]
    pub policy: LaunchPolicy,
    /// Default output format: "human" or "csv".
    #[serde(default)]
    pub format: OutputFormat,
}

impl StressConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from the
    /// current directory.
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join("stress.toml");
            if config_path.exists() {
                return Self::load(&config_path).ok();
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Generate a default configuration as a TOML string.
    pub fn default_toml() -> String {
        r#"# Stressmark Configuration

[runner]
# Launch-failure policy: "fail-fast" or "continue"
policy = "fail-fast"
# Default output format: human or csv
format = "human"

[workload]
# CPU workload: outer iterations x Leibniz terms per iteration
cpu_outer_iters = 1000
cpu_inner_terms = 1000000
# Memory workload: region size and write/read passes
mem_region_bytes = 209715200
mem_outer_iters = 1000
# I/O workload: write/sync/read cycles, payload and buffer sizes
io_outer_iters = 10
io_payload_bytes = 10485760
io_buffer_bytes = 4096
# Directory for scratch files
scratch_dir = "."
# One shared scratch filename across workers (contention mode)
shared_scratch = false
"#
        .to_string()
    }
}
