#![warn(missing_docs)]
//! Stressmark CLI
//!
//! CLI infrastructure for the two strategy binaries. Each binary calls
//! [`run`] with its fixed [`Strategy`]; everything else — argument
//! validation, config discovery, orchestration, reporting — is shared.
//!
//! ```text
//! stressmark-proc   <workload:{cpu,mem,io}> <count:1..100>   # one process per worker
//! stressmark-thread <workload:{cpu,mem,io}> <count:1..100>   # one thread per worker
//! ```
//!
//! The process strategy re-invokes the running binary with a hidden
//! `--stress-worker` flag; worker mode is handled before any other
//! initialization.

mod config;
mod orchestrator;
mod process;
mod report;
mod thread;

pub use config::{LaunchPolicy, OutputFormat, RunnerConfig, StressConfig};
pub use orchestrator::{
    BenchmarkResult, Orchestrator, OrchestratorError, Strategy, Termination, WorkerOutcome,
    MAX_WORKERS,
};
pub use report::{format_csv, format_duration, format_summary};

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use stressmark_core::{WorkerContext, WorkloadKind, WorkloadTuning};

/// Env var carrying serialized tuning from the orchestrator to process
/// workers, so CLI overrides reach them without re-parsing flags.
pub const TUNING_ENV: &str = "STRESSMARK_TUNING";

/// Stressmark CLI arguments, shared by both strategy binaries.
#[derive(Parser, Debug)]
#[command(author, version, about = "stressmark - process vs thread workload harness")]
pub struct Cli {
    /// Workload to run: cpu, mem, or io
    pub workload: String,

    /// Number of workers to launch (1-100)
    pub workers: u32,

    /// Output format: human or csv
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// Launch-failure policy: fail-fast or continue
    #[arg(long)]
    pub policy: Option<LaunchPolicy>,

    /// Directory for I/O workload scratch files
    #[arg(long)]
    pub scratch_dir: Option<PathBuf>,

    /// Use one shared scratch filename across workers (contention mode)
    #[arg(long)]
    pub shared_scratch: bool,

    /// Path to a stress.toml (default: discovered by walking up)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Verbose diagnostics
    #[arg(short, long)]
    pub verbose: bool,

    /// Internal: run as a single worker (used by the process strategy)
    #[arg(long, hide = true)]
    pub stress_worker: bool,

    /// Internal: ordinal of this worker
    #[arg(long, hide = true, default_value = "0")]
    pub worker_ordinal: u32,
}

/// Run the stressmark CLI under the given strategy.
///
/// This is the entry point both strategy binaries call from `main`.
pub fn run(strategy: Strategy) -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(strategy, cli)
}

/// Run the stressmark CLI with pre-parsed arguments.
pub fn run_with_cli(strategy: Strategy, cli: Cli) -> anyhow::Result<()> {
    let kind: WorkloadKind = cli.workload.parse()?;

    // Worker mode first, before any other initialization.
    if cli.stress_worker {
        return run_worker_mode(kind, cli.worker_ordinal);
    }

    let filter = if cli.verbose {
        "stressmark=debug"
    } else {
        "stressmark=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => StressConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => StressConfig::discover().unwrap_or_default(),
    };
    if let Some(policy) = cli.policy {
        config.runner.policy = policy;
    }
    if let Some(dir) = &cli.scratch_dir {
        config.workload.scratch_dir = dir.clone();
    }
    if cli.shared_scratch {
        config.workload.shared_scratch = true;
    }
    // Resolved before the run starts; a bad --format already failed at
    // argument parsing, and a bad config value fails here, so a typo can
    // never discard a completed benchmark.
    let format = cli.format.unwrap_or(config.runner.format);

    let orchestrator = Orchestrator::new(strategy, config.runner.policy, config.workload);
    let result = orchestrator.run(kind, cli.workers)?;

    match format {
        OutputFormat::Csv => print!("{}", format_csv(strategy, kind, &result)),
        OutputFormat::Human => print!("{}", format_summary(strategy, kind, &result)),
    }

    // Worker failures were reported above; only orchestration-level
    // failures change the overall exit status.
    Ok(())
}

/// Worker-mode entry: run one generator instance and exit.
///
/// Tuning arrives through [`TUNING_ENV`]; a missing variable falls back to
/// config discovery so a worker started by hand still behaves sensibly.
fn run_worker_mode(kind: WorkloadKind, ordinal: u32) -> anyhow::Result<()> {
    let tuning: WorkloadTuning = match std::env::var(TUNING_ENV) {
        Ok(raw) => toml::from_str(&raw).context("invalid tuning in STRESSMARK_TUNING")?,
        Err(_) => StressConfig::discover().unwrap_or_default().workload,
    };

    let ctx = WorkerContext { ordinal, kind };
    println!(
        "[worker {}] pid {} started ({})",
        ordinal,
        std::process::id(),
        kind
    );
    stressmark_core::execute(&ctx, &tuning)
        .with_context(|| format!("worker {ordinal} workload failed"))?;
    println!("[worker {}] pid {} completed", ordinal, std::process::id());
    Ok(())
}
