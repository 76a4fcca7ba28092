//! Worker orchestration
//!
//! Fans out N concurrent workers under one of two isolation strategies and
//! fans back in to a single aggregated result. The orchestrator's only
//! blocking operations are sequential waits/joins in launch order, so the
//! *apparent* completion order is the launch order while actual execution
//! overlaps freely. It does not return until every successfully launched
//! worker has been waited on (or its wait failure logged).
//!
//! There is no internal timeout or cancellation; a hung run is the business
//! of an external timeout wrapper.

use crate::config::LaunchPolicy;
use crate::{process, thread};
use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};
use stressmark_core::{WorkloadKind, WorkloadTuning};
use thiserror::Error;

/// Upper bound on the worker count. At 100 workers the memory workload
/// alone would pin 20 GiB, so this is a deliberate sanity ceiling.
pub const MAX_WORKERS: u32 = 100;

/// Isolation model used to run a batch of workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// One OS process per worker, each with its own address space.
    Process,
    /// One thread per worker, sharing this process's heap.
    Thread,
}

impl Strategy {
    /// Short name used in progress lines and CSV output.
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Process => "process",
            Strategy::Thread => "thread",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that abort a run before or during the launch phase.
///
/// Worker-internal resource failures are *not* here: those are local to
/// one worker and surface as a non-success [`WorkerOutcome`] instead.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Worker count outside 1..=[`MAX_WORKERS`]; nothing was launched.
    #[error("worker count {0} out of range (1-{MAX_WORKERS})")]
    InvalidWorkerCount(u32),

    /// Tuning rejected before launch; nothing was launched.
    #[error("invalid workload tuning: {0}")]
    InvalidTuning(String),

    /// The current executable path could not be determined (process strategy).
    #[error("failed to locate worker binary: {0}")]
    WorkerBinary(#[source] std::io::Error),

    /// A worker failed to launch under [`LaunchPolicy::FailFast`].
    #[error("failed to launch worker {ordinal}: {source}")]
    LaunchFailed {
        /// Ordinal of the worker that failed to launch.
        ordinal: u32,
        /// Underlying spawn error.
        #[source]
        source: std::io::Error,
    },
}

/// Launch request for one worker, owned by the orchestrator.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WorkerSpec {
    pub ordinal: u32,
    pub kind: WorkloadKind,
}

/// How one worker terminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// Ran to completion; exit code 0 means the generator succeeded,
    /// non-zero means it reported a resource failure.
    Normal {
        /// Exit code of the worker (threads map generator failure to 1).
        exit_code: i32,
    },
    /// Terminated abnormally: killed by a signal (process) or panicked (thread).
    Abnormal {
        /// Signal or panic description.
        reason: String,
    },
    /// Launch itself failed; no work ever began. Only recorded under
    /// [`LaunchPolicy::Continue`].
    LaunchFailed {
        /// Spawn error description.
        error: String,
    },
    /// The wait/join failed; the worker's real fate is unknown. Surfaced
    /// distinctly from normal and abnormal termination.
    Unknown {
        /// Wait error description.
        error: String,
    },
}

impl Termination {
    /// True only for a clean zero exit.
    pub fn is_success(&self) -> bool {
        matches!(self, Termination::Normal { exit_code: 0 })
    }
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Termination::Normal { exit_code } => write!(f, "exited with status {exit_code}"),
            Termination::Abnormal { reason } => write!(f, "terminated abnormally: {reason}"),
            Termination::LaunchFailed { error } => write!(f, "launch failed: {error}"),
            Termination::Unknown { error } => write!(f, "wait failed: {error}"),
        }
    }
}

/// Terminal status recorded for one worker.
#[derive(Debug, Clone)]
pub struct WorkerOutcome {
    /// Ordinal of the worker this outcome belongs to.
    pub ordinal: u32,
    /// How the worker terminated.
    pub termination: Termination,
}

/// Aggregated result of one run. Read-only after construction.
#[derive(Debug)]
pub struct BenchmarkResult {
    /// Wall-clock start of the launch phase.
    pub started_at: DateTime<Utc>,
    /// Wall-clock end of the wait/join phase.
    pub finished_at: DateTime<Utc>,
    /// Total duration from first launch to last wait.
    pub wall_time: Duration,
    /// One outcome per requested worker, ordered by ordinal.
    pub outcomes: Vec<WorkerOutcome>,
}

impl BenchmarkResult {
    /// Number of workers that exited cleanly with status 0.
    pub fn completed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.termination.is_success())
            .count()
    }

    /// Number of workers with any non-success termination.
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.completed()
    }
}

/// Launches N workers under a strategy and aggregates their outcomes.
pub struct Orchestrator {
    strategy: Strategy,
    policy: LaunchPolicy,
    tuning: WorkloadTuning,
}

impl Orchestrator {
    /// Create an orchestrator for the given strategy, policy, and tuning.
    pub fn new(strategy: Strategy, policy: LaunchPolicy, tuning: WorkloadTuning) -> Self {
        Self {
            strategy,
            policy,
            tuning,
        }
    }

    /// Run `count` workers of `kind` and wait for all of them.
    ///
    /// Validation happens before any worker is spawned: an invalid count or
    /// tuning produces an error with zero side effects. On success the
    /// outcome sequence has exactly `count` entries, ordered by ordinal.
    pub fn run(
        &self,
        kind: WorkloadKind,
        count: u32,
    ) -> Result<BenchmarkResult, OrchestratorError> {
        if count < 1 || count > MAX_WORKERS {
            return Err(OrchestratorError::InvalidWorkerCount(count));
        }
        self.tuning
            .validate()
            .map_err(OrchestratorError::InvalidTuning)?;

        let specs: Vec<WorkerSpec> = (1..=count)
            .map(|ordinal| WorkerSpec { ordinal, kind })
            .collect();

        let started_at = Utc::now();
        let start = Instant::now();

        let mut outcomes = match self.strategy {
            Strategy::Process => process::run_workers(&specs, &self.tuning, self.policy)?,
            Strategy::Thread => thread::run_workers(&specs, &self.tuning, self.policy)?,
        };

        // Sequential waiting already yields ordinal order; keep the
        // contract explicit rather than implied by the wait loop.
        outcomes.sort_by_key(|o| o.ordinal);

        Ok(BenchmarkResult {
            started_at,
            finished_at: Utc::now(),
            wall_time: start.elapsed(),
            outcomes,
        })
    }
}
