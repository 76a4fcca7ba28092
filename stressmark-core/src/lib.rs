#![warn(missing_docs)]
//! Stressmark Core - Workload Generators
//!
//! This crate provides the synthetic workloads the harness runs under both
//! orchestration strategies:
//! - `cpu`: Leibniz-series arithmetic with an observable accumulator
//! - `mem`: strided write/read passes over one large heap region
//! - `io`: repeated write/sync/read cycles against a scratch file
//!
//! Each generator performs a fixed, deterministic amount of work derived
//! from [`WorkloadTuning`] and has no side effects beyond its own resource
//! usage (the I/O variant touches a private scratch file it removes again).

mod config;
mod cpu;
mod io;
mod mem;

pub use config::WorkloadTuning;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Workload profile, selected once at launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkloadKind {
    /// CPU-bound: alternating-series arithmetic
    Cpu,
    /// Memory-bound: strided access over a large region
    Mem,
    /// I/O-bound: scratch-file write/sync/read cycles
    Io,
}

impl WorkloadKind {
    /// All supported workload kinds, in CLI order.
    pub const ALL: [WorkloadKind; 3] = [WorkloadKind::Cpu, WorkloadKind::Mem, WorkloadKind::Io];

    /// The CLI name for this workload.
    pub fn as_str(self) -> &'static str {
        match self {
            WorkloadKind::Cpu => "cpu",
            WorkloadKind::Mem => "mem",
            WorkloadKind::Io => "io",
        }
    }
}

impl std::fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognized workload name.
#[derive(Debug, Error)]
#[error("unknown workload {0:?} (expected cpu, mem, or io)")]
pub struct ParseWorkloadError(String);

impl FromStr for WorkloadKind {
    type Err = ParseWorkloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cpu" => Ok(WorkloadKind::Cpu),
            "mem" => Ok(WorkloadKind::Mem),
            "io" => Ok(WorkloadKind::Io),
            other => Err(ParseWorkloadError(other.to_string())),
        }
    }
}

/// Identity of one worker: its ordinal (1..=N) and the selected workload.
///
/// This is the only input state a worker carries; everything else comes
/// from the shared [`WorkloadTuning`].
#[derive(Debug, Clone, Copy)]
pub struct WorkerContext {
    /// Worker number within the batch, starting at 1.
    pub ordinal: u32,
    /// Workload this worker runs.
    pub kind: WorkloadKind,
}

/// Failures local to one generator invocation.
///
/// These are reported to the caller and never abort sibling workers.
#[derive(Debug, Error)]
pub enum WorkloadError {
    /// Tuning rejected before any work began.
    #[error("invalid workload tuning: {0}")]
    InvalidTuning(String),

    /// The memory region could not be allocated. Nothing was written.
    #[error("failed to allocate memory region of {bytes} bytes")]
    AllocationFailed {
        /// Requested region size.
        bytes: usize,
    },

    /// A scratch-file operation failed; the I/O attempt was aborted.
    #[error("scratch file {path}: {source}")]
    Io {
        /// Scratch file the operation targeted.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Run one generator instance to completion.
///
/// Dispatches on `ctx.kind`. Resource-acquisition failures come back as
/// [`WorkloadError`]; the generators never panic on them.
///
/// Tuning is validated here, not just in the orchestrator: a worker
/// started by hand (or fed a bad `STRESSMARK_TUNING`) must error out
/// rather than run with degenerate constants.
pub fn execute(ctx: &WorkerContext, tuning: &WorkloadTuning) -> Result<(), WorkloadError> {
    tuning.validate().map_err(WorkloadError::InvalidTuning)?;
    match ctx.kind {
        WorkloadKind::Cpu => cpu::run(tuning),
        WorkloadKind::Mem => mem::run(tuning),
        WorkloadKind::Io => io::run(ctx, tuning),
    }
}
