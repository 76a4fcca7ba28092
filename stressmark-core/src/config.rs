//! Workload tuning constants
//!
//! Every iteration count and sizing constant the generators use lives here
//! as a named, overridable field rather than a hard-coded literal. Defaults
//! reproduce the reference workload: 1000 outer iterations over a million
//! Leibniz terms, a 200 MiB memory region, and ten 10 MiB I/O cycles.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tuning knobs for the three workload generators.
///
/// The I/O loop count is tunable independently of the CPU/memory count
/// because disk I/O is orders of magnitude slower per iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadTuning {
    /// Outer iterations of the CPU workload.
    #[serde(default = "default_cpu_outer_iters")]
    pub cpu_outer_iters: u64,
    /// Leibniz-series terms summed per outer CPU iteration.
    #[serde(default = "default_cpu_inner_terms")]
    pub cpu_inner_terms: u64,
    /// Size of the memory workload's region in bytes.
    #[serde(default = "default_mem_region_bytes")]
    pub mem_region_bytes: usize,
    /// Outer write/read passes of the memory workload.
    #[serde(default = "default_mem_outer_iters")]
    pub mem_outer_iters: u64,
    /// Write/sync/read cycles of the I/O workload.
    #[serde(default = "default_io_outer_iters")]
    pub io_outer_iters: u64,
    /// Bytes written to the scratch file per I/O cycle.
    #[serde(default = "default_io_payload_bytes")]
    pub io_payload_bytes: u64,
    /// Buffer size for individual scratch-file writes and reads.
    #[serde(default = "default_io_buffer_bytes")]
    pub io_buffer_bytes: usize,
    /// Directory the I/O workload places its scratch file in.
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,
    /// Use one fixed scratch filename for all workers.
    ///
    /// Off by default: concurrent workers get per-worker-unique names.
    /// Turning this on reproduces the deliberate cross-worker file
    /// contention of the original harness.
    #[serde(default)]
    pub shared_scratch: bool,
}

impl Default for WorkloadTuning {
    fn default() -> Self {
        Self {
            cpu_outer_iters: default_cpu_outer_iters(),
            cpu_inner_terms: default_cpu_inner_terms(),
            mem_region_bytes: default_mem_region_bytes(),
            mem_outer_iters: default_mem_outer_iters(),
            io_outer_iters: default_io_outer_iters(),
            io_payload_bytes: default_io_payload_bytes(),
            io_buffer_bytes: default_io_buffer_bytes(),
            scratch_dir: default_scratch_dir(),
            shared_scratch: false,
        }
    }
}

fn default_cpu_outer_iters() -> u64 {
    1000
}
fn default_cpu_inner_terms() -> u64 {
    1_000_000
}
fn default_mem_region_bytes() -> usize {
    200 * 1024 * 1024
}
fn default_mem_outer_iters() -> u64 {
    1000
}
fn default_io_outer_iters() -> u64 {
    10
}
fn default_io_payload_bytes() -> u64 {
    10 * 1024 * 1024
}
fn default_io_buffer_bytes() -> usize {
    4096
}
fn default_scratch_dir() -> PathBuf {
    PathBuf::from(".")
}

impl WorkloadTuning {
    /// Validate tuning values, returning a description of the first error found.
    pub fn validate(&self) -> Result<(), String> {
        if self.io_buffer_bytes == 0 {
            return Err("io_buffer_bytes must be > 0".to_string());
        }
        if self.io_payload_bytes == 0 {
            return Err("io_payload_bytes must be > 0".to_string());
        }
        if self.mem_region_bytes < std::mem::size_of::<u32>() {
            return Err(format!(
                "mem_region_bytes ({}) must hold at least one cell",
                self.mem_region_bytes
            ));
        }
        Ok(())
    }
}
