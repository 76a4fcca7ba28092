//! Result formatting
//!
//! Two output shapes: a human-readable summary with per-worker outcome
//! lines, and a single CSV row the wrapping measurement scripts capture.

use crate::orchestrator::{BenchmarkResult, Strategy};
use std::fmt::Write;
use std::time::Duration;
use stressmark_core::WorkloadKind;

/// Human-readable summary: per-worker outcomes plus the wall time.
pub fn format_summary(strategy: Strategy, kind: WorkloadKind, result: &BenchmarkResult) -> String {
    let mut out = String::new();
    let total = result.outcomes.len();
    let _ = writeln!(
        out,
        "{strategy} x{total} {kind}: {}/{total} completed in {}",
        result.completed(),
        format_duration(result.wall_time),
    );
    for outcome in &result.outcomes {
        let _ = writeln!(out, "  worker {}: {}", outcome.ordinal, outcome.termination);
    }
    out
}

/// One CSV row (with header) for result aggregation across runs.
pub fn format_csv(strategy: Strategy, kind: WorkloadKind, result: &BenchmarkResult) -> String {
    format!(
        "strategy,workload,workers,duration_ms,completed,failed\n{},{},{},{:.3},{},{}\n",
        strategy,
        kind,
        result.outcomes.len(),
        result.wall_time.as_secs_f64() * 1000.0,
        result.completed(),
        result.failed(),
    )
}

/// Format a duration at a precision fit for wall-clock benchmarks.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs >= 1.0 {
        format!("{secs:.2}s")
    } else {
        format!("{:.1}ms", secs * 1000.0)
    }
}
