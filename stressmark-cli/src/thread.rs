//! Thread strategy
//!
//! Each worker is a named thread inside this process, running its generator
//! directly. The heap is process-wide, but every worker still owns its own
//! workload buffers; the only genuinely shared mutable state is the scratch
//! filename when `shared_scratch` is enabled.
//!
//! A generator failure is logged on the worker's side channel and mapped to
//! the same non-zero exit code a failed process worker would report, so
//! outcomes read identically across strategies. A panic surfaces as an
//! abnormal termination via the join.

use crate::config::LaunchPolicy;
use crate::orchestrator::{OrchestratorError, Termination, WorkerOutcome, WorkerSpec};
use std::thread;
use stressmark_core::{execute, WorkerContext, WorkloadError, WorkloadTuning};

/// Exit code a worker reports when its generator fails. Matches the
/// process strategy, where the worker process exits 1 on generator error.
const GENERATOR_FAILURE_CODE: i32 = 1;

enum Launched {
    Handle {
        ordinal: u32,
        handle: thread::JoinHandle<Result<(), WorkloadError>>,
    },
    Failed {
        ordinal: u32,
        error: String,
    },
}

pub(crate) fn run_workers(
    specs: &[WorkerSpec],
    tuning: &WorkloadTuning,
    policy: LaunchPolicy,
) -> Result<Vec<WorkerOutcome>, OrchestratorError> {
    // One PID covers every worker here; the external sampler attaches to it.
    println!(
        "[thread] orchestrator pid {} launching {} workers",
        std::process::id(),
        specs.len()
    );

    let mut launched: Vec<Launched> = Vec::with_capacity(specs.len());
    for spec in specs {
        let ctx = WorkerContext {
            ordinal: spec.ordinal,
            kind: spec.kind,
        };
        let tuning = tuning.clone();
        let spawn = thread::Builder::new()
            .name(format!("worker-{}", spec.ordinal))
            .spawn(move || worker_body(ctx, &tuning));

        match spawn {
            Ok(handle) => {
                println!("[thread] worker {} launched", spec.ordinal);
                launched.push(Launched::Handle {
                    ordinal: spec.ordinal,
                    handle,
                });
            }
            Err(e) => match policy {
                LaunchPolicy::FailFast => {
                    tracing::error!(ordinal = spec.ordinal, error = %e, "thread creation failed; aborting run");
                    // Threads cannot be reaped early; let the ones already
                    // running finish before surfacing the launch error.
                    for entry in launched {
                        if let Launched::Handle { handle, .. } = entry {
                            let _ = handle.join();
                        }
                    }
                    return Err(OrchestratorError::LaunchFailed {
                        ordinal: spec.ordinal,
                        source: e,
                    });
                }
                LaunchPolicy::Continue => {
                    tracing::error!(ordinal = spec.ordinal, error = %e, "thread creation failed");
                    launched.push(Launched::Failed {
                        ordinal: spec.ordinal,
                        error: e.to_string(),
                    });
                }
            },
        }
    }

    // Join in launch order; a panicked thread does not stop the joins of
    // the remaining workers.
    let mut outcomes = Vec::with_capacity(launched.len());
    for entry in launched {
        match entry {
            Launched::Failed { ordinal, error } => outcomes.push(WorkerOutcome {
                ordinal,
                termination: Termination::LaunchFailed { error },
            }),
            Launched::Handle { ordinal, handle } => {
                let termination = match handle.join() {
                    Ok(Ok(())) => Termination::Normal { exit_code: 0 },
                    Ok(Err(_)) => Termination::Normal {
                        exit_code: GENERATOR_FAILURE_CODE,
                    },
                    Err(panic) => Termination::Abnormal {
                        reason: panic_message(panic),
                    },
                };
                println!("[thread] worker {ordinal} {termination}");
                outcomes.push(WorkerOutcome {
                    ordinal,
                    termination,
                });
            }
        }
    }
    Ok(outcomes)
}

fn worker_body(ctx: WorkerContext, tuning: &WorkloadTuning) -> Result<(), WorkloadError> {
    println!("[thread] worker {} started ({})", ctx.ordinal, ctx.kind);
    let result = execute(&ctx, tuning);
    if let Err(e) = &result {
        tracing::error!(ordinal = ctx.ordinal, error = %e, "workload failed");
    }
    println!("[thread] worker {} completed", ctx.ordinal);
    result
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stressmark_core::WorkloadKind;

    fn specs(count: u32, kind: WorkloadKind) -> Vec<WorkerSpec> {
        (1..=count).map(|ordinal| WorkerSpec { ordinal, kind }).collect()
    }

    #[test]
    fn test_workers_complete_in_ordinal_order() {
        let tuning = WorkloadTuning {
            cpu_outer_iters: 2,
            cpu_inner_terms: 1_000,
            ..Default::default()
        };
        let outcomes =
            run_workers(&specs(3, WorkloadKind::Cpu), &tuning, LaunchPolicy::FailFast).unwrap();

        assert_eq!(outcomes.len(), 3);
        for (i, outcome) in outcomes.iter().enumerate() {
            assert_eq!(outcome.ordinal, i as u32 + 1);
            assert!(outcome.termination.is_success());
        }
    }

    #[test]
    fn test_generator_failure_maps_to_failure_code() {
        // Unsatisfiable region: every worker reports AllocationFailed,
        // which must surface as a failed outcome, not a panic or abort.
        let tuning = WorkloadTuning {
            mem_region_bytes: usize::MAX / 8,
            mem_outer_iters: 1,
            ..Default::default()
        };
        let outcomes =
            run_workers(&specs(2, WorkloadKind::Mem), &tuning, LaunchPolicy::FailFast).unwrap();

        assert_eq!(outcomes.len(), 2);
        for outcome in &outcomes {
            assert_eq!(
                outcome.termination,
                Termination::Normal {
                    exit_code: GENERATOR_FAILURE_CODE
                }
            );
        }
    }

    #[test]
    fn test_panic_message_extraction() {
        let handle = thread::spawn(|| panic!("boom"));
        let err = handle.join().unwrap_err();
        assert_eq!(panic_message(err), "panicked: boom");
    }
}
