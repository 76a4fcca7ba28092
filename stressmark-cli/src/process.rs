//! Process strategy
//!
//! Each worker is a separate OS process with its own address space: the
//! current executable re-invoked with a hidden `--stress-worker` flag and
//! its ordinal. Tuning travels to the child through the `STRESSMARK_TUNING`
//! environment variable so CLI overrides reach workers too.
//!
//! Launch failure is fatal to the whole run under `FailFast` (children
//! already launched are terminated and reaped); a wait failure is only
//! logged and waiting continues with the remaining workers.

use crate::config::LaunchPolicy;
use crate::orchestrator::{OrchestratorError, Termination, WorkerOutcome, WorkerSpec};
use crate::TUNING_ENV;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus};
use std::time::Duration;
use stressmark_core::WorkloadTuning;

/// Env var overriding the worker binary path, for tests that cannot use
/// `current_exe` (the test harness binary is not a stressmark CLI).
const WORKER_BIN_ENV: &str = "STRESSMARK_WORKER_BIN";

enum Launched {
    Child { ordinal: u32, child: Child },
    Failed { ordinal: u32, error: String },
}

pub(crate) fn run_workers(
    specs: &[WorkerSpec],
    tuning: &WorkloadTuning,
    policy: LaunchPolicy,
) -> Result<Vec<WorkerOutcome>, OrchestratorError> {
    let binary = worker_binary()?;
    let tuning_toml =
        toml::to_string(tuning).map_err(|e| OrchestratorError::InvalidTuning(e.to_string()))?;

    // The parent PID is the process-group anchor; each child PID follows
    // on launch so an external sampler can attach to all of them.
    println!(
        "[proc] orchestrator pid {} launching {} workers",
        std::process::id(),
        specs.len()
    );

    let mut launched: Vec<Launched> = Vec::with_capacity(specs.len());
    for spec in specs {
        let mut command = Command::new(&binary);
        command
            .arg(spec.kind.as_str())
            .arg("1")
            .arg("--stress-worker")
            .arg("--worker-ordinal")
            .arg(spec.ordinal.to_string())
            .env(TUNING_ENV, &tuning_toml);

        match command.spawn() {
            Ok(child) => {
                println!("[proc] worker {} pid {} launched", spec.ordinal, child.id());
                launched.push(Launched::Child {
                    ordinal: spec.ordinal,
                    child,
                });
            }
            Err(e) => match policy {
                LaunchPolicy::FailFast => {
                    tracing::error!(ordinal = spec.ordinal, error = %e, "worker launch failed; aborting run");
                    reap_launched(&mut launched);
                    return Err(OrchestratorError::LaunchFailed {
                        ordinal: spec.ordinal,
                        source: e,
                    });
                }
                LaunchPolicy::Continue => {
                    tracing::error!(ordinal = spec.ordinal, error = %e, "worker launch failed");
                    launched.push(Launched::Failed {
                        ordinal: spec.ordinal,
                        error: e.to_string(),
                    });
                }
            },
        }
    }

    // Wait in launch order. Actual completion order is up to the kernel;
    // resource usage overlaps regardless of the order we block in.
    let mut outcomes = Vec::with_capacity(launched.len());
    for entry in launched {
        match entry {
            Launched::Failed { ordinal, error } => outcomes.push(WorkerOutcome {
                ordinal,
                termination: Termination::LaunchFailed { error },
            }),
            Launched::Child { ordinal, mut child } => match child.wait() {
                Ok(status) => {
                    let termination = termination_from_status(status);
                    println!("[proc] worker {ordinal} {termination}");
                    outcomes.push(WorkerOutcome {
                        ordinal,
                        termination,
                    });
                }
                Err(e) => {
                    tracing::warn!(ordinal, error = %e, "wait failed; worker state unknown");
                    outcomes.push(WorkerOutcome {
                        ordinal,
                        termination: Termination::Unknown {
                            error: e.to_string(),
                        },
                    });
                }
            },
        }
    }
    Ok(outcomes)
}

fn worker_binary() -> Result<PathBuf, OrchestratorError> {
    if let Ok(path) = std::env::var(WORKER_BIN_ENV) {
        return Ok(PathBuf::from(path));
    }
    std::env::current_exe().map_err(OrchestratorError::WorkerBinary)
}

fn termination_from_status(status: ExitStatus) -> Termination {
    match status.code() {
        Some(exit_code) => Termination::Normal { exit_code },
        None => Termination::Abnormal {
            reason: describe_signal(&status),
        },
    }
}

#[cfg(unix)]
fn describe_signal(status: &ExitStatus) -> String {
    use std::os::unix::process::ExitStatusExt;
    match status.signal() {
        Some(signal) => format!("killed by signal {signal}"),
        None => status.to_string(),
    }
}

#[cfg(not(unix))]
fn describe_signal(status: &ExitStatus) -> String {
    status.to_string()
}

/// Terminate children already launched when a later launch fails under
/// `FailFast`: SIGTERM first, a brief grace window, then SIGKILL, and
/// reap everything so no zombies outlive the error return.
fn reap_launched(launched: &mut [Launched]) {
    for entry in launched.iter_mut() {
        if let Launched::Child { child, .. } = entry {
            let _ = send_sigterm(child.id());
        }
    }
    std::thread::sleep(Duration::from_millis(50));
    for entry in launched.iter_mut() {
        if let Launched::Child { child, .. } = entry {
            if !matches!(child.try_wait(), Ok(Some(_))) {
                let _ = child.kill();
            }
            let _ = child.wait();
        }
    }
}

/// Send SIGTERM to a process. Returns `Err` if the signal could not be delivered.
#[cfg(unix)]
fn send_sigterm(pid: u32) -> Result<(), std::io::Error> {
    let ret = unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) };
    if ret == -1 {
        Err(std::io::Error::last_os_error())
    } else {
        Ok(())
    }
}

#[cfg(not(unix))]
fn send_sigterm(_pid: u32) -> Result<(), std::io::Error> {
    Ok(())
}
