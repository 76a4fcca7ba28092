//! Launch-failure policy tests.
//!
//! These live in their own test binary: they point the worker-binary
//! override at a path that cannot exist, and sharing a process with the
//! tests that spawn the real binary would race on the environment
//! variable. Both tests here set the same value, so in-file parallelism
//! is safe.

use stressmark_cli::{LaunchPolicy, Orchestrator, OrchestratorError, Strategy, Termination};
use stressmark_core::{WorkloadKind, WorkloadTuning};

fn use_missing_worker_binary() {
    std::env::set_var(
        "STRESSMARK_WORKER_BIN",
        "/nonexistent/stressmark-worker-binary",
    );
}

#[test]
fn continue_policy_records_one_launch_failure_per_worker() {
    use_missing_worker_binary();
    let orch = Orchestrator::new(
        Strategy::Process,
        LaunchPolicy::Continue,
        WorkloadTuning::default(),
    );
    let result = orch.run(WorkloadKind::Cpu, 3).unwrap();

    // Every spawn fails, but the run still comes back with a full outcome
    // sequence in ordinal order.
    assert_eq!(result.outcomes.len(), 3);
    assert_eq!(result.failed(), 3);
    for (i, outcome) in result.outcomes.iter().enumerate() {
        assert_eq!(outcome.ordinal, i as u32 + 1);
        assert!(
            matches!(outcome.termination, Termination::LaunchFailed { .. }),
            "expected LaunchFailed, got {:?}",
            outcome.termination
        );
    }
}

#[test]
fn fail_fast_policy_aborts_on_first_launch_failure() {
    use_missing_worker_binary();
    let orch = Orchestrator::new(
        Strategy::Process,
        LaunchPolicy::FailFast,
        WorkloadTuning::default(),
    );

    match orch.run(WorkloadKind::Cpu, 3) {
        Err(OrchestratorError::LaunchFailed { ordinal, .. }) => assert_eq!(ordinal, 1),
        other => panic!("expected LaunchFailed error, got {:?}", other.map(|_| ())),
    }
}
