//! CPU-bound generator
//!
//! Sustained floating-point work with no heap growth and no I/O: repeated
//! partial sums of the Leibniz series. The resulting value is irrelevant,
//! but it must stay observable — the accumulator is routed through
//! `black_box` so the optimizer cannot prove the loops dead and elide the
//! arithmetic entirely.

use crate::{WorkloadError, WorkloadTuning};
use std::hint::black_box;

/// Partial sum of the Leibniz series over `terms` terms.
///
/// Converges to pi/4: 1 - 1/3 + 1/5 - 1/7 + ...
fn leibniz_partial(terms: u64) -> f64 {
    let mut sum = 0.0f64;
    for i in 0..terms {
        let term = 1.0 / (2.0 * i as f64 + 1.0);
        if i % 2 == 0 {
            sum += term;
        } else {
            sum -= term;
        }
    }
    sum
}

pub(crate) fn run(tuning: &WorkloadTuning) -> Result<(), WorkloadError> {
    let mut acc = 0.0f64;
    for _ in 0..tuning.cpu_outer_iters {
        // black_box on the term count keeps the compiler from folding the
        // inner loop across outer iterations.
        acc += leibniz_partial(black_box(tuning.cpu_inner_terms));
    }
    black_box(acc);
    Ok(())
}
