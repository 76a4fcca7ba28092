//! Memory-bound generator
//!
//! Allocates one large contiguous region of `u32` cells, then alternates
//! a sequential write pass at cache-line stride with a sparse read pass at
//! four times that stride. The wide read stride skips past prefetch-friendly
//! patterns to maximize cache misses; the written values depend on both
//! position and iteration index so redundant-write elimination cannot fire.

use crate::{WorkloadError, WorkloadTuning};
use std::hint::black_box;

const CACHE_LINE_BYTES: usize = 64;

/// Write pass stride: one cache line of cells.
const WRITE_STRIDE_CELLS: usize = CACHE_LINE_BYTES / std::mem::size_of::<u32>();

/// Read pass stride: four cache lines apart to defeat the prefetcher.
const READ_STRIDE_CELLS: usize = 4 * WRITE_STRIDE_CELLS;

pub(crate) fn run(tuning: &WorkloadTuning) -> Result<(), WorkloadError> {
    let cells = tuning.mem_region_bytes / std::mem::size_of::<u32>();

    // Fail fast if the region cannot be satisfied; nothing else is attempted.
    let mut region: Vec<u32> = Vec::new();
    region
        .try_reserve_exact(cells)
        .map_err(|_| WorkloadError::AllocationFailed {
            bytes: tuning.mem_region_bytes,
        })?;
    region.resize(cells, 0);

    let mut acc = 0u32;
    for iter in 0..tuning.mem_outer_iters {
        // Sequential writes touching every cache line of the region.
        for i in (0..cells).step_by(WRITE_STRIDE_CELLS) {
            region[i] = (i as u64).wrapping_add(iter) as u32;
        }
        // Sparse reads, folded into an accumulator so the loads stay live.
        for i in (0..cells).step_by(READ_STRIDE_CELLS) {
            acc ^= region[i];
        }
    }
    black_box(acc);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_tuning(region_bytes: usize) -> WorkloadTuning {
        WorkloadTuning {
            mem_region_bytes: region_bytes,
            mem_outer_iters: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_run_completes_with_small_region() {
        assert!(run(&small_tuning(64 * 1024)).is_ok());
    }

    #[test]
    fn test_allocation_failure_is_reported_not_fatal() {
        // A region nobody can satisfy: try_reserve fails without touching
        // memory, and the generator returns instead of aborting.
        let tuning = small_tuning(usize::MAX / 8);
        match run(&tuning) {
            Err(WorkloadError::AllocationFailed { bytes }) => {
                assert_eq!(bytes, usize::MAX / 8);
            }
            other => panic!("expected AllocationFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_region_smaller_than_write_stride() {
        // A region of a single cache line still completes.
        assert!(run(&small_tuning(CACHE_LINE_BYTES)).is_ok());
    }
}
