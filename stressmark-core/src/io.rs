//! I/O-bound generator
//!
//! Repeated write/sync/read cycles against a scratch file: write the whole
//! payload in buffer-sized chunks, force it to stable storage, then stream
//! it back to exhaustion. The scratch file is removed on every exit path,
//! including mid-stream failures, via an RAII guard.
//!
//! Each worker gets a unique filename (process id + ordinal) by default so
//! concurrent workers never race on the same file. `shared_scratch` opts
//! back into one fixed name, keeping the original harness's cross-worker
//! contention available as an explicit stress mode.

use crate::{WorkerContext, WorkloadError, WorkloadTuning};
use std::fs::{self, File};
use std::hint::black_box;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Fixed filename used by the shared-scratch contention mode.
const SHARED_SCRATCH_NAME: &str = "stressmark-scratch.dat";

/// Removes the scratch file when dropped, regardless of how the generator
/// exits. A missing file is fine; the read phase may have lost a race with
/// a sibling worker in shared-scratch mode.
struct ScratchGuard<'a> {
    path: &'a Path,
}

impl Drop for ScratchGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to remove scratch file"
                );
            }
        }
    }
}

pub(crate) fn scratch_path(ctx: &WorkerContext, tuning: &WorkloadTuning) -> PathBuf {
    if tuning.shared_scratch {
        tuning.scratch_dir.join(SHARED_SCRATCH_NAME)
    } else {
        tuning.scratch_dir.join(format!(
            "stressmark-scratch-{}-w{}.dat",
            std::process::id(),
            ctx.ordinal
        ))
    }
}

pub(crate) fn run(ctx: &WorkerContext, tuning: &WorkloadTuning) -> Result<(), WorkloadError> {
    let path = scratch_path(ctx, tuning);
    let _guard = ScratchGuard { path: &path };

    let buffer = vec![b'A'; tuning.io_buffer_bytes];
    for _ in 0..tuning.io_outer_iters {
        write_payload(&path, &buffer, tuning.io_payload_bytes)?;
        read_back(&path, tuning.io_buffer_bytes)?;
    }
    Ok(())
}

/// Write `payload_bytes` in buffer-sized chunks, then flush and sync so the
/// data actually reaches stable storage before the read phase.
fn write_payload(path: &Path, buffer: &[u8], payload_bytes: u64) -> Result<(), WorkloadError> {
    let mut file = File::create(path).map_err(|e| io_error(path, e))?;

    let mut written = 0u64;
    while written < payload_bytes {
        let chunk = buffer.len().min((payload_bytes - written) as usize);
        file.write_all(&buffer[..chunk])
            .map_err(|e| io_error(path, e))?;
        written += chunk as u64;
    }

    file.flush().map_err(|e| io_error(path, e))?;
    file.sync_all().map_err(|e| io_error(path, e))?;
    Ok(())
}

/// Stream the file back to exhaustion, returning the byte count. The first
/// byte of every chunk goes through `black_box` to keep the loads live.
fn read_back(path: &Path, buffer_bytes: usize) -> Result<u64, WorkloadError> {
    let mut file = File::open(path).map_err(|e| io_error(path, e))?;

    let mut buffer = vec![0u8; buffer_bytes];
    let mut total = 0u64;
    loop {
        let n = file.read(&mut buffer).map_err(|e| io_error(path, e))?;
        if n == 0 {
            break;
        }
        black_box(buffer[0]);
        total += n as u64;
    }
    Ok(total)
}

fn io_error(path: &Path, source: std::io::Error) -> WorkloadError {
    WorkloadError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WorkloadKind;

    fn ctx(ordinal: u32) -> WorkerContext {
        WorkerContext {
            ordinal,
            kind: WorkloadKind::Io,
        }
    }

    fn small_tuning(scratch_dir: PathBuf) -> WorkloadTuning {
        WorkloadTuning {
            io_outer_iters: 2,
            io_payload_bytes: 8 * 1024,
            io_buffer_bytes: 1024,
            scratch_dir,
            ..Default::default()
        }
    }

    #[test]
    fn test_run_removes_scratch_file() {
        let dir = tempfile::tempdir().unwrap();
        let tuning = small_tuning(dir.path().to_path_buf());

        assert!(run(&ctx(1), &tuning).is_ok());

        let leftover: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert!(leftover.is_empty(), "scratch file leaked: {:?}", leftover);
    }

    #[test]
    fn test_write_failure_reported_and_nothing_leaked() {
        let dir = tempfile::tempdir().unwrap();
        let tuning = small_tuning(dir.path().join("no-such-subdir"));

        match run(&ctx(1), &tuning) {
            Err(WorkloadError::Io { .. }) => {}
            other => panic!("expected Io error, got {:?}", other),
        }
        // The scratch directory itself never existed, so nothing to leak;
        // the parent temp dir must stay empty too.
        let leftover: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert!(leftover.is_empty());
    }

    #[test]
    fn test_read_back_counts_payload_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.dat");
        let buffer = vec![b'A'; 512];
        write_payload(&path, &buffer, 2048).unwrap();

        assert_eq!(read_back(&path, 512).unwrap(), 2048);
    }

    #[test]
    fn test_partial_final_chunk() {
        // Payload not a multiple of the buffer size: last write is short.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.dat");
        let buffer = vec![b'A'; 1024];
        write_payload(&path, &buffer, 1500).unwrap();

        assert_eq!(read_back(&path, 1024).unwrap(), 1500);
    }

    #[test]
    fn test_scratch_names_unique_per_worker() {
        let tuning = small_tuning(PathBuf::from("/tmp"));
        let a = scratch_path(&ctx(1), &tuning);
        let b = scratch_path(&ctx(2), &tuning);
        assert_ne!(a, b);
    }

    #[test]
    fn test_shared_scratch_uses_one_name() {
        let tuning = WorkloadTuning {
            shared_scratch: true,
            ..small_tuning(PathBuf::from("/tmp"))
        };
        let a = scratch_path(&ctx(1), &tuning);
        let b = scratch_path(&ctx(2), &tuning);
        assert_eq!(a, b);
        assert_eq!(a, PathBuf::from("/tmp").join(SHARED_SCRATCH_NAME));
    }
}
