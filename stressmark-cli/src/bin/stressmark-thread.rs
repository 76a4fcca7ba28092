//! Thread-strategy binary: one thread per worker.

fn main() -> anyhow::Result<()> {
    stressmark_cli::run(stressmark_cli::Strategy::Thread)
}
