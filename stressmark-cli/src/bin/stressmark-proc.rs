//! Process-strategy binary: one child process per worker.

fn main() -> anyhow::Result<()> {
    stressmark_cli::run(stressmark_cli::Strategy::Process)
}
