use anyhow::Result;
use clap::Parser;
use libero_harness::cli::{Command, RootArgs};
use libero_harness::workflow;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = RootArgs::parse();
    init_tracing(args.verbose);

    match args.command {
        Command::Paths(args) => workflow::run_paths(args),
        Command::SetRoot(args) => workflow::run_set_root(args),
        Command::Benchmarks(args) => workflow::run_benchmarks(args),
        Command::Tasks(args) => workflow::run_tasks(args),
        Command::Verify(args) => workflow::run_verify(args),
        Command::Acquire(args) => workflow::run_acquire(args),
        Command::Info(args) => workflow::run_info(args),
        Command::Replay(args) => workflow::run_replay(args),
        Command::Check(args) => workflow::run_check(args),
    }
}

/// Log to stderr; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
