//! CLI argument parsing for the benchmark asset workflow.
use crate::catalog::AssetKind;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "libero-harness",
    version,
    about = "Verify, download, and replay LIBERO benchmark assets",
    after_help = "Examples:\n  libero-harness paths\n  libero-harness set-root /data/libero\n  libero-harness verify --benchmark libero_10\n  libero-harness acquire --benchmark libero_10\n  libero-harness replay --file demo.hdf5 --out demo.mp4",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Log debug detail to stderr (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Paths(PathsArgs),
    SetRoot(SetRootArgs),
    Benchmarks(BenchmarksArgs),
    Tasks(TasksArgs),
    Verify(VerifyArgs),
    Acquire(AcquireArgs),
    Info(InfoArgs),
    Replay(ReplayArgs),
    Check(CheckArgs),
}

#[derive(Parser, Debug)]
#[command(about = "Print the resolved asset roots")]
pub struct PathsArgs {
    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Point every asset category at a new benchmark root")]
pub struct SetRootArgs {
    /// New benchmark root; bddl_files, init_files, and ../datasets derive from it
    #[arg(value_name = "DIR", required_unless_present = "reset", conflicts_with = "reset")]
    pub root: Option<PathBuf>,

    /// Remove the override and return to the built-in defaults
    #[arg(long)]
    pub reset: bool,
}

/// Catalog selection shared by commands that read tasks.
#[derive(Args, Debug, Clone, Default)]
pub struct CatalogArgs {
    /// Additional benchmark manifest (YAML or JSON)
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,
}

#[derive(Parser, Debug)]
#[command(about = "List known benchmarks and their task counts")]
pub struct BenchmarksArgs {
    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
#[command(about = "List the tasks of a benchmark")]
pub struct TasksArgs {
    /// Benchmark id, e.g. libero_10
    #[arg(long, value_name = "ID")]
    pub benchmark: String,

    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

/// Verification inputs shared by verify, acquire, and check.
#[derive(Args, Debug, Clone)]
pub struct VerifySelection {
    /// Benchmark id, e.g. libero_10
    #[arg(long, value_name = "ID")]
    pub benchmark: String,

    /// Asset kind to check (task_defs, init_states, datasets); repeatable
    #[arg(long = "category", value_name = "KIND")]
    pub categories: Vec<AssetKind>,

    /// Suite searched for datasets missing under their own suite; repeatable
    #[arg(long = "fallback-suite", value_name = "SUITE")]
    pub fallback_suites: Vec<String>,

    /// Disable the dataset fallback search
    #[arg(long, conflicts_with = "fallback_suites")]
    pub no_fallback: bool,

    #[command(flatten)]
    pub catalog: CatalogArgs,
}

#[derive(Parser, Debug)]
#[command(about = "Report missing task definitions, init states, and datasets")]
pub struct VerifyArgs {
    #[command(flatten)]
    pub selection: VerifySelection,

    /// Exit non-zero when anything is missing
    #[arg(long)]
    pub strict: bool,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

/// Remote dataset source settings.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Dataset folder to fetch (defaults to the benchmark id)
    #[arg(long, value_name = "ID")]
    pub dataset: Option<String>,

    /// Hub endpoint
    #[arg(long, value_name = "URL", default_value = crate::acquire::DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Dataset repository
    #[arg(long, value_name = "REPO", default_value = crate::acquire::DEFAULT_REPO)]
    pub repo: String,

    /// Repository revision
    #[arg(long, value_name = "REV", default_value = crate::acquire::DEFAULT_REVISION)]
    pub revision: String,

    /// Manual-download marker relative to the datasets root
    #[arg(long, value_name = "PATH", conflicts_with = "no_sentinel")]
    pub sentinel: Option<PathBuf>,

    /// Always consult the source even if the marker file exists
    #[arg(long)]
    pub no_sentinel: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Download missing datasets, then report what is still missing")]
pub struct AcquireArgs {
    #[command(flatten)]
    pub selection: VerifySelection,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Summarize the episodes of a demonstration file")]
pub struct InfoArgs {
    /// Demonstration file (.hdf5)
    #[arg(long, value_name = "FILE")]
    pub file: PathBuf,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Render one demonstration episode to a video")]
pub struct ReplayArgs {
    /// Demonstration file (.hdf5)
    #[arg(long, value_name = "FILE")]
    pub file: PathBuf,

    /// Episode index (data/demo_<N>)
    #[arg(long, default_value_t = 0)]
    pub episode: usize,

    /// Observation stream to render
    #[arg(long, default_value = crate::replay::DEFAULT_STREAM)]
    pub stream: String,

    /// Output video path
    #[arg(long, value_name = "PATH")]
    pub out: PathBuf,
}

#[derive(Parser, Debug)]
#[command(about = "Verify, acquire, re-verify, and optionally replay a sample demonstration")]
pub struct CheckArgs {
    #[command(flatten)]
    pub selection: VerifySelection,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Skip the download step
    #[arg(long)]
    pub offline: bool,

    /// Render a sample demonstration to this path
    #[arg(long, value_name = "PATH")]
    pub replay_out: Option<PathBuf>,
}
