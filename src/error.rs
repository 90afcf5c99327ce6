//! Typed failures for the asset pipeline.
//!
//! Missing assets and malformed tasks are not errors: they are values in a
//! [`crate::verify::VerificationReport`]. The enums here cover the calls that
//! genuinely cannot produce a result.
use std::path::PathBuf;
use thiserror::Error;

/// Failures while resolving or persisting asset roots.
#[derive(Error, Debug)]
pub enum PathError {
    /// Category name outside the four recognized ones.
    #[error("unknown asset category {0:?} (expected benchmark_root, bddl_files, init_states, or datasets)")]
    UnknownCategory(String),

    /// The persisted config record could not be parsed or serialized.
    #[error("invalid config record {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    /// Filesystem failure touching the config record.
    #[error("{action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Neither `LIBERO_CONFIG_PATH` nor a home directory is available.
    #[error("cannot determine config directory (set LIBERO_CONFIG_PATH)")]
    NoConfigDir,
}

/// Failures while querying the task catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("unknown benchmark {0:?}")]
    UnknownBenchmark(String),

    #[error("task index {index} out of range for {benchmark} ({count} tasks)")]
    IndexOutOfRange {
        benchmark: String,
        index: usize,
        count: usize,
    },

    /// A catalog manifest could not be read or parsed.
    #[error("catalog manifest {path}: {reason}")]
    Manifest { path: PathBuf, reason: String },
}

/// Failures raised by a dataset source; the acquirer turns these into
/// [`crate::acquire::AcquisitionOutcome::Failed`].
#[derive(Error, Debug)]
pub enum AcquireError {
    #[error("transport failure for {url}: {reason}")]
    Transport { url: String, reason: String },

    #[error("{action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures of a single replay call.
#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("cannot read demonstration file {path}: {reason}")]
    FileUnreadable { path: PathBuf, reason: String },

    #[error("episode {episode} not found (available: {available})")]
    EpisodeNotFound { episode: String, available: String },

    #[error("stream {stream:?} not found in {episode} (available: {available})")]
    StreamNotFound {
        episode: String,
        stream: String,
        available: String,
    },

    #[error("encode failed: {0}")]
    Encode(String),
}
