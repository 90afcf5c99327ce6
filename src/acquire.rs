//! Dataset acquisition driven by a verification report.
//!
//! Acquisition never fails the pipeline: transport problems come back as
//! [`AcquisitionOutcome::Failed`] so callers can still report remaining gaps.
//! There is no retry and no timeout here; wrap the call to add either.
use crate::catalog::AssetKind;
use crate::error::AcquireError;
use crate::verify::VerificationReport;
use serde::Serialize;
use std::path::{Path, PathBuf};

mod huggingface;

pub use huggingface::{
    expected_demo_count, HuggingFaceSource, DEFAULT_ENDPOINT, DEFAULT_REPO, DEFAULT_REVISION,
};

/// Pre-populated file that signals a manual download, relative to the
/// dataset root.
pub const DEFAULT_SENTINEL: &str = "libero_10/LIVING_ROOM_SCENE6_put_the_white_mug_on_the_plate_and_put_the_chocolate_pudding_to_the_right_of_the_plate_demo.hdf5";

/// Remote dataset provider.
pub trait DatasetSource {
    /// Whether `dataset_id` already looks complete under `root`.
    fn check_existing(&self, root: &Path, dataset_id: &str) -> bool;

    /// Fetch `dataset_id` into `root`, returning the files written.
    fn download(&self, root: &Path, dataset_id: &str) -> Result<Vec<PathBuf>, AcquireError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// The report has no dataset gaps left on disk.
    NothingMissing,
    /// The sentinel file exists under the target root.
    ManuallyPopulated { sentinel: PathBuf },
    /// The source reports the dataset already present.
    AlreadyPresent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AcquisitionOutcome {
    Skipped { reason: SkipReason },
    Downloaded { files: Vec<PathBuf> },
    Failed { reason: String },
}

/// Decides whether to fetch and delegates the transfer to a [`DatasetSource`].
pub struct DatasetAcquirer<S> {
    source: S,
    sentinel: Option<PathBuf>,
}

impl<S: DatasetSource> DatasetAcquirer<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            sentinel: Some(PathBuf::from(DEFAULT_SENTINEL)),
        }
    }

    /// Override the sentinel path (relative to the target root); `None` disables it.
    pub fn with_sentinel(mut self, sentinel: Option<PathBuf>) -> Self {
        self.sentinel = sentinel;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn acquire(
        &self,
        target_root: &Path,
        dataset_id: &str,
        report: &VerificationReport,
    ) -> AcquisitionOutcome {
        // Re-check on disk so a report made before an earlier download is not
        // enough to fetch again.
        let missing: Vec<&Path> = report
            .missing_of(AssetKind::Datasets)
            .map(|entry| entry.expected_path.as_path())
            .filter(|path| !path.exists())
            .collect();
        if missing.is_empty() {
            tracing::info!(dataset = dataset_id, "no missing demonstrations; skipping download");
            return AcquisitionOutcome::Skipped {
                reason: SkipReason::NothingMissing,
            };
        }

        if let Some(sentinel) = self.sentinel.as_ref().map(|rel| target_root.join(rel)) {
            if sentinel.is_file() {
                tracing::info!(sentinel = %sentinel.display(), "sentinel demonstration present; skipping download");
                return AcquisitionOutcome::Skipped {
                    reason: SkipReason::ManuallyPopulated { sentinel },
                };
            }
        }

        if self.source.check_existing(target_root, dataset_id) {
            tracing::info!(dataset = dataset_id, "dataset already present; skipping download");
            return AcquisitionOutcome::Skipped {
                reason: SkipReason::AlreadyPresent,
            };
        }

        tracing::info!(
            dataset = dataset_id,
            root = %target_root.display(),
            missing = missing.len(),
            "downloading dataset"
        );
        match self.source.download(target_root, dataset_id) {
            Ok(files) => AcquisitionOutcome::Downloaded { files },
            Err(err) => {
                tracing::warn!(dataset = dataset_id, error = %err, "dataset download failed");
                AcquisitionOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }
}
