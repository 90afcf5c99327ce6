//! Asset verification against the filesystem.
//!
//! Verification is read-only and collects every finding in one pass: a
//! missing file or a malformed task becomes an entry in the report, never an
//! early return.
use crate::catalog::{AssetKind, MalformedTask, TaskCatalog, TaskDescriptor};
use crate::error::CatalogError;
use crate::paths::{AssetCategory, PathResolver};
use serde::Serialize;
use std::path::PathBuf;

/// Suites searched for a dataset file missing under its own suite.
pub const DEFAULT_FALLBACK_SUITES: &[&str] = &["libero_spatial"];

/// Outcome of checking one (task, kind) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AssetStatus {
    Present,
    Missing,
    /// Found at the same file name under another suite's dataset folder.
    PresentInAlternateCategory { alternate: String, path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationEntry {
    pub task_index: usize,
    pub task_name: String,
    pub kind: AssetKind,
    pub expected_path: PathBuf,
    #[serde(flatten)]
    pub status: AssetStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub malformed: Option<MalformedTask>,
}

impl VerificationEntry {
    pub fn is_missing(&self) -> bool {
        matches!(self.status, AssetStatus::Missing)
    }
}

/// Per-kind counts for summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KindSummary {
    pub kind: AssetKind,
    pub present: usize,
    pub missing: usize,
    pub alternate: usize,
    pub malformed: usize,
}

/// Entries ordered task-major in catalog order, then by requested kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    pub benchmark_id: String,
    pub kinds: Vec<AssetKind>,
    pub entries: Vec<VerificationEntry>,
}

impl VerificationReport {
    /// Entries still missing, in report order.
    pub fn missing(&self) -> impl Iterator<Item = &VerificationEntry> {
        self.entries.iter().filter(|entry| entry.is_missing())
    }

    pub fn missing_of(&self, kind: AssetKind) -> impl Iterator<Item = &VerificationEntry> {
        self.missing().filter(move |entry| entry.kind == kind)
    }

    /// True when nothing is missing; alternate-suite hits count as present.
    pub fn is_complete(&self) -> bool {
        self.missing().next().is_none()
    }

    pub fn summary(&self) -> Vec<KindSummary> {
        self.kinds
            .iter()
            .map(|&kind| {
                let mut summary = KindSummary {
                    kind,
                    present: 0,
                    missing: 0,
                    alternate: 0,
                    malformed: 0,
                };
                for entry in self.entries.iter().filter(|entry| entry.kind == kind) {
                    match entry.status {
                        AssetStatus::Present => summary.present += 1,
                        AssetStatus::Missing => summary.missing += 1,
                        AssetStatus::PresentInAlternateCategory { .. } => summary.alternate += 1,
                    }
                    if entry.malformed.is_some() {
                        summary.malformed += 1;
                    }
                }
                summary
            })
            .collect()
    }
}

/// Cross-checks catalog tasks against the resolved asset roots.
pub struct AssetVerifier<'a> {
    paths: &'a PathResolver,
    catalog: &'a TaskCatalog,
    fallback_suites: Vec<String>,
}

impl<'a> AssetVerifier<'a> {
    pub fn new(paths: &'a PathResolver, catalog: &'a TaskCatalog) -> Self {
        Self {
            paths,
            catalog,
            fallback_suites: DEFAULT_FALLBACK_SUITES
                .iter()
                .map(|suite| suite.to_string())
                .collect(),
        }
    }

    /// Replace the ordered fallback suite list; an empty list disables fallback.
    pub fn with_fallback_suites(mut self, suites: Vec<String>) -> Self {
        self.fallback_suites = suites;
        self
    }

    /// Verify `kinds` for every task of `benchmark_id`.
    ///
    /// Only an unknown benchmark is an error; asset gaps are report entries.
    pub fn verify(
        &self,
        benchmark_id: &str,
        kinds: &[AssetKind],
    ) -> Result<VerificationReport, CatalogError> {
        let tasks = self.catalog.tasks(benchmark_id)?;
        let mut entries = Vec::with_capacity(tasks.len() * kinds.len());
        for (task_index, task) in tasks.iter().enumerate() {
            let malformed = task.malformed();
            if let Some(issue) = malformed {
                tracing::warn!(
                    benchmark = benchmark_id,
                    task_index,
                    field = issue.field,
                    reason = issue.reason,
                    "malformed task descriptor"
                );
            }
            for &kind in kinds {
                let expected_path = self.paths.asset_path(task, kind);
                let status = match malformed {
                    Some(_) => AssetStatus::Missing,
                    None => self.classify(task, kind, &expected_path),
                };
                tracing::debug!(
                    task_index,
                    kind = %kind,
                    path = %expected_path.display(),
                    ?status,
                    "asset checked"
                );
                entries.push(VerificationEntry {
                    task_index,
                    task_name: task.name.clone(),
                    kind,
                    expected_path,
                    status,
                    malformed,
                });
            }
        }
        let report = VerificationReport {
            benchmark_id: benchmark_id.to_string(),
            kinds: kinds.to_vec(),
            entries,
        };
        tracing::info!(
            benchmark = benchmark_id,
            tasks = tasks.len(),
            missing = report.missing().count(),
            "verification complete"
        );
        Ok(report)
    }

    fn classify(&self, task: &TaskDescriptor, kind: AssetKind, expected: &std::path::Path) -> AssetStatus {
        if expected.exists() {
            return AssetStatus::Present;
        }
        if kind != AssetKind::Datasets {
            return AssetStatus::Missing;
        }
        let Some(file_name) = task.demonstration_path().file_name().map(|name| name.to_os_string())
        else {
            return AssetStatus::Missing;
        };
        let datasets_root = self.paths.resolve(AssetCategory::Datasets);
        self.fallback_suites
            .iter()
            .filter(|suite| suite.as_str() != task.problem_folder)
            .map(|suite| (suite, datasets_root.join(suite).join(&file_name)))
            .find(|(_, candidate)| candidate.exists())
            .map(|(suite, path)| AssetStatus::PresentInAlternateCategory {
                alternate: suite.clone(),
                path,
            })
            .unwrap_or(AssetStatus::Missing)
    }
}

#[cfg(test)]
#[path = "verify_tests.rs"]
mod tests;
