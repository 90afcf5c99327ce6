//! Asset root resolution.
//!
//! Every asset category resolves under a single benchmark root. The root is
//! either the built-in default next to the installed binary or an override
//! persisted in the user's config record. Callers build one [`PathResolver`]
//! and pass it by reference; only [`PathResolver::override_root`] mutates it.
use crate::catalog::{AssetKind, TaskDescriptor};
use crate::error::PathError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

mod config;

pub use config::{default_config_path, ConfigRecord, CONFIG_DIR_ENV, CONFIG_FILE_NAME};

/// Logical asset categories with a root directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetCategory {
    BenchmarkRoot,
    BddlFiles,
    InitStates,
    Datasets,
}

impl AssetCategory {
    pub const ALL: [AssetCategory; 4] = [
        AssetCategory::BenchmarkRoot,
        AssetCategory::BddlFiles,
        AssetCategory::InitStates,
        AssetCategory::Datasets,
    ];

    /// Return the stable name used in config records and CLI output.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetCategory::BenchmarkRoot => "benchmark_root",
            AssetCategory::BddlFiles => "bddl_files",
            AssetCategory::InitStates => "init_states",
            AssetCategory::Datasets => "datasets",
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetCategory {
    type Err = PathError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        AssetCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == raw)
            .ok_or_else(|| PathError::UnknownCategory(raw.to_string()))
    }
}

/// Resolved directories for all four categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetRoots {
    pub benchmark_root: PathBuf,
    pub bddl_files: PathBuf,
    pub init_states: PathBuf,
    pub datasets: PathBuf,
}

impl AssetRoots {
    /// Derive every category as a fixed subpath of `root`.
    pub fn from_benchmark_root(root: &Path) -> Self {
        let datasets = match root.parent() {
            Some(parent) => parent.join("datasets"),
            None => root.join("datasets"),
        };
        Self {
            benchmark_root: root.to_path_buf(),
            bddl_files: root.join("bddl_files"),
            init_states: root.join("init_files"),
            datasets,
        }
    }

    /// Build roots from a persisted record, deriving any absent or empty key.
    fn from_record(record: &ConfigRecord, default_root: &Path) -> Self {
        let root = non_empty(record.benchmark_root.as_deref()).unwrap_or(default_root);
        let derived = Self::from_benchmark_root(root);
        Self {
            bddl_files: non_empty(record.bddl_files.as_deref())
                .map(Path::to_path_buf)
                .unwrap_or(derived.bddl_files),
            init_states: non_empty(record.init_states.as_deref())
                .map(Path::to_path_buf)
                .unwrap_or(derived.init_states),
            datasets: non_empty(record.datasets.as_deref())
                .map(Path::to_path_buf)
                .unwrap_or(derived.datasets),
            benchmark_root: derived.benchmark_root,
        }
    }

    fn to_record(&self) -> ConfigRecord {
        ConfigRecord {
            benchmark_root: Some(self.benchmark_root.clone()),
            bddl_files: Some(self.bddl_files.clone()),
            init_states: Some(self.init_states.clone()),
            datasets: Some(self.datasets.clone()),
        }
    }

    pub fn get(&self, category: AssetCategory) -> &Path {
        match category {
            AssetCategory::BenchmarkRoot => &self.benchmark_root,
            AssetCategory::BddlFiles => &self.bddl_files,
            AssetCategory::InitStates => &self.init_states,
            AssetCategory::Datasets => &self.datasets,
        }
    }
}

fn non_empty(path: Option<&Path>) -> Option<&Path> {
    path.filter(|path| !path.as_os_str().is_empty())
}

/// Default benchmark root: `libero/` beside the installed executable.
///
/// Falls back to the crate directory when the executable path is unavailable,
/// so resolution never depends on the working directory.
pub fn default_benchmark_root() -> PathBuf {
    let install_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.canonicalize().ok())
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    install_dir
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")))
        .join("libero")
}

/// Owns the active asset roots and the config record backing them.
///
/// Assumes a single in-process writer; `override_root` takes `&mut self` and
/// concurrent processes sharing a config record are not coordinated.
#[derive(Debug, Clone)]
pub struct PathResolver {
    config_path: PathBuf,
    defaults: AssetRoots,
    roots: AssetRoots,
    overridden: bool,
}

impl PathResolver {
    /// Load from the user's config location with the built-in default root.
    pub fn load() -> Result<Self, PathError> {
        Self::load_from(default_config_path()?, default_benchmark_root())
    }

    /// Load from an explicit config record path and default root.
    pub fn load_from(config_path: PathBuf, default_root: PathBuf) -> Result<Self, PathError> {
        let defaults = AssetRoots::from_benchmark_root(&default_root);
        let (roots, overridden) = match config::load_record(&config_path)? {
            Some(record) => (AssetRoots::from_record(&record, &default_root), true),
            None => (defaults.clone(), false),
        };
        tracing::debug!(
            config = %config_path.display(),
            overridden,
            benchmark_root = %roots.benchmark_root.display(),
            "asset roots loaded"
        );
        Ok(Self {
            config_path,
            defaults,
            roots,
            overridden,
        })
    }

    /// Return the directory for a category.
    pub fn resolve(&self, category: AssetCategory) -> &Path {
        self.roots.get(category)
    }

    /// Resolve a category given by name.
    pub fn resolve_named(&self, name: &str) -> Result<&Path, PathError> {
        let category: AssetCategory = name.parse()?;
        Ok(self.resolve(category))
    }

    /// Location of one task asset relative to its category root.
    pub fn relative_asset_path(&self, task: &TaskDescriptor, kind: AssetKind) -> PathBuf {
        task.relative_path(kind)
    }

    /// Absolute location of one task asset.
    pub fn asset_path(&self, task: &TaskDescriptor, kind: AssetKind) -> PathBuf {
        self.resolve(kind.root_category())
            .join(self.relative_asset_path(task, kind))
    }

    pub fn roots(&self) -> &AssetRoots {
        &self.roots
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// True when the active roots come from a persisted record.
    pub fn is_overridden(&self) -> bool {
        self.overridden
    }

    /// Point every category at `new_root`, or revert to defaults with `None`.
    ///
    /// The record is written (or removed) before the in-memory roots change,
    /// so a failed write leaves both the record and this value untouched.
    pub fn override_root(&mut self, new_root: Option<&Path>) -> Result<(), PathError> {
        if self.config_path.is_file() {
            tracing::warn!(
                config = %self.config_path.display(),
                previous_root = %self.roots.benchmark_root.display(),
                "replacing existing asset root override; datasets and init states under the previous root will no longer be resolved"
            );
        }
        let next = match new_root {
            Some(root) => {
                let root = std::path::absolute(root).map_err(|source| PathError::Io {
                    action: "resolve",
                    path: root.to_path_buf(),
                    source,
                })?;
                let roots = AssetRoots::from_benchmark_root(&root);
                config::write_record(&self.config_path, &roots.to_record())?;
                tracing::info!(benchmark_root = %roots.benchmark_root.display(), "asset root override saved");
                (roots, true)
            }
            None => {
                config::remove_record(&self.config_path)?;
                tracing::info!("asset root override removed");
                (self.defaults.clone(), false)
            }
        };
        (self.roots, self.overridden) = next;
        Ok(())
    }
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
