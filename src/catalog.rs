//! Benchmark task catalog.
//!
//! Task order is the benchmark's canonical definition order; every report
//! derived from the catalog keeps it so index-based cross references stay valid.
use crate::error::CatalogError;
use crate::paths::AssetCategory;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

mod suites;

/// Per-task asset kinds checked by verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    TaskDefs,
    InitStates,
    Datasets,
}

impl AssetKind {
    pub const ALL: [AssetKind; 3] = [AssetKind::TaskDefs, AssetKind::InitStates, AssetKind::Datasets];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::TaskDefs => "task_defs",
            AssetKind::InitStates => "init_states",
            AssetKind::Datasets => "datasets",
        }
    }

    /// Root category the kind resolves under.
    pub fn root_category(&self) -> AssetCategory {
        match self {
            AssetKind::TaskDefs => AssetCategory::BddlFiles,
            AssetKind::InitStates => AssetCategory::InitStates,
            AssetKind::Datasets => AssetCategory::Datasets,
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetKind {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        AssetKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == raw)
            .ok_or_else(|| {
                format!("unknown asset kind {raw:?} (expected task_defs, init_states, or datasets)")
            })
    }
}

/// Descriptor field that makes a task unusable for path derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MalformedTask {
    pub field: &'static str,
    pub reason: &'static str,
}

/// One benchmark task. The demonstration path is always derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskDescriptor {
    pub name: String,
    pub language: String,
    pub problem_folder: String,
    pub bddl_file: String,
    pub init_states_file: String,
}

impl TaskDescriptor {
    /// Build the conventional descriptor for a task name within a folder.
    pub fn from_name(problem_folder: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            language: language_from_name(name),
            problem_folder: problem_folder.to_string(),
            bddl_file: format!("{name}.bddl"),
            init_states_file: format!("{name}.pruned_init"),
        }
    }

    /// `<problem_folder>/<name>_demo.hdf5`
    pub fn demonstration_path(&self) -> PathBuf {
        Path::new(&self.problem_folder).join(format!("{}_demo.hdf5", self.name))
    }

    /// Path of a task asset relative to the kind's root.
    pub fn relative_path(&self, kind: AssetKind) -> PathBuf {
        match kind {
            AssetKind::TaskDefs => Path::new(&self.problem_folder).join(&self.bddl_file),
            AssetKind::InitStates => Path::new(&self.problem_folder).join(&self.init_states_file),
            AssetKind::Datasets => self.demonstration_path(),
        }
    }

    /// First field that is empty or escapes its root, if any.
    pub fn malformed(&self) -> Option<MalformedTask> {
        let fields = [
            ("name", self.name.as_str()),
            ("problem_folder", self.problem_folder.as_str()),
            ("bddl_file", self.bddl_file.as_str()),
            ("init_states_file", self.init_states_file.as_str()),
        ];
        fields.into_iter().find_map(|(field, value)| {
            if value.trim().is_empty() {
                Some(MalformedTask {
                    field,
                    reason: "empty",
                })
            } else if !is_plain_relative(value) {
                Some(MalformedTask {
                    field,
                    reason: "not a relative path inside the asset root",
                })
            } else {
                None
            }
        })
    }
}

fn is_plain_relative(value: &str) -> bool {
    Path::new(value)
        .components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}

/// Derive the instruction text from a task name, dropping any scene prefix.
pub fn language_from_name(name: &str) -> String {
    static SCENE_PREFIX: OnceLock<Regex> = OnceLock::new();
    let prefix = SCENE_PREFIX
        .get_or_init(|| Regex::new(r"^[A-Z0-9_]*?SCENE\d+_").expect("regex for scene prefix"));
    prefix.replace(name, "").replace('_', " ")
}

/// A named, ordered set of tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Benchmark {
    pub id: String,
    pub tasks: Vec<TaskDescriptor>,
}

/// All benchmarks known to this process.
#[derive(Debug, Clone, Default)]
pub struct TaskCatalog {
    benchmarks: BTreeMap<String, Benchmark>,
}

impl TaskCatalog {
    /// Catalog with the built-in LIBERO suites.
    pub fn builtin() -> Self {
        let mut catalog = Self::default();
        for (id, names) in suites::BUILTIN {
            let tasks = names
                .iter()
                .map(|name| TaskDescriptor::from_name(id, name))
                .collect();
            catalog.insert(Benchmark {
                id: id.to_string(),
                tasks,
            });
        }
        catalog
    }

    /// Add or replace a benchmark.
    pub fn insert(&mut self, benchmark: Benchmark) {
        self.benchmarks.insert(benchmark.id.clone(), benchmark);
    }

    /// Merge benchmarks from a YAML or JSON manifest, replacing same-named ones.
    pub fn load_manifest(&mut self, path: &Path) -> Result<usize, CatalogError> {
        let text = fs::read_to_string(path).map_err(|err| CatalogError::Manifest {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        let manifest: Manifest =
            serde_yaml::from_str(&text).map_err(|err| CatalogError::Manifest {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })?;
        let count = manifest.benchmarks.len();
        for (id, entry) in manifest.benchmarks {
            let folder = entry.problem_folder.unwrap_or_else(|| id.clone());
            let tasks = entry
                .tasks
                .into_iter()
                .map(|task| task.into_descriptor(&folder))
                .collect();
            tracing::debug!(benchmark = %id, manifest = %path.display(), "benchmark loaded from manifest");
            self.insert(Benchmark { id, tasks });
        }
        Ok(count)
    }

    /// Benchmark ids in stable order.
    pub fn benchmark_ids(&self) -> Vec<&str> {
        self.benchmarks.keys().map(String::as_str).collect()
    }

    pub fn benchmark(&self, benchmark_id: &str) -> Result<&Benchmark, CatalogError> {
        self.benchmarks
            .get(benchmark_id)
            .ok_or_else(|| CatalogError::UnknownBenchmark(benchmark_id.to_string()))
    }

    pub fn tasks(&self, benchmark_id: &str) -> Result<&[TaskDescriptor], CatalogError> {
        Ok(&self.benchmark(benchmark_id)?.tasks)
    }

    pub fn get_num_tasks(&self, benchmark_id: &str) -> Result<usize, CatalogError> {
        Ok(self.tasks(benchmark_id)?.len())
    }

    /// Task names, index-aligned with [`TaskCatalog::get_task`].
    pub fn get_task_names(&self, benchmark_id: &str) -> Result<Vec<&str>, CatalogError> {
        Ok(self
            .tasks(benchmark_id)?
            .iter()
            .map(|task| task.name.as_str())
            .collect())
    }

    pub fn get_task(&self, benchmark_id: &str, index: usize) -> Result<&TaskDescriptor, CatalogError> {
        let tasks = self.tasks(benchmark_id)?;
        tasks.get(index).ok_or_else(|| CatalogError::IndexOutOfRange {
            benchmark: benchmark_id.to_string(),
            index,
            count: tasks.len(),
        })
    }

    /// Demonstration path of a task, relative to the dataset root.
    pub fn get_task_demonstration(&self, benchmark_id: &str, index: usize) -> Result<PathBuf, CatalogError> {
        Ok(self.get_task(benchmark_id, index)?.demonstration_path())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    benchmarks: BTreeMap<String, ManifestBenchmark>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestBenchmark {
    #[serde(default)]
    problem_folder: Option<String>,
    tasks: Vec<ManifestTask>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ManifestTask {
    Name(String),
    Full(ManifestDescriptor),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestDescriptor {
    name: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    problem_folder: Option<String>,
    #[serde(default)]
    bddl_file: Option<String>,
    #[serde(default)]
    init_states_file: Option<String>,
}

impl ManifestTask {
    /// Explicit fields are kept verbatim, even when empty, so malformed
    /// entries surface in verification instead of being silently repaired.
    fn into_descriptor(self, folder: &str) -> TaskDescriptor {
        match self {
            ManifestTask::Name(name) => TaskDescriptor::from_name(folder, &name),
            ManifestTask::Full(raw) => {
                let folder = raw.problem_folder.unwrap_or_else(|| folder.to_string());
                let mut task = TaskDescriptor::from_name(&folder, &raw.name);
                if let Some(language) = raw.language {
                    task.language = language;
                }
                if let Some(bddl_file) = raw.bddl_file {
                    task.bddl_file = bddl_file;
                }
                if let Some(init_states_file) = raw.init_states_file {
                    task.init_states_file = init_states_file;
                }
                task
            }
        }
    }
}
