//! Shared test infrastructure for integration tests.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Task fields as printed by `tasks --json`.
#[derive(Debug, Deserialize)]
pub struct Task {
    pub name: String,
    pub problem_folder: String,
    pub bddl_file: String,
    pub init_states_file: String,
}

/// Runs the binary against a private config directory and benchmark root.
pub struct Harness {
    pub dir: TempDir,
}

impl Harness {
    /// Fresh config dir with the benchmark root overridden into the temp dir.
    pub fn isolated() -> Self {
        let harness = Self::bare();
        let root = harness.benchmark_root();
        let output = harness.run(&["set-root", root.to_str().expect("utf-8 temp path")]);
        assert!(output.status.success(), "set-root failed: {}", stderr(&output));
        harness
    }

    /// Fresh config dir without an override.
    pub fn bare() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn config_dir(&self) -> PathBuf {
        self.dir.path().join("config")
    }

    pub fn benchmark_root(&self) -> PathBuf {
        self.dir.path().join("assets").join("libero")
    }

    pub fn datasets_root(&self) -> PathBuf {
        self.dir.path().join("assets").join("datasets")
    }

    pub fn command(&self) -> Command {
        let mut command = Command::new(env!("CARGO_BIN_EXE_libero-harness"));
        command
            .env("LIBERO_CONFIG_PATH", self.config_dir())
            .env_remove("RUST_LOG")
            .env_remove("LIBERO_FFMPEG");
        command
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.command().args(args).output().expect("run libero-harness")
    }

    pub fn tasks(&self, benchmark: &str) -> Vec<Task> {
        let output = self.run(&["tasks", "--benchmark", benchmark, "--json"]);
        assert!(output.status.success(), "tasks failed: {}", stderr(&output));
        serde_json::from_slice(&output.stdout).expect("parse tasks json")
    }

    /// Create every asset file of `task` under the overridden root.
    pub fn populate(&self, task: &Task) {
        let root = self.benchmark_root();
        touch(&root.join("bddl_files").join(&task.problem_folder).join(&task.bddl_file));
        touch(
            &root
                .join("init_files")
                .join(&task.problem_folder)
                .join(&task.init_states_file),
        );
        touch(&self.demo_path(task));
    }

    pub fn demo_path(&self, task: &Task) -> PathBuf {
        self.datasets_root()
            .join(&task.problem_folder)
            .join(format!("{}_demo.hdf5", task.name))
    }
}

pub fn touch(path: &Path) {
    std::fs::create_dir_all(path.parent().expect("parent dir")).expect("create parent dir");
    std::fs::write(path, b"fixture").expect("write fixture");
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
