//! Hugging Face dataset repository source.
use super::DatasetSource;
use crate::error::AcquireError;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

pub const DEFAULT_ENDPOINT: &str = "https://huggingface.co";
pub const DEFAULT_REPO: &str = "yifengzhu-hf/LIBERO-datasets";
pub const DEFAULT_REVISION: &str = "main";

/// Number of demonstration files a complete suite folder holds.
pub fn expected_demo_count(dataset_id: &str) -> usize {
    match dataset_id {
        "libero_90" => 90,
        _ => 10,
    }
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    #[serde(rename = "type")]
    kind: String,
    path: String,
    #[serde(default)]
    size: Option<u64>,
}

/// Downloads suite folders from a dataset repository over HTTPS.
#[derive(Debug, Clone)]
pub struct HuggingFaceSource {
    endpoint: String,
    repo: String,
    revision: String,
}

impl Default for HuggingFaceSource {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT, DEFAULT_REPO, DEFAULT_REVISION)
    }
}

impl HuggingFaceSource {
    pub fn new(endpoint: &str, repo: &str, revision: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            repo: repo.to_string(),
            revision: revision.to_string(),
        }
    }

    fn tree_url(&self, dataset_id: &str) -> String {
        format!(
            "{}/api/datasets/{}/tree/{}/{}",
            self.endpoint, self.repo, self.revision, dataset_id
        )
    }

    fn file_url(&self, rel: &str) -> String {
        format!(
            "{}/datasets/{}/resolve/{}/{}",
            self.endpoint, self.repo, self.revision, rel
        )
    }

    fn list_files(&self, dataset_id: &str) -> Result<Vec<TreeEntry>, AcquireError> {
        let url = self.tree_url(dataset_id);
        let mut response = ureq::get(&url)
            .call()
            .map_err(|err| transport(&url, err))?;
        let entries: Vec<TreeEntry> = response
            .body_mut()
            .read_json()
            .map_err(|err| transport(&url, err))?;
        Ok(entries
            .into_iter()
            .filter(|entry| entry.kind == "file")
            .collect())
    }

    /// Stream one file into a temp file beside `dest`, then rename it into place.
    fn fetch_file(&self, entry: &TreeEntry, dest: &Path) -> Result<(), AcquireError> {
        let url = self.file_url(&entry.path);
        let dir = dest.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(|source| AcquireError::Io {
            action: "create",
            path: dir.to_path_buf(),
            source,
        })?;
        let response = ureq::get(&url)
            .call()
            .map_err(|err| transport(&url, err))?;
        let mut reader = response.into_body().into_reader();
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|source| AcquireError::Io {
            action: "create temp file in",
            path: dir.to_path_buf(),
            source,
        })?;
        let bytes = io::copy(&mut reader, &mut tmp).map_err(|err| transport(&url, err))?;
        tmp.persist(dest).map_err(|err| AcquireError::Io {
            action: "persist",
            path: dest.to_path_buf(),
            source: err.error,
        })?;
        tracing::info!(file = %dest.display(), bytes, "downloaded");
        Ok(())
    }
}

impl DatasetSource for HuggingFaceSource {
    fn check_existing(&self, root: &Path, dataset_id: &str) -> bool {
        let dir = root.join(dataset_id);
        let Ok(entries) = fs::read_dir(&dir) else {
            return false;
        };
        let count = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "hdf5"))
            .count();
        count >= expected_demo_count(dataset_id)
    }

    fn download(&self, root: &Path, dataset_id: &str) -> Result<Vec<PathBuf>, AcquireError> {
        let mut written = Vec::new();
        for entry in self.list_files(dataset_id)? {
            if !is_safe_relative(&entry.path) {
                tracing::warn!(path = %entry.path, "skipping remote path outside the dataset root");
                continue;
            }
            let dest = root.join(&entry.path);
            if let (Some(size), Ok(meta)) = (entry.size, fs::metadata(&dest)) {
                if meta.len() == size {
                    tracing::debug!(file = %dest.display(), "already downloaded");
                    continue;
                }
            }
            self.fetch_file(&entry, &dest)?;
            written.push(dest);
        }
        Ok(written)
    }
}

fn transport(url: &str, err: impl std::fmt::Display) -> AcquireError {
    AcquireError::Transport {
        url: url.to_string(),
        reason: err.to_string(),
    }
}

fn is_safe_relative(rel: &str) -> bool {
    !rel.is_empty()
        && Path::new(rel)
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}
