//! Shared fixtures for unit tests.
use crate::catalog::{AssetKind, TaskDescriptor};
use crate::error::ReplayError;
use crate::paths::PathResolver;
use crate::replay::{DemoContainer, FrameShape, FrameSink, FrameStream};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temp directory holding a benchmark root and an isolated config record.
pub(crate) struct Fixture {
    pub(crate) dir: TempDir,
    pub(crate) paths: PathResolver,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let paths = PathResolver::load_from(
            dir.path().join("config").join("config.yaml"),
            dir.path().join("install").join("libero"),
        )
        .expect("load resolver");
        Self { dir, paths }
    }

    pub(crate) fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Create every requested asset of `task` under the resolved roots.
    pub(crate) fn populate(&self, task: &TaskDescriptor, kinds: &[AssetKind]) {
        for &kind in kinds {
            touch(&self.paths.asset_path(task, kind));
        }
    }
}

pub(crate) fn touch(path: &Path) -> PathBuf {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent directory");
    }
    std::fs::write(path, b"fixture").expect("write fixture file");
    path.to_path_buf()
}

/// Sorted list of every file below `root`, for side-effect checks.
pub(crate) fn list_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries {
            let path = entry.expect("read dir entry").path();
            if path.is_dir() {
                pending.push(path);
            } else {
                files.push(path);
            }
        }
    }
    files.sort();
    files
}

/// Demonstration container held in memory: episode id -> stream name -> frames.
#[derive(Default)]
pub(crate) struct MemoryDemo {
    pub(crate) episodes: BTreeMap<String, BTreeMap<String, FrameStream>>,
}

impl MemoryDemo {
    pub(crate) fn with_stream(mut self, episode: &str, stream: &str, frames: FrameStream) -> Self {
        self.episodes
            .entry(episode.to_string())
            .or_default()
            .insert(stream.to_string(), frames);
        self
    }
}

impl DemoContainer for MemoryDemo {
    fn episode_ids(&self) -> Result<Vec<String>, ReplayError> {
        Ok(self.episodes.keys().cloned().collect())
    }

    fn stream_names(&self, episode: &str) -> Result<Vec<String>, ReplayError> {
        Ok(self
            .episodes
            .get(episode)
            .map(|streams| streams.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn read_stream(&self, episode: &str, stream: &str) -> Result<FrameStream, ReplayError> {
        self.episodes
            .get(episode)
            .and_then(|streams| streams.get(stream))
            .cloned()
            .ok_or_else(|| ReplayError::FileUnreadable {
                path: PathBuf::from("memory"),
                reason: format!("no dataset {episode}/obs/{stream}"),
            })
    }
}

/// Records every frame it receives.
#[derive(Default)]
pub(crate) struct MemorySink {
    pub(crate) frames: Vec<Vec<u8>>,
    pub(crate) shapes: Vec<FrameShape>,
    pub(crate) finished: bool,
}

impl FrameSink for MemorySink {
    fn write_frame(&mut self, frame: &[u8], shape: FrameShape) -> Result<(), ReplayError> {
        self.frames.push(frame.to_vec());
        self.shapes.push(shape);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ReplayError> {
        self.finished = true;
        Ok(())
    }
}

/// `count` frames of `height` x `width` RGB where every byte of row `r` in
/// frame `f` is `f * height + r` (mod 256).
pub(crate) fn striped_frames(count: usize, height: usize, width: usize) -> FrameStream {
    let shape = FrameShape {
        height,
        width,
        channels: 3,
    };
    let mut data = Vec::with_capacity(count * shape.frame_len());
    for frame in 0..count {
        for row in 0..height {
            let value = ((frame * height + row) % 256) as u8;
            data.resize(data.len() + shape.row_len(), value);
        }
    }
    FrameStream::new(shape, data).expect("striped frames")
}
