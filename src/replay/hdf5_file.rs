//! HDF5-backed demonstration container.
use super::{DemoContainer, FrameStream};
use crate::error::ReplayError;
use std::path::{Path, PathBuf};

/// Read-only handle; the file is closed when this is dropped.
pub struct Hdf5DemoFile {
    path: PathBuf,
    file: hdf5::File,
}

impl Hdf5DemoFile {
    pub fn open(path: &Path) -> Result<Self, ReplayError> {
        let file = hdf5::File::open(path).map_err(|err| ReplayError::FileUnreadable {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        tracing::debug!(file = %path.display(), "opened demonstration file");
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    fn unreadable(&self, err: impl std::fmt::Display) -> ReplayError {
        ReplayError::FileUnreadable {
            path: self.path.clone(),
            reason: err.to_string(),
        }
    }

    fn obs_group(&self, episode: &str) -> Result<hdf5::Group, ReplayError> {
        self.file
            .group(&format!("data/{episode}/obs"))
            .map_err(|err| self.unreadable(err))
    }

    fn dataset(&self, episode: &str, stream: &str) -> Result<hdf5::Dataset, ReplayError> {
        self.obs_group(episode)?
            .dataset(stream)
            .map_err(|err| self.unreadable(err))
    }
}

impl DemoContainer for Hdf5DemoFile {
    fn episode_ids(&self) -> Result<Vec<String>, ReplayError> {
        let data = self.file.group("data").map_err(|err| self.unreadable(err))?;
        data.member_names().map_err(|err| self.unreadable(err))
    }

    fn stream_names(&self, episode: &str) -> Result<Vec<String>, ReplayError> {
        self.obs_group(episode)?
            .member_names()
            .map_err(|err| self.unreadable(err))
    }

    fn read_stream(&self, episode: &str, stream: &str) -> Result<FrameStream, ReplayError> {
        let dataset = self.dataset(episode, stream)?;
        let dims = dataset.shape();
        let data: Vec<u8> = dataset.read_raw().map_err(|err| self.unreadable(err))?;
        FrameStream::from_dims(&dims, data)
            .map_err(|reason| self.unreadable(format!("{episode}/obs/{stream}: {reason}")))
    }

    fn stream_len(&self, episode: &str, stream: &str) -> Result<usize, ReplayError> {
        let dataset = self.dataset(episode, stream)?;
        Ok(dataset.shape().first().copied().unwrap_or(0))
    }
}
