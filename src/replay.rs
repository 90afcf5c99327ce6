//! Demonstration replay.
//!
//! A demonstration file is a hierarchical container keyed by
//! `data/demo_<index>/obs/<stream>`. Replay reads one image stream of one
//! episode, flips every frame vertically (recordings are stored upside down
//! relative to display orientation), and hands the frames to a [`FrameSink`]
//! in stored order.
use crate::error::ReplayError;
use serde::Serialize;
use std::path::Path;

mod encoder;
#[cfg(feature = "hdf5")]
mod hdf5_file;
mod info;

pub use encoder::{FfmpegSink, FFMPEG_ENV};
pub use info::{dataset_info, DatasetInfo, EpisodeInfo, FrameStats};

/// Fixed output frame rate.
pub const REPLAY_FPS: u32 = 60;

/// Default stream replayed when none is requested.
pub const DEFAULT_STREAM: &str = "agentview_rgb";

/// Dimensions shared by every frame of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameShape {
    pub height: usize,
    pub width: usize,
    pub channels: usize,
}

impl FrameShape {
    pub fn row_len(&self) -> usize {
        self.width * self.channels
    }

    pub fn frame_len(&self) -> usize {
        self.height * self.row_len()
    }
}

/// Frames of one observation stream, stored contiguously so every frame has
/// the same shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameStream {
    shape: FrameShape,
    data: Vec<u8>,
}

impl FrameStream {
    pub fn new(shape: FrameShape, data: Vec<u8>) -> Result<Self, String> {
        let frame_len = shape.frame_len();
        if frame_len == 0 {
            return Err(format!("frame shape {shape:?} has no pixels"));
        }
        if data.len() % frame_len != 0 {
            return Err(format!(
                "{} bytes is not a whole number of {}x{}x{} frames",
                data.len(),
                shape.height,
                shape.width,
                shape.channels
            ));
        }
        Ok(Self { shape, data })
    }

    /// Build from container dimensions: `(frames, height, width[, channels])`.
    pub fn from_dims(dims: &[usize], data: Vec<u8>) -> Result<Self, String> {
        let shape = match dims {
            [_, height, width] => FrameShape {
                height: *height,
                width: *width,
                channels: 1,
            },
            [_, height, width, channels] => FrameShape {
                height: *height,
                width: *width,
                channels: *channels,
            },
            other => return Err(format!("expected a (frames, height, width[, channels]) stream, got {other:?}")),
        };
        Self::new(shape, data)
    }

    pub fn shape(&self) -> FrameShape {
        self.shape
    }

    pub fn len(&self) -> usize {
        self.data.len() / self.shape.frame_len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Frames in stored order.
    pub fn frames(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact(self.shape.frame_len())
    }
}

/// Reverse the row order of one frame. A frame without pixels is returned
/// unchanged.
pub fn flip_vertical(frame: &[u8], shape: FrameShape) -> Vec<u8> {
    if shape.row_len() == 0 {
        return frame.to_vec();
    }
    let mut flipped = Vec::with_capacity(frame.len());
    for row in frame.chunks_exact(shape.row_len()).rev() {
        flipped.extend_from_slice(row);
    }
    flipped
}

/// Read-only view of a demonstration container.
pub trait DemoContainer {
    fn episode_ids(&self) -> Result<Vec<String>, ReplayError>;

    fn stream_names(&self, episode: &str) -> Result<Vec<String>, ReplayError>;

    fn read_stream(&self, episode: &str, stream: &str) -> Result<FrameStream, ReplayError>;

    /// Frame count of a stream; backends should override to avoid a full read.
    fn stream_len(&self, episode: &str, stream: &str) -> Result<usize, ReplayError> {
        Ok(self.read_stream(episode, stream)?.len())
    }
}

/// Receives flipped frames in order.
pub trait FrameSink {
    fn write_frame(&mut self, frame: &[u8], shape: FrameShape) -> Result<(), ReplayError>;

    fn finish(&mut self) -> Result<(), ReplayError>;
}

/// `demo_<index>`
pub fn episode_id(index: usize) -> String {
    format!("demo_{index}")
}

/// The one documented stream alias across dataset format versions.
pub fn stream_alias(name: &str) -> Option<&'static str> {
    match name {
        "agentview_image" => Some("agentview_rgb"),
        "agentview_rgb" => Some("agentview_image"),
        _ => None,
    }
}

/// One recorded episode; streams must be resolved before they are read.
pub struct DemoEpisode<'a, C: ?Sized> {
    container: &'a C,
    index: usize,
    id: String,
}

impl<'a, C: DemoContainer + ?Sized> DemoEpisode<'a, C> {
    pub fn open(container: &'a C, index: usize) -> Result<Self, ReplayError> {
        let id = episode_id(index);
        let available = container.episode_ids()?;
        if !available.contains(&id) {
            return Err(ReplayError::EpisodeNotFound {
                episode: id,
                available: summarize(&available),
            });
        }
        Ok(Self {
            container,
            index,
            id,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn stream_names(&self) -> Result<Vec<String>, ReplayError> {
        self.container.stream_names(&self.id)
    }

    /// Return the stored name for `requested`, trying its alias second.
    pub fn resolve_stream(&self, requested: &str) -> Result<String, ReplayError> {
        let names = self.stream_names()?;
        if names.iter().any(|name| name == requested) {
            return Ok(requested.to_string());
        }
        if let Some(alias) = stream_alias(requested) {
            if names.iter().any(|name| name == alias) {
                tracing::debug!(requested, alias, episode = %self.id, "using stream alias");
                return Ok(alias.to_string());
            }
        }
        Err(ReplayError::StreamNotFound {
            episode: self.id.clone(),
            stream: requested.to_string(),
            available: summarize(&names),
        })
    }

    pub fn read_stream(&self, requested: &str) -> Result<FrameStream, ReplayError> {
        let name = self.resolve_stream(requested)?;
        self.container.read_stream(&self.id, &name)
    }
}

fn summarize(names: &[String]) -> String {
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}

/// Replay one episode stream from an open container into `sink`.
pub fn replay_episode<C, S>(
    container: &C,
    episode_index: usize,
    stream: &str,
    sink: &mut S,
) -> Result<usize, ReplayError>
where
    C: DemoContainer + ?Sized,
    S: FrameSink + ?Sized,
{
    let episode = DemoEpisode::open(container, episode_index)?;
    let frames = episode.read_stream(stream)?;
    let shape = frames.shape();
    for frame in frames.frames() {
        sink.write_frame(&flip_vertical(frame, shape), shape)?;
    }
    sink.finish()?;
    tracing::info!(
        episode = episode.id(),
        stream,
        frames = frames.len(),
        "episode replayed"
    );
    Ok(frames.len())
}

/// Open a demonstration file read-only. The handle is released on drop.
pub fn open_demo_file(path: &Path) -> Result<Box<dyn DemoContainer>, ReplayError> {
    if !path.is_file() {
        return Err(ReplayError::FileUnreadable {
            path: path.to_path_buf(),
            reason: "no such file".to_string(),
        });
    }
    open_backend(path)
}

#[cfg(feature = "hdf5")]
fn open_backend(path: &Path) -> Result<Box<dyn DemoContainer>, ReplayError> {
    Ok(Box::new(hdf5_file::Hdf5DemoFile::open(path)?))
}

#[cfg(not(feature = "hdf5"))]
fn open_backend(path: &Path) -> Result<Box<dyn DemoContainer>, ReplayError> {
    Err(ReplayError::FileUnreadable {
        path: path.to_path_buf(),
        reason: "built without the `hdf5` feature".to_string(),
    })
}

/// Replay `data/demo_<episode_index>/obs/<stream>` of `file_path` into a
/// video at `output_path`, returning the number of frames written. An empty
/// stream is an `Encode` error since no video can be produced.
pub fn replay(
    file_path: &Path,
    episode_index: usize,
    stream: &str,
    output_path: &Path,
) -> Result<usize, ReplayError> {
    let container = open_demo_file(file_path)?;
    let mut sink = FfmpegSink::new(output_path, REPLAY_FPS)?;
    replay_episode(container.as_ref(), episode_index, stream, &mut sink)
}

#[cfg(test)]
#[path = "replay_tests.rs"]
mod tests;
