//! Summary of a demonstration container.
use super::{stream_alias, DemoContainer, DEFAULT_STREAM};
use crate::error::ReplayError;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EpisodeInfo {
    pub id: String,
    /// Frames in the episode's reference stream.
    pub frames: usize,
    pub streams: Vec<String>,
}

/// Trajectory length statistics across episodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameStats {
    pub min: usize,
    pub max: usize,
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetInfo {
    pub episodes: Vec<EpisodeInfo>,
    pub total_frames: usize,
    /// `None` when the file has no episodes.
    pub frame_stats: Option<FrameStats>,
}

/// Episodes sorted by numeric index. Frame counts come from the default image
/// stream (or its alias), else from the first stream in name order.
pub fn dataset_info<C: DemoContainer + ?Sized>(container: &C) -> Result<DatasetInfo, ReplayError> {
    let mut ids = container.episode_ids()?;
    ids.sort_by_key(|id| episode_sort_key(id));

    let mut episodes = Vec::with_capacity(ids.len());
    for id in ids {
        let mut streams = container.stream_names(&id)?;
        streams.sort();
        let reference = streams
            .iter()
            .find(|name| name.as_str() == DEFAULT_STREAM)
            .or_else(|| {
                stream_alias(DEFAULT_STREAM)
                    .and_then(|alias| streams.iter().find(|name| name.as_str() == alias))
            })
            .or_else(|| streams.first());
        let frames = match reference {
            Some(name) => container.stream_len(&id, name)?,
            None => 0,
        };
        episodes.push(EpisodeInfo {
            id,
            frames,
            streams,
        });
    }
    let total_frames = episodes.iter().map(|episode| episode.frames).sum();
    let frame_stats = frame_stats(&episodes, total_frames);
    Ok(DatasetInfo {
        episodes,
        total_frames,
        frame_stats,
    })
}

fn frame_stats(episodes: &[EpisodeInfo], total_frames: usize) -> Option<FrameStats> {
    let min = episodes.iter().map(|episode| episode.frames).min()?;
    let max = episodes.iter().map(|episode| episode.frames).max()?;
    Some(FrameStats {
        min,
        max,
        mean: total_frames as f64 / episodes.len() as f64,
    })
}

/// `demo_10` sorts after `demo_9`; ids without an index sort last by name.
fn episode_sort_key(id: &str) -> (usize, String) {
    let index = id
        .strip_prefix("demo_")
        .and_then(|rest| rest.parse::<usize>().ok())
        .unwrap_or(usize::MAX);
    (index, id.to_string())
}
