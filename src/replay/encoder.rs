//! Video encoding through an external `ffmpeg` process.
//!
//! Raw frames are piped to the encoder's stdin. The process is spawned on the
//! first frame, once the frame size is known.
use super::{FrameShape, FrameSink};
use crate::error::ReplayError;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

/// Encoder command override, e.g. `LIBERO_FFMPEG="ffmpeg -threads 2"`.
pub const FFMPEG_ENV: &str = "LIBERO_FFMPEG";

/// Streams frames into a video file at a fixed frame rate.
pub struct FfmpegSink {
    command: Vec<String>,
    output: PathBuf,
    fps: u32,
    child: Option<Child>,
    shape: Option<FrameShape>,
    frames: usize,
}

impl FfmpegSink {
    /// Use `$LIBERO_FFMPEG` when set, otherwise `ffmpeg` from `PATH`.
    pub fn new(output: &Path, fps: u32) -> Result<Self, ReplayError> {
        Ok(Self::with_command(encoder_command()?, output, fps))
    }

    /// Use an explicit encoder argv; encoding arguments are appended to it.
    pub fn with_command(command: Vec<String>, output: &Path, fps: u32) -> Self {
        Self {
            command,
            output: output.to_path_buf(),
            fps,
            child: None,
            shape: None,
            frames: 0,
        }
    }

    pub fn frames_written(&self) -> usize {
        self.frames
    }

    fn encode_args(&self, shape: FrameShape) -> Result<Vec<String>, ReplayError> {
        let pix_fmt = match shape.channels {
            1 => "gray",
            3 => "rgb24",
            4 => "rgba",
            other => {
                return Err(ReplayError::Encode(format!(
                    "unsupported channel count {other}"
                )))
            }
        };
        let mut args: Vec<String> = [
            "-y",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            pix_fmt,
            "-s",
        ]
        .iter()
        .map(|arg| arg.to_string())
        .collect();
        args.push(format!("{}x{}", shape.width, shape.height));
        args.push("-r".to_string());
        args.push(self.fps.to_string());
        args.extend(["-i", "-", "-an"].iter().map(|arg| arg.to_string()));
        // yuv420p needs even dimensions.
        if shape.width % 2 == 0 && shape.height % 2 == 0 {
            args.push("-pix_fmt".to_string());
            args.push("yuv420p".to_string());
        }
        args.push(self.output.display().to_string());
        Ok(args)
    }

    fn spawn(&mut self, shape: FrameShape) -> Result<(), ReplayError> {
        let args = self.encode_args(shape)?;
        let (program, prefix) = self
            .command
            .split_first()
            .ok_or_else(|| ReplayError::Encode("encoder command is empty".to_string()))?;
        tracing::debug!(program, output = %self.output.display(), fps = self.fps, "starting encoder");
        let child = Command::new(program)
            .args(prefix)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| ReplayError::Encode(format!("spawn {program}: {err}")))?;
        self.shape = Some(shape);
        self.child = Some(child);
        Ok(())
    }

    fn wait(&mut self) -> Result<(), ReplayError> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        drop(child.stdin.take());
        let output = child
            .wait_with_output()
            .map_err(|err| ReplayError::Encode(format!("wait for encoder: {err}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr.trim();
            return Err(ReplayError::Encode(if detail.is_empty() {
                format!("encoder exited with {}", output.status)
            } else {
                detail.to_string()
            }));
        }
        Ok(())
    }
}

impl FrameSink for FfmpegSink {
    fn write_frame(&mut self, frame: &[u8], shape: FrameShape) -> Result<(), ReplayError> {
        if let Some(expected) = self.shape {
            if expected != shape {
                return Err(ReplayError::Encode(format!(
                    "frame shape changed from {expected:?} to {shape:?}"
                )));
            }
        }
        if self.child.is_none() {
            self.spawn(shape)?;
        }
        let stdin = self
            .child
            .as_mut()
            .and_then(|child| child.stdin.as_mut())
            .ok_or_else(|| ReplayError::Encode("encoder stdin closed".to_string()))?;
        if let Err(err) = stdin.write_all(frame) {
            // The encoder's own message explains a broken pipe better.
            self.wait()?;
            return Err(ReplayError::Encode(format!("write frame: {err}")));
        }
        self.frames += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ReplayError> {
        if self.child.is_none() {
            return Err(ReplayError::Encode(format!(
                "no frames to encode; nothing written to {}",
                self.output.display()
            )));
        }
        self.wait()?;
        tracing::info!(output = %self.output.display(), frames = self.frames, fps = self.fps, "video written");
        Ok(())
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn encoder_command() -> Result<Vec<String>, ReplayError> {
    if let Ok(raw) = std::env::var(FFMPEG_ENV) {
        let argv = shell_words::split(&raw)
            .map_err(|err| ReplayError::Encode(format!("parse {FFMPEG_ENV}: {err}")))?;
        if argv.is_empty() {
            return Err(ReplayError::Encode(format!("{FFMPEG_ENV} is empty")));
        }
        return Ok(argv);
    }
    let ffmpeg = which::which("ffmpeg")
        .map_err(|err| ReplayError::Encode(format!("ffmpeg not found on PATH: {err}")))?;
    Ok(vec![ffmpeg.display().to_string()])
}
