//! Single-frame extraction from video files.
//!
//! Videos are thumbnailed by an external transcoder, not in-process: the
//! binary is discovered on the search path once per run, and each extraction
//! spawns one child process bounded by a deadline.

use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::instrument;

/// Pixel dimensions of the extracted frame.
///
/// The frame is scaled into this box without preserving aspect ratio; a
/// distorted preview tile is an accepted simplification, not a defect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}
impl std::fmt::Display for FrameSize {
    /// Formats as the `WIDTHxHEIGHT` string the transcoder expects.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Narrow seam over the external transcoder, so tests can swap in a fake and
/// the pipeline never needs to know how frames are produced.
#[async_trait]
pub trait FrameExtractor: Send + Sync {
    /// Extract exactly one frame from `source` at `offset`, scaled to `size`,
    /// returned as encoded JPEG bytes.
    async fn extract(&self, source: &Path, offset: Duration, size: FrameSize) -> Result<Vec<u8>>;
}

/// The real transcoder: an `ffmpeg` (or `avconv`) binary on the search path.
pub struct Ffmpeg {
    binary: PathBuf,
    timeout: Duration,
}
impl Ffmpeg {
    /// Locate a usable transcoder executable.
    ///
    /// This probe runs before any extraction so a missing dependency is
    /// reported once, up front, as [`ErrorKind::TranscoderNotFound`] — not
    /// rediscovered file by file as generic spawn failures.
    pub fn discover(timeout: Duration) -> Result<Self> {
        // TODO: ffmpeg.exe discovery on Windows is untested.
        let executables = ["ffmpeg", "avconv"];
        for exe in executables {
            if let Ok(binary) = which::which(exe) {
                tracing::debug!(binary = %binary.display(), "Frame extractor discovered");
                return Ok(Self { binary, timeout });
            }
        }
        tracing::info!("No frame extractor found in PATH; video thumbnails unavailable");
        exn::bail!(ErrorKind::TranscoderNotFound);
    }

    /// `HH:MM:SS` seek argument from a duration.
    fn seek_argument(offset: Duration) -> String {
        let total = offset.as_secs();
        format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
    }
}

#[async_trait]
impl FrameExtractor for Ffmpeg {
    #[instrument(skip(self), fields(binary = %self.binary.display()))]
    async fn extract(&self, source: &Path, offset: Duration, size: FrameSize) -> Result<Vec<u8>> {
        let mut command = Command::new(&self.binary);
        command
            .arg("-hide_banner")
            .args(["-loglevel", "error"])
            .args(["-ss", &Self::seek_argument(offset)])
            .arg("-i")
            .arg(source)
            .args(["-frames:v", "1"])
            .args(["-s", &size.to_string()])
            // One JPEG to stdout; the caller decides where the bytes land.
            .args(["-f", "image2pipe", "-c:v", "mjpeg", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| ErrorKind::TranscodeTimeout)?
            .map_err(ErrorKind::Io)?;
        if !output.status.success() {
            let detail = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(source = %source.display(), detail = %detail.trim(), "Frame extraction failed");
            exn::bail!(ErrorKind::TranscodeFailed(output.status.code().unwrap_or(-1)));
        }
        if output.stdout.is_empty() {
            exn::bail!(ErrorKind::EmptyFrame);
        }
        Ok(output.stdout)
    }
}

/// Programmable [`FrameExtractor`] for tests: fixed outcome, call counter.
#[cfg(feature = "mock")]
pub struct MockExtractor {
    outcome: std::result::Result<Vec<u8>, ()>,
    calls: std::sync::atomic::AtomicUsize,
}
#[cfg(feature = "mock")]
impl MockExtractor {
    /// Every extraction succeeds with the given bytes.
    pub fn returning(frame: impl Into<Vec<u8>>) -> Self {
        Self {
            outcome: Ok(frame.into()),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Every extraction fails as if the transcoder exited non-zero.
    pub fn failing() -> Self {
        Self {
            outcome: Err(()),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Number of [`extract`](FrameExtractor::extract) calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}
#[cfg(feature = "mock")]
#[async_trait]
impl FrameExtractor for MockExtractor {
    async fn extract(&self, _source: &Path, _offset: Duration, _size: FrameSize) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        match &self.outcome {
            Ok(frame) => Ok(frame.clone()),
            Err(()) => Err(ErrorKind::TranscodeFailed(1).into()),
        }
    }
}
