//! Thumbnailer Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::io::Error as IoError;

/// A thumbnailer error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for thumbnailer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// Everything except [`TranscoderNotFound`](ErrorKind::TranscoderNotFound) is
/// fatal for a single file only; callers skip the file and continue.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The source is not one of the recognized raster formats (JPEG/PNG/GIF).
    #[display("unsupported image format: {_0}")]
    UnsupportedFormat(#[error(not(source))] String),
    /// The source claimed a recognized format but would not decode.
    #[display("image could not be decoded")]
    Decode,
    /// The scaled bitmap would not re-encode.
    #[display("thumbnail could not be encoded")]
    Encode,
    /// No frame-extraction executable on the search path. Fatal for all
    /// video thumbnailing this run; image thumbnailing is unaffected.
    #[display("no frame extractor (ffmpeg) found on PATH")]
    TranscoderNotFound,
    /// The transcoder exited with a non-success status.
    #[display("frame extraction failed with exit code {_0}")]
    TranscodeFailed(#[error(not(source))] i32),
    /// The transcoder exceeded its execution deadline and was killed.
    #[display("frame extraction timed out")]
    TranscodeTimeout,
    /// The transcoder reported success but produced no image data.
    #[display("frame extraction produced no output")]
    EmptyFrame,
    /// Underlying I/O error (spawning the child, reading its output).
    #[display("I/O error: {_0}")]
    Io(IoError),
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::TranscodeTimeout)
    }
}
