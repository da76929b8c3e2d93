//! Render Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A render error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for render operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// All of these indicate a broken build artifact (missing or invalid
/// embedded asset), not bad runtime input — the page data itself cannot
/// fail to render.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Embedded asset was not found or is not valid UTF-8.
    #[display("embedded asset unusable: {_0}")]
    AssetNotFound(#[error(not(source))] String),
    /// The page template failed to compile or render.
    #[display("gallery template error")]
    Template,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
