//! Media discovery.
//!
//! Each media root is listed exactly one level deep — the reference layout
//! keeps all originals directly under the two roots — and filtered by a fixed
//! extension set per media kind. Listing order is filesystem order; no
//! sorting happens here (date buckets preserve it as insertion order).

use crate::error::{ErrorKind, Result};
use async_stream::stream;
use exn::ResultExt;
use futures::{Stream, StreamExt, pin_mut};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tokio::fs::DirEntry;

/// What a source file is, and therefore which thumbnailer and cache it uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}
impl MediaKind {
    /// File extensions recognized for this kind, lowercase.
    pub const fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Image => &["jpg", "jpeg", "png", "gif"],
            Self::Video => &["mp4"],
        }
    }

    /// Case-insensitive extension check.
    pub fn matches(self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions().contains(&ext.to_ascii_lowercase().as_str()))
    }
}

/// A source file discovered under one of the media roots.
///
/// Immutable for the run; owned by the filesystem, read-only to vitrine.
#[derive(Clone, Debug)]
pub struct MediaFile {
    /// Full path as discovered (root joined with the entry name).
    pub path: PathBuf,
    /// Bare file name, used for thumbnail key derivation and display.
    pub name: String,
    pub kind: MediaKind,
    /// Last-modified timestamp from filesystem metadata.
    pub modified: OffsetDateTime,
}

/// List one media root, non-recursively, yielding matching files in
/// filesystem order.
///
/// A root that cannot be listed at all yields a single
/// [`ErrorKind::Scan`]; individual entries that cannot be inspected are
/// logged and skipped so one unreadable file never hides the rest.
pub fn scan_root(root: &Path, kind: MediaKind) -> impl Stream<Item = Result<MediaFile>> + '_ {
    stream! {
        let mut entries = match tokio::fs::read_dir(root).await.or_raise(|| ErrorKind::Scan(root.to_path_buf())) {
            Ok(entries) => entries,
            Err(error) => {
                yield Err(error);
                return;
            },
        };
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    if let Some(file) = inspect_entry(entry, kind).await {
                        yield Ok(file);
                    }
                },
                Ok(None) => break,
                Err(error) => {
                    let failure: Result<MediaFile> = Err(error).or_raise(|| ErrorKind::Scan(root.to_path_buf()));
                    yield failure;
                    break;
                },
            }
        }
    }
}

/// Turn a directory entry into a [`MediaFile`], or `None` when it isn't one
/// (wrong extension, not a regular file, unreadable metadata).
async fn inspect_entry(entry: DirEntry, kind: MediaKind) -> Option<MediaFile> {
    let path = entry.path();
    if !kind.matches(&path) {
        return None;
    }
    let metadata = match entry.metadata().await {
        Ok(metadata) => metadata,
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "Skipping unreadable entry");
            return None;
        },
    };
    if !metadata.is_file() {
        // Note: silently drop directories that happen to carry a media
        // extension, and most likely broken symlinks.
        return None;
    }
    let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
        tracing::warn!(path = %path.display(), "Skipping file with non-UTF-8 name");
        return None;
    };
    let modified = match metadata.modified() {
        Ok(modified) => OffsetDateTime::from(modified),
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "Skipping file without modification time");
            return None;
        },
    };
    Some(MediaFile { path, name, kind, modified })
}

/// Discover everything under both roots: images first, then videos, each in
/// filesystem order.
///
/// An unlistable root is reported and contributes nothing — a gallery with a
/// missing videos directory still renders its images.
pub async fn collect(images_root: &Path, videos_root: &Path) -> Vec<MediaFile> {
    let mut files = Vec::new();
    for (root, kind) in [(images_root, MediaKind::Image), (videos_root, MediaKind::Video)] {
        let entries = scan_root(root, kind);
        pin_mut!(entries);
        while let Some(item) = entries.next().await {
            match item {
                Ok(file) => files.push(file),
                Err(error) => tracing::error!(root = %root.display(), ?error, "Media root not listable"),
            }
        }
    }
    tracing::debug!(count = files.len(), "Discovery complete");
    files
}
