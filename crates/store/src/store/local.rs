//! Local filesystem thumbnail store.
//!
//! Thumbnails live as plain files directly under a single cache directory,
//! named after their source file. Writes go through a temporary file in the
//! same directory followed by an atomic no-clobber rename, so a crash never
//! leaves a corrupt thumbnail at a key the cache check would then trust.

use crate::error::{ErrorKind, Result};
use crate::key::validate as validate_key;
use crate::store::ThumbnailStore;
use async_trait::async_trait;
use std::fs::create_dir_all as sync_create_dir;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Thumbnail store backed by a flat directory on the local filesystem.
#[derive(Clone)]
pub struct LocalStore {
    name: String,
    /// Cache root; created on construction if absent.
    root: PathBuf,
}
impl LocalStore {
    /// Create a store rooted at `root`, creating the directory if absent.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Unavailable`] when the root cannot be created or
    /// exists but is not a directory. Callers should treat this as fatal:
    /// without a writable cache root the pipeline cannot do anything useful.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use vitrine_store::LocalStore;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let store = LocalStore::new("video-cache", "cache/videos")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if root.exists() {
            if !root.is_dir() {
                exn::bail!(ErrorKind::Unavailable(root));
            }
        } else {
            // Use non-async here; it'll only happen once on store
            // initialization and it's not worth the hassle of making the
            // constructor async.
            if let Err(error) = sync_create_dir(&root) {
                tracing::error!(root = %root.display(), %error, "Cannot create cache directory");
                exn::bail!(ErrorKind::Unavailable(root));
            }
        }
        Ok(Self { name: name.into(), root })
    }

    /// Absolute-ish path of a (validated) key inside the cache root.
    fn keyed_path(&self, key: &str) -> Result<PathBuf> {
        Ok(self.root.join(validate_key(key)?))
    }

    fn map_io_error(e: std::io::Error, path: &Path) -> ErrorKind {
        match e.kind() {
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
            _ => ErrorKind::Io(e),
        }
    }

    /// Blocking half of [`write`](ThumbnailStore::write): temp file in the
    /// cache root, then a no-clobber persist. The temp file must live in the
    /// same directory as the target so the rename stays on one filesystem.
    fn persist(root: &Path, target: &Path, bytes: &[u8]) -> Result<()> {
        let mut tmp = NamedTempFile::new_in(root).map_err(|e| Self::map_io_error(e, root))?;
        tmp.write_all(bytes).map_err(|e| Self::map_io_error(e, tmp.path()))?;
        tmp.flush().map_err(|e| Self::map_io_error(e, tmp.path()))?;
        match tmp.persist_noclobber(target) {
            Ok(_) => Ok(()),
            Err(persist) if persist.error.kind() == std::io::ErrorKind::AlreadyExists => {
                // Another writer got there first; the existing thumbnail wins
                // and the temp file is cleaned up on drop.
                tracing::debug!(target = %target.display(), "Thumbnail appeared concurrently; keeping existing");
                Ok(())
            },
            Err(persist) => Err(Self::map_io_error(persist.error, target).into()),
        }
    }
}

#[async_trait]
impl ThumbnailStore for LocalStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let path = self.keyed_path(key)?;
        Ok(tokio::fs::try_exists(&path).await.map_err(|e| Self::map_io_error(e, &path))?)
    }

    async fn write(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let target = self.keyed_path(key)?;
        let root = self.root.clone();
        let bytes = bytes.to_vec();
        tokio::task::spawn_blocking(move || Self::persist(&root, &target, &bytes))
            .await
            .map_err(|e| ErrorKind::Io(std::io::Error::other(e)))?
    }
}
