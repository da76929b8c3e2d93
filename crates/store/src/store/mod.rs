//! Thumbnail store trait and implementations.

mod local;
#[cfg(feature = "mock")]
mod memory;

pub use self::local::LocalStore;
#[cfg(feature = "mock")]
pub use self::memory::MemoryStore;
use crate::error::Result;
use async_trait::async_trait;

/// Flat, append-only namespace of derived thumbnails keyed by file name.
///
/// Existence of a key is the only staleness signal this system has: there is
/// no content hash and no modification-time comparison, so a thumbnail is
/// never regenerated once it has been written. Implementations must therefore
/// guarantee that [`write`](Self::write) never replaces an existing artifact.
///
/// # Examples
///
/// ```no_run
/// use vitrine_store::{LocalStore, ThumbnailStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = LocalStore::new("image-cache", "/srv/gallery/cache/images")?;
/// if !store.exists("beach.jpg").await? {
///     store.write("beach.jpg", b"...encoded thumbnail...").await?;
/// }
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait ThumbnailStore: Send + Sync {
    /// Name of the configured store (used for logging only).
    fn name(&self) -> &str;

    /// Check whether a thumbnail already exists for `key`.
    ///
    /// Pure check: no content validation, no side effects. This gates every
    /// thumbnailer invocation, making repeated runs idempotent.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Persist `bytes` under `key`, atomically, without clobbering.
    ///
    /// The write must be all-or-nothing: a crash or error mid-write may not
    /// leave a partial artifact at `key`. If another writer won the race for
    /// the same key, the call reports success and the existing artifact is
    /// left untouched.
    async fn write(&self, key: &str, bytes: &[u8]) -> Result<()>;
}
