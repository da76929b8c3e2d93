//! In-memory thumbnail store for testing.

use crate::error::Result;
use crate::key::validate as validate_key;
use crate::store::ThumbnailStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// In-memory thumbnail store for testing.
///
/// Keys are stored in a `HashMap` behind a [`RwLock`], so all trait methods
/// can operate on `&self` without external synchronisation. A write counter
/// lets tests assert idempotence: a second pipeline run over an unchanged
/// tree must perform zero writes.
///
/// # Examples
///
/// ```
/// use vitrine_store::{MemoryStore, ThumbnailStore};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::with_keys(["beach.jpg"]);
/// assert!(store.exists("beach.jpg").await?);
///
/// store.write("sunset.jpg", b"bytes").await?;
/// assert_eq!(store.writes(), 1);
/// # Ok(())
/// # }
/// ```
pub struct MemoryStore {
    name: String,
    storage: RwLock<HashMap<String, Vec<u8>>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    /// Create a store pre-populated with existing thumbnail keys.
    ///
    /// Panics on invalid keys. The panic is DELIBERATE: this type is intended
    /// for tests, and if test setup is wrong the test should not pass.
    pub fn with_keys(keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut map = HashMap::new();
        for key in keys {
            let key = key.into();
            let Ok(validated) = validate_key(&key) else {
                panic!("MemoryStore::with_keys: invalid key {key:?}");
            };
            map.insert(validated.to_string(), Vec::new());
        }
        Self {
            name: "memory".to_string(),
            storage: RwLock::new(map),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of successful [`write`](ThumbnailStore::write) calls so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Stored bytes for a key, if present.
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.storage.read().await.get(key).cloned()
    }
}
impl Default for MemoryStore {
    fn default() -> Self {
        let keys: [&str; 0] = [];
        Self::with_keys(keys)
    }
}

#[async_trait]
impl ThumbnailStore for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let key = validate_key(key)?;
        Ok(self.storage.read().await.contains_key(key))
    }

    async fn write(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let key = validate_key(key)?;
        let mut storage = self.storage.write().await;
        // Same no-clobber semantics as the local store: first writer wins.
        storage.entry(key.to_string()).or_insert_with(|| bytes.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counts_writes_and_keeps_first() {
        let store = MemoryStore::default();
        store.write("a.jpg", b"one").await.unwrap();
        store.write("a.jpg", b"two").await.unwrap();
        assert_eq!(store.writes(), 2);
        assert_eq!(store.get("a.jpg").await.unwrap(), b"one");
    }

    #[tokio::test]
    async fn prepopulated_keys_exist() {
        let store = MemoryStore::with_keys(["a.jpg", "b.jpg"]);
        assert!(store.exists("a.jpg").await.unwrap());
        assert!(!store.exists("c.jpg").await.unwrap());
        assert_eq!(store.writes(), 0);
    }
}
