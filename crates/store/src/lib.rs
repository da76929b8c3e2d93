//! Thumbnail storage for vitrine.
//!
//! A thumbnail store is a flat, append-only namespace of derived artifacts
//! keyed by file name. Presence of a key is authoritative: once a thumbnail
//! exists it is never regenerated or rewritten, so the only two operations a
//! store needs are [`exists`](ThumbnailStore::exists) and
//! [`write`](ThumbnailStore::write).

pub mod error;
mod key;
mod store;

pub use crate::key::validate as validate_key;
#[cfg(feature = "mock")]
pub use crate::store::MemoryStore;
pub use crate::store::{LocalStore, ThumbnailStore};
use std::sync::Arc;

pub type StoreHandle = Arc<dyn ThumbnailStore + Send + Sync>;
