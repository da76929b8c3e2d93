//! Media library pipeline for vitrine.
//!
//! Everything between the filesystem and the renderer lives here:
//! [`scan`]ning the two media roots, the cache-gated thumbnail
//! [`refresh`] over whatever was discovered, and [`group`]ing the results
//! into date buckets for the page. Data flows one way — discovery, then
//! thumbnailing, then grouping — and nothing here is persisted between runs;
//! the thumbnail caches on disk are the only state.

pub mod error;
pub mod group;
pub mod refresh;
pub mod scan;

pub use crate::group::{DateBucket, by_day};
pub use crate::refresh::{Effort, GalleryEntry, Refresh, RefreshReport, Refresher, thumbnail_key};
pub use crate::scan::{MediaFile, MediaKind, collect, scan_root};
