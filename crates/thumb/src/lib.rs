//! Thumbnail generation for vitrine.
//!
//! Two independent generators live here:
//!
//! - [`BitmapThumbnailer`] — decodes a raster image (JPEG, PNG or GIF),
//!   scales it proportionally to a fixed target width with a smooth filter,
//!   and re-encodes it in the source's own format.
//! - [`FrameExtractor`] implementations — pull a single still frame out of a
//!   video by shelling out to an external transcoder ([`Ffmpeg`]), bounded by
//!   a timeout so a hung child process cannot stall the whole run.
//!
//! Both produce encoded bytes; persisting them is the caller's business
//! (normally through a `vitrine-store` thumbnail store, which provides the
//! atomic no-clobber write).

mod bitmap;
pub mod error;
mod frame;

pub use crate::bitmap::BitmapThumbnailer;
#[cfg(feature = "mock")]
pub use crate::frame::MockExtractor;
pub use crate::frame::{Ffmpeg, FrameExtractor, FrameSize};
