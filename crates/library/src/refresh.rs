//! The cache-gated thumbnail refresh pipeline.
//!
//! One pass, sequential, over the discovered files: derive the thumbnail
//! key, ask the store whether it already exists, and only generate on a
//! miss. Existence is the whole staleness model — a thumbnail is never
//! regenerated once written — so a second run over an unchanged tree does
//! zero work beyond the existence checks.
//!
//! Per-file failures are logged and recorded, never propagated: a corrupt
//! photo or a transcoder crash must not take the rest of the gallery down
//! with it.

use crate::scan::{MediaFile, MediaKind};
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;
use vitrine_store::StoreHandle;
use vitrine_thumb::error::{ErrorKind as ThumbErrorKind, Result as ThumbResult};
use vitrine_thumb::{BitmapThumbnailer, FrameExtractor, FrameSize};

/// Indicates how much work was required for one file's thumbnail.
///
/// Distinguishes cache hits from actual generation work, which is useful for
/// reporting and for asserting idempotence in tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effort {
    /// The thumbnail already existed; no thumbnailer was invoked.
    Cached,
    /// A thumbnail was generated and written this run.
    Generated,
    /// Generation was attempted and failed; the file renders without a
    /// thumbnail and the failure has been logged.
    Failed,
    /// A video encountered while no frame extractor is available.
    Skipped,
}

/// One discovered file plus the outcome of its thumbnail refresh.
#[derive(Debug)]
pub struct GalleryEntry {
    pub file: MediaFile,
    /// Key of the (expected) thumbnail in the kind's cache.
    pub thumbnail: String,
    pub effort: Effort,
}
impl GalleryEntry {
    /// Whether the renderer can point at a real thumbnail for this entry.
    pub fn available(&self) -> bool {
        matches!(self.effort, Effort::Cached | Effort::Generated)
    }
}

/// Tallies for the end-of-run summary log line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub cached: usize,
    pub generated: usize,
    pub failed: usize,
    pub skipped: usize,
}
impl RefreshReport {
    fn record(&mut self, effort: Effort) {
        match effort {
            Effort::Cached => self.cached += 1,
            Effort::Generated => self.generated += 1,
            Effort::Failed => self.failed += 1,
            Effort::Skipped => self.skipped += 1,
        }
    }
}

/// The result of refreshing every discovered file.
pub struct Refresh {
    /// One entry per input file, input order preserved.
    pub entries: Vec<GalleryEntry>,
    pub report: RefreshReport,
}

/// Cache key for a file's thumbnail.
///
/// Images keep their full file name (extension included) so the thumbnail's
/// format matches its name; video stills are always JPEG, so the video's
/// extension is replaced with `.jpg`.
pub fn thumbnail_key(file: &MediaFile) -> String {
    match file.kind {
        MediaKind::Image => file.name.clone(),
        MediaKind::Video => {
            let stem = file.name.rsplit_once('.').map_or(file.name.as_str(), |(stem, _)| stem);
            format!("{stem}.jpg")
        },
    }
}

struct FrameJob {
    extractor: Arc<dyn FrameExtractor>,
    seek: Duration,
    size: FrameSize,
}

/// Runs the refresh pass against a pair of stores and the thumbnailers.
///
/// Construct with the two cache stores and the bitmap thumbnailer, then
/// attach a [`FrameExtractor`] if one was discovered — without it every
/// video is recorded as [`Effort::Skipped`] (the caller reports the missing
/// dependency once, up front).
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use vitrine_library::{Refresher, collect};
/// use vitrine_store::LocalStore;
/// use vitrine_thumb::{BitmapThumbnailer, Ffmpeg, FrameSize};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let refresher = Refresher::new(
///     Arc::new(LocalStore::new("image-cache", "cache/images")?),
///     Arc::new(LocalStore::new("video-cache", "cache/videos")?),
///     BitmapThumbnailer::new(160),
/// )
/// .with_extractor(
///     Arc::new(Ffmpeg::discover(Duration::from_secs(30))?),
///     Duration::from_secs(1),
///     FrameSize { width: 160, height: 120 },
/// );
/// let files = collect("images".as_ref(), "videos".as_ref()).await;
/// let refresh = refresher.run(files).await;
/// println!("{} generated", refresh.report.generated);
/// # Ok(())
/// # }
/// ```
pub struct Refresher {
    images: StoreHandle,
    videos: StoreHandle,
    bitmap: BitmapThumbnailer,
    video: Option<FrameJob>,
}
impl Refresher {
    pub fn new(images: StoreHandle, videos: StoreHandle, bitmap: BitmapThumbnailer) -> Self {
        Self { images, videos, bitmap, video: None }
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn FrameExtractor>, seek: Duration, size: FrameSize) -> Self {
        self.video = Some(FrameJob { extractor, seek, size });
        self
    }

    /// Refresh every file, sequentially, in input order.
    #[instrument(skip_all, fields(files = files.len()))]
    pub async fn run(&self, files: Vec<MediaFile>) -> Refresh {
        let mut entries = Vec::with_capacity(files.len());
        let mut report = RefreshReport::default();
        for file in files {
            let key = thumbnail_key(&file);
            let store = match file.kind {
                MediaKind::Image => &self.images,
                MediaKind::Video => &self.videos,
            };
            let effort = match store.exists(&key).await {
                Ok(true) => Effort::Cached,
                Ok(false) => self.generate(&file, &key, store).await,
                Err(error) => {
                    tracing::warn!(file = %file.path.display(), ?error, "Cache check failed");
                    Effort::Failed
                },
            };
            report.record(effort);
            entries.push(GalleryEntry { file, thumbnail: key, effort });
        }
        tracing::debug!(?report, "Refresh pass complete");
        Refresh { entries, report }
    }

    async fn generate(&self, file: &MediaFile, key: &str, store: &StoreHandle) -> Effort {
        let produced = match file.kind {
            MediaKind::Image => self.render_bitmap(file).await,
            MediaKind::Video => match &self.video {
                Some(job) => job.extractor.extract(&file.path, job.seek, job.size).await,
                None => {
                    tracing::debug!(file = %file.path.display(), "No frame extractor; video thumbnail skipped");
                    return Effort::Skipped;
                },
            },
        };
        let bytes = match produced {
            Ok(bytes) => bytes,
            Err(error) => {
                tracing::warn!(file = %file.path.display(), ?error, "Thumbnail generation failed");
                return Effort::Failed;
            },
        };
        match store.write(key, &bytes).await {
            Ok(()) => {
                tracing::info!(store = store.name(), key, "Thumbnail generated");
                Effort::Generated
            },
            Err(error) => {
                tracing::warn!(store = store.name(), key, ?error, "Thumbnail write failed");
                Effort::Failed
            },
        }
    }

    /// Read + decode/scale/encode for one image, off the async thread.
    async fn render_bitmap(&self, file: &MediaFile) -> ThumbResult<Vec<u8>> {
        let source = tokio::fs::read(&file.path).await.map_err(ThumbErrorKind::Io)?;
        let bitmap = self.bitmap;
        tokio::task::spawn_blocking(move || bitmap.render(&source))
            .await
            .map_err(|e| ThumbErrorKind::Io(std::io::Error::other(e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Cursor;
    use std::path::Path;
    use time::OffsetDateTime;
    use vitrine_store::MemoryStore;
    use vitrine_store::ThumbnailStore;
    use vitrine_thumb::MockExtractor;

    fn media(path: impl Into<std::path::PathBuf>, kind: MediaKind) -> MediaFile {
        let path = path.into();
        let name = path.file_name().unwrap().to_str().unwrap().to_string();
        MediaFile { path, name, kind, modified: OffsetDateTime::UNIX_EPOCH }
    }

    fn write_png(path: &Path, width: u32, height: u32) {
        let canvas = image::DynamicImage::new_rgb8(width, height);
        let mut buffer = Cursor::new(Vec::new());
        canvas.write_to(&mut buffer, image::ImageFormat::Png).unwrap();
        std::fs::write(path, buffer.into_inner()).unwrap();
    }

    #[rstest]
    #[case("pic.jpg", MediaKind::Image, "pic.jpg")]
    #[case("PIC.JPEG", MediaKind::Image, "PIC.JPEG")]
    #[case("clip.mp4", MediaKind::Video, "clip.jpg")]
    #[case("holiday.take2.mp4", MediaKind::Video, "holiday.take2.jpg")]
    fn key_derivation(#[case] name: &str, #[case] kind: MediaKind, #[case] expected: &str) {
        assert_eq!(thumbnail_key(&media(name, kind)), expected);
    }

    #[tokio::test]
    async fn cache_hit_never_invokes_a_thumbnailer() {
        let images: Arc<MemoryStore> = Arc::new(MemoryStore::with_keys(["pic.jpg"]));
        let videos: Arc<MemoryStore> = Arc::new(MemoryStore::with_keys(["clip.jpg"]));
        let extractor = Arc::new(MockExtractor::returning(b"jpeg".to_vec()));
        let refresher = Refresher::new(images.clone(), videos.clone(), BitmapThumbnailer::new(160)).with_extractor(
            extractor.clone(),
            Duration::from_secs(1),
            FrameSize { width: 160, height: 120 },
        );

        // Neither source file exists on disk; a cache hit must short-circuit
        // before anything tries to read them.
        let refresh = refresher
            .run(vec![media("/nowhere/pic.jpg", MediaKind::Image), media("/nowhere/clip.mp4", MediaKind::Video)])
            .await;

        assert_eq!(extractor.calls(), 0);
        assert_eq!(images.writes() + videos.writes(), 0);
        assert_eq!(refresh.report, RefreshReport { cached: 2, ..Default::default() });
    }

    #[tokio::test]
    async fn generates_image_thumbnails_on_miss() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("photo.png");
        write_png(&source, 1000, 800);
        let images: Arc<MemoryStore> = Arc::new(MemoryStore::default());
        let videos: Arc<MemoryStore> = Arc::new(MemoryStore::default());
        let refresher = Refresher::new(images.clone(), videos, BitmapThumbnailer::new(160));

        let refresh = refresher.run(vec![media(source, MediaKind::Image)]).await;

        assert_eq!(refresh.report, RefreshReport { generated: 1, ..Default::default() });
        assert!(refresh.entries[0].available());
        let thumbnail = images.get("photo.png").await.unwrap();
        let decoded = image::load_from_memory(&thumbnail).unwrap();
        assert_eq!(image::GenericImageView::dimensions(&decoded), (160, 128));
    }

    #[tokio::test]
    async fn second_run_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("photo.png"), 320, 240);
        let images: Arc<MemoryStore> = Arc::new(MemoryStore::default());
        let videos: Arc<MemoryStore> = Arc::new(MemoryStore::default());
        let refresher = Refresher::new(images.clone(), videos, BitmapThumbnailer::new(160));
        let files = || vec![media(dir.path().join("photo.png"), MediaKind::Image)];

        let first = refresher.run(files()).await;
        assert_eq!(first.report.generated, 1);
        assert_eq!(images.writes(), 1);

        let second = refresher.run(files()).await;
        assert_eq!(second.report, RefreshReport { cached: 1, ..Default::default() });
        assert_eq!(images.writes(), 1);
    }

    #[tokio::test]
    async fn missing_extractor_skips_videos_but_not_images() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("photo.png"), 320, 240);
        let images: Arc<MemoryStore> = Arc::new(MemoryStore::default());
        let videos: Arc<MemoryStore> = Arc::new(MemoryStore::default());
        let refresher = Refresher::new(images.clone(), videos.clone(), BitmapThumbnailer::new(160));

        let refresh = refresher
            .run(vec![
                media(dir.path().join("photo.png"), MediaKind::Image),
                media("/nowhere/clip.mp4", MediaKind::Video),
            ])
            .await;

        assert_eq!(refresh.report, RefreshReport { generated: 1, skipped: 1, ..Default::default() });
        assert_eq!(videos.writes(), 0);
        assert!(!refresh.entries[1].available());
    }

    #[tokio::test]
    async fn one_failure_never_aborts_the_rest() {
        let images: Arc<MemoryStore> = Arc::new(MemoryStore::default());
        let videos: Arc<MemoryStore> = Arc::new(MemoryStore::default());
        let extractor = Arc::new(MockExtractor::failing());
        let refresher = Refresher::new(images, videos.clone(), BitmapThumbnailer::new(160)).with_extractor(
            extractor.clone(),
            Duration::from_secs(1),
            FrameSize { width: 160, height: 120 },
        );

        let refresh = refresher
            .run(vec![media("/nowhere/a.mp4", MediaKind::Video), media("/nowhere/b.mp4", MediaKind::Video)])
            .await;

        assert_eq!(extractor.calls(), 2);
        assert_eq!(refresh.report, RefreshReport { failed: 2, ..Default::default() });
        assert_eq!(refresh.entries.len(), 2);
        assert_eq!(videos.writes(), 0);
    }

    #[tokio::test]
    async fn unsupported_source_leaves_the_store_untouched() {
        let dir = tempfile::tempdir().unwrap();
        // Extension says GIF; the bytes say otherwise.
        std::fs::write(dir.path().join("fake.gif"), b"plain text, not a bitmap").unwrap();
        let images: Arc<MemoryStore> = Arc::new(MemoryStore::default());
        let videos: Arc<MemoryStore> = Arc::new(MemoryStore::default());
        let refresher = Refresher::new(images.clone(), videos, BitmapThumbnailer::new(160));

        let refresh = refresher.run(vec![media(dir.path().join("fake.gif"), MediaKind::Image)]).await;

        assert_eq!(refresh.report, RefreshReport { failed: 1, ..Default::default() });
        assert_eq!(images.writes(), 0);
        assert!(!images.exists("fake.gif").await.unwrap());
    }

    #[tokio::test]
    async fn extracted_frames_land_in_the_video_store() {
        let images: Arc<MemoryStore> = Arc::new(MemoryStore::default());
        let videos: Arc<MemoryStore> = Arc::new(MemoryStore::default());
        let extractor = Arc::new(MockExtractor::returning(b"jpeg frame".to_vec()));
        let refresher = Refresher::new(images, videos.clone(), BitmapThumbnailer::new(160)).with_extractor(
            extractor,
            Duration::from_secs(1),
            FrameSize { width: 160, height: 120 },
        );

        let refresh = refresher.run(vec![media("/nowhere/clip.mp4", MediaKind::Video)]).await;

        assert_eq!(refresh.report.generated, 1);
        assert_eq!(refresh.entries[0].thumbnail, "clip.jpg");
        assert_eq!(videos.get("clip.jpg").await.unwrap(), b"jpeg frame");
    }
}
