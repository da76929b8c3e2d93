//! Raster image thumbnailing.
//!
//! Decode, scale, re-encode. The output format always matches the source
//! format, so a PNG source yields a PNG thumbnail and browsers never see a
//! mismatched extension.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use image::imageops::FilterType;
use image::{GenericImageView, ImageFormat};
use std::io::Cursor;
use tracing::instrument;

/// Scales raster images down to a fixed target width.
///
/// Only JPEG, PNG and GIF are recognized; the format is sniffed from the
/// bytes, never trusted from the file extension. Anything else is
/// [`ErrorKind::UnsupportedFormat`].
///
/// # Examples
///
/// ```no_run
/// use vitrine_thumb::BitmapThumbnailer;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let thumbnailer = BitmapThumbnailer::new(160);
/// let source = std::fs::read("beach.jpg")?;
/// let thumbnail = thumbnailer.render(&source)?;
/// std::fs::write("cache/images/beach.jpg", thumbnail)?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Copy, Debug)]
pub struct BitmapThumbnailer {
    width: u32,
}
impl BitmapThumbnailer {
    pub fn new(width: u32) -> Self {
        Self { width }
    }

    /// The configured target width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Produce an encoded thumbnail from encoded source bytes.
    ///
    /// The thumbnail is exactly [`width`](Self::width) pixels wide;
    /// the height follows from [`scaled_height`](Self::scaled_height).
    /// Resampling uses Lanczos3, a smooth area-averaging filter, so
    /// downscaled thumbnails don't alias the way nearest-neighbor output
    /// would.
    #[instrument(skip_all, fields(bytes = source.len()))]
    pub fn render(&self, source: &[u8]) -> Result<Vec<u8>> {
        let format = image::guess_format(source)
            .or_raise(|| ErrorKind::UnsupportedFormat("unrecognized data".to_string()))?;
        if !matches!(format, ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::Gif) {
            exn::bail!(ErrorKind::UnsupportedFormat(format.to_mime_type().to_string()));
        }
        let decoded = image::load_from_memory_with_format(source, format).or_raise(|| ErrorKind::Decode)?;
        let (source_width, source_height) = decoded.dimensions();
        let height = Self::scaled_height(source_width, source_height, self.width);
        tracing::debug!(source_width, source_height, target_width = self.width, target_height = height);
        let scaled = decoded.resize_exact(self.width, height, FilterType::Lanczos3);
        let mut buffer = Cursor::new(Vec::new());
        scaled.write_to(&mut buffer, format).or_raise(|| ErrorKind::Encode)?;
        Ok(buffer.into_inner())
    }

    /// Proportional target height for a source of the given dimensions.
    ///
    /// `round(source_height / source_width * target_width)` — nearest-integer
    /// rounding, clamped to at least one pixel so extreme panoramas still
    /// produce a visible strip.
    pub fn scaled_height(source_width: u32, source_height: u32, target_width: u32) -> u32 {
        let exact = f64::from(source_height) / f64::from(source_width) * f64::from(target_width);
        exact.round().max(1.0) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::DynamicImage;
    use rstest::rstest;

    fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let canvas = DynamicImage::new_rgb8(width, height);
        let mut buffer = Cursor::new(Vec::new());
        canvas.write_to(&mut buffer, format).unwrap();
        buffer.into_inner()
    }

    #[rstest]
    #[case(1000, 800, 160, 128)]
    #[case(640, 480, 160, 120)]
    #[case(160, 160, 160, 160)]
    // 500/353*160 = 226.63…; truncation would give 226.
    #[case(353, 500, 160, 227)]
    // Rounds, never upscale-protects: small sources are scaled up.
    #[case(80, 60, 160, 120)]
    // Extreme panorama clamps to a single-pixel strip.
    #[case(100_000, 100, 160, 1)]
    fn height_rounds_to_nearest(
        #[case] source_width: u32,
        #[case] source_height: u32,
        #[case] target_width: u32,
        #[case] expected: u32,
    ) {
        assert_eq!(BitmapThumbnailer::scaled_height(source_width, source_height, target_width), expected);
    }

    #[rstest]
    #[case(ImageFormat::Png)]
    #[case(ImageFormat::Jpeg)]
    #[case(ImageFormat::Gif)]
    fn renders_in_source_format(#[case] format: ImageFormat) {
        let source = encoded(1000, 800, format);
        let thumbnail = BitmapThumbnailer::new(160).render(&source).unwrap();
        assert_eq!(image::guess_format(&thumbnail).unwrap(), format);
        let decoded = image::load_from_memory(&thumbnail).unwrap();
        assert_eq!(decoded.dimensions(), (160, 128));
    }

    #[test]
    fn rejects_unrecognized_bytes() {
        let error = BitmapThumbnailer::new(160).render(b"definitely not an image").unwrap_err();
        assert!(matches!(*error, ErrorKind::UnsupportedFormat(_)));
    }

    #[test]
    fn rejects_formats_outside_the_recognized_set() {
        let source = encoded(64, 64, ImageFormat::Bmp);
        let error = BitmapThumbnailer::new(160).render(&source).unwrap_err();
        assert!(matches!(*error, ErrorKind::UnsupportedFormat(_)));
    }

    #[test]
    fn rejects_truncated_source() {
        let mut source = encoded(1000, 800, ImageFormat::Png);
        source.truncate(source.len() / 2);
        let error = BitmapThumbnailer::new(160).render(&source).unwrap_err();
        assert!(matches!(*error, ErrorKind::Decode));
    }
}
