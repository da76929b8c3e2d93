//! Configuration loading and validation for vitrine.
//!
//! Three layers, later wins: compiled-in defaults, a `vitrine.toml` file
//! (an explicit `--config` path, else the working directory, else the user
//! config directory), and `VITRINE_*` environment variables. Nested keys use
//! a double underscore in the environment, e.g.
//! `VITRINE_THUMBNAIL__WIDTH=240`.

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The two media roots to scan, non-recursively.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LibraryConfig {
    pub images: PathBuf,
    pub videos: PathBuf,
}
impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            images: PathBuf::from("images"),
            videos: PathBuf::from("videos"),
        }
    }
}

/// The two flat cache directories; created on startup if absent.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    pub images: PathBuf,
    pub videos: PathBuf,
}
impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            images: PathBuf::from("cache/images"),
            videos: PathBuf::from("cache/videos"),
        }
    }
}

/// Thumbnail geometry and transcoder behavior.
///
/// The defaults are the reference values: 160px-wide image thumbnails,
/// a 160×120 video frame box, a one-second seek, and a 30-second ceiling
/// on each transcoder invocation.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ThumbnailConfig {
    /// Target width of image thumbnails; height follows the aspect ratio.
    pub width: u32,
    /// Video frame box, applied without preserving aspect ratio.
    pub frame_width: u32,
    pub frame_height: u32,
    /// Seek offset into the video before grabbing the frame.
    pub seek_seconds: u64,
    /// Kill a transcoder invocation that runs longer than this.
    pub timeout_seconds: u64,
}
impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            width: 160,
            frame_width: 160,
            frame_height: 120,
            seek_seconds: 1,
            timeout_seconds: 30,
        }
    }
}
impl ThumbnailConfig {
    pub fn seek(&self) -> Duration {
        Duration::from_secs(self.seek_seconds)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub library: LibraryConfig,
    pub cache: CacheConfig,
    pub thumbnail: ThumbnailConfig,
    /// Where the rendered page is written.
    pub output: PathBuf,
    /// Page title.
    pub title: String,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            library: LibraryConfig::default(),
            cache: CacheConfig::default(),
            thumbnail: ThumbnailConfig::default(),
            output: PathBuf::from("gallery.html"),
            title: "Gallery".to_string(),
        }
    }
}

impl Config {
    /// Load and validate the layered configuration.
    ///
    /// With an explicit path the file must exist; otherwise missing config
    /// files are fine and the defaults stand.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        match explicit {
            Some(path) => {
                if !path.is_file() {
                    exn::bail!(ErrorKind::FileNotFound(path.to_path_buf()));
                }
                figment = figment.merge(Toml::file_exact(path));
            },
            None => {
                if let Some(dirs) = ProjectDirs::from("", "", "vitrine") {
                    figment = figment.merge(Toml::file(dirs.config_dir().join("vitrine.toml")));
                }
                figment = figment.merge(Toml::file("vitrine.toml"));
            },
        }
        let config: Config = figment
            .merge(Env::prefixed("VITRINE_").split("__"))
            .extract()
            .or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        tracing::debug!(?config, "Configuration resolved");
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.thumbnail.width == 0 || self.thumbnail.frame_width == 0 || self.thumbnail.frame_height == 0 {
            exn::bail!(ErrorKind::Invalid("thumbnail dimensions must be non-zero"));
        }
        if self.thumbnail.timeout_seconds == 0 {
            exn::bail!(ErrorKind::Invalid("transcoder timeout must be non-zero"));
        }
        if self.library.images == self.library.videos {
            exn::bail!(ErrorKind::Invalid("image and video roots must differ"));
        }
        if self.cache.images == self.cache.videos {
            // Image keys and video keys can collide (pic.jpg vs pic.mp4).
            exn::bail!(ErrorKind::Invalid("image and video caches must differ"));
        }
        Ok(())
    }
}
