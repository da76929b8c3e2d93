//! vitrine: scan two media roots, refresh the thumbnail caches, and write a
//! single static gallery page.
//!
//! The pipeline is strictly one-way — discovery, cache-gated thumbnailing,
//! date bucketing, rendering — and runs to completion once per invocation.
//! Per-file problems are logged and skipped; only unusable configuration,
//! unusable cache roots, or a failed page write abort the run.

mod cli;

use clap::Parser;
use std::path::{Component, Path};
use std::process::ExitCode;
use std::sync::Arc;
use time::UtcOffset;
use vitrine_config::Config;
use vitrine_library::{DateBucket, GalleryEntry, MediaKind, Refresher, by_day, collect};
use vitrine_render::{Renderer, Section, Tile, TileKind};
use vitrine_store::{LocalStore, StoreHandle};
use vitrine_thumb::{BitmapThumbnailer, Ffmpeg, FrameSize};

fn main() -> ExitCode {
    let args = cli::Args::parse();
    telemetry(&args);
    // The local offset has to be resolved before the runtime exists: the
    // lookup is refused once the process has more than one thread.
    let offset = UtcOffset::current_local_offset().unwrap_or_else(|error| {
        tracing::warn!(%error, "Local UTC offset unavailable; bucketing dates in UTC");
        UtcOffset::UTC
    });
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            tracing::error!(%error, "Cannot start async runtime");
            return ExitCode::FAILURE;
        },
    };
    runtime.block_on(run(args, offset))
}

fn telemetry(args: &cli::Args) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(args.log_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

async fn run(args: cli::Args, offset: UtcOffset) -> ExitCode {
    let config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(error) => {
            tracing::error!(?error, "Configuration unusable");
            return ExitCode::FAILURE;
        },
    };

    // Cache roots are load-bearing; refuse to run without them.
    let images: StoreHandle = match LocalStore::new("image-cache", &config.cache.images) {
        Ok(store) => Arc::new(store),
        Err(error) => {
            tracing::error!(?error, "Image cache unusable");
            return ExitCode::FAILURE;
        },
    };
    let videos: StoreHandle = match LocalStore::new("video-cache", &config.cache.videos) {
        Ok(store) => Arc::new(store),
        Err(error) => {
            tracing::error!(?error, "Video cache unusable");
            return ExitCode::FAILURE;
        },
    };

    // A broken embedded template should surface before the thumbnail work,
    // not after it.
    let renderer = match Renderer::new() {
        Ok(renderer) => renderer,
        Err(error) => {
            tracing::error!(?error, "Page renderer unusable");
            return ExitCode::FAILURE;
        },
    };

    let mut refresher = Refresher::new(images, videos, BitmapThumbnailer::new(config.thumbnail.width));
    match Ffmpeg::discover(config.thumbnail.timeout()) {
        Ok(ffmpeg) => {
            refresher = refresher.with_extractor(
                Arc::new(ffmpeg),
                config.thumbnail.seek(),
                FrameSize {
                    width: config.thumbnail.frame_width,
                    height: config.thumbnail.frame_height,
                },
            );
        },
        // Reported once, up front. Every video this run is then skipped
        // while images proceed normally.
        Err(error) => tracing::error!(?error, "Video thumbnails disabled for this run"),
    }

    let files = collect(&config.library.images, &config.library.videos).await;
    let refresh = refresher.run(files).await;
    tracing::info!(
        cached = refresh.report.cached,
        generated = refresh.report.generated,
        failed = refresh.report.failed,
        skipped = refresh.report.skipped,
        "Thumbnail refresh complete"
    );

    let sections = sections(&config, by_day(refresh.entries, offset));
    let html = match renderer.render(&config.title, &sections) {
        Ok(html) => html,
        Err(error) => {
            tracing::error!(?error, "Page rendering failed");
            return ExitCode::FAILURE;
        },
    };
    if let Err(error) = tokio::fs::write(&config.output, html).await {
        tracing::error!(output = %config.output.display(), %error, "Cannot write gallery page");
        return ExitCode::FAILURE;
    }
    tracing::info!(output = %config.output.display(), "Gallery page written");
    ExitCode::SUCCESS
}

fn sections(config: &Config, buckets: Vec<DateBucket>) -> Vec<Section> {
    buckets
        .into_iter()
        .map(|bucket| {
            let label = bucket.label();
            Section {
                anchor: label.clone(),
                title: label,
                tiles: bucket.entries.into_iter().map(|entry| tile(config, entry)).collect(),
            }
        })
        .collect()
}

fn tile(config: &Config, entry: GalleryEntry) -> Tile {
    let (kind, source_root, cache_root) = match entry.file.kind {
        MediaKind::Image => (TileKind::Image, &config.library.images, &config.cache.images),
        MediaKind::Video => (TileKind::Video, &config.library.videos, &config.cache.videos),
    };
    Tile {
        kind,
        source: url(source_root, &entry.file.name),
        thumbnail: entry.available().then(|| url(cache_root, &entry.thumbnail)),
        name: entry.file.name,
    }
}

/// Forward-slash URL from a configured root plus a file name. Configured
/// paths land in the page as given, so relative roots keep the whole
/// output relocatable.
fn url(root: &Path, name: &str) -> String {
    let mut segments: Vec<String> = root
        .components()
        .map(|component| match component {
            Component::RootDir => String::new(),
            component => component.as_os_str().to_string_lossy().into_owned(),
        })
        .collect();
    segments.push(name.to_string());
    segments.join("/")
}
