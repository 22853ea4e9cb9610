use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Args;
use tracing::info;

use crate::core::container::{write_file, EtcaMetadata};
use crate::core::{CompressionConfig, CompressionMode};
use crate::image_io;

#[derive(Args, Debug)]
pub struct CompressArgs {
    /// Input image file (PNG, PPM, ...)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output .etca file (default: input path with an .etca extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Near-lossless preset (threshold 0.001, tree depth 24)
    #[arg(long)]
    pub lossless: bool,

    /// Compression quality, 0-100. Lower keeps more detail.
    #[arg(long, default_value_t = 10.0)]
    pub quality: f32,

    /// Author recorded in the container metadata
    #[arg(long)]
    pub author: Option<String>,

    /// Only try the RLE entropy codec (faster, usually larger output)
    #[arg(long)]
    pub fast: bool,
}

pub fn run(args: CompressArgs) -> Result<()> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_extension("etca"));

    let image = image_io::load_rgb(&args.input)?;
    info!(
        "compressing {} ({}x{}) to {}",
        args.input.display(),
        image.width(),
        image.height(),
        output.display()
    );

    let mode = if args.lossless {
        CompressionMode::Lossless
    } else {
        CompressionMode::Lossy
    };
    let mut config = match mode {
        CompressionMode::Lossless => CompressionConfig::lossless(),
        CompressionMode::Lossy => CompressionConfig::lossy(args.quality),
    };
    config.prefer_speed = args.fast;

    let mut metadata = EtcaMetadata::default();
    if let Some(author) = &args.author {
        metadata.set("author", author);
    }
    metadata.set("compression_mode", mode.to_string());

    let start = Instant::now();
    let stats = write_file(&output, &image, mode, &config, &metadata)?;
    let elapsed = start.elapsed();

    let raw_size = image.width() as u64 * image.height() as u64 * 3;
    let ratio = raw_size as f64 / stats.encoded_size.max(1) as f64;
    info!(
        "done in {:.2?}: {} tiles ({} leaves, depth {}), codec {}, {} -> {} bytes ({:.2}x vs raw)",
        elapsed,
        stats.tile_count,
        stats.leaf_count,
        stats.max_depth,
        stats.codec.name(),
        stats.serialized_size,
        stats.encoded_size,
        ratio
    );

    Ok(())
}
