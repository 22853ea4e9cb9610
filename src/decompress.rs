use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Args;
use tracing::info;

use crate::core::container::decode_file;
use crate::image_io;

#[derive(Args, Debug)]
pub struct DecompressArgs {
    /// Input .etca file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output image file (PNG, PPM, ...)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Blend each pixel with its 3x3 neighborhood after reconstruction
    /// to soften tile seams
    #[arg(long)]
    pub smooth: bool,
}

pub fn run(args: DecompressArgs) -> Result<()> {
    info!(
        "decompressing {} to {}",
        args.input.display(),
        args.output.display()
    );

    let start = Instant::now();
    let image = decode_file(&args.input, args.smooth)?;
    image_io::save_rgb(&args.output, &image)?;
    let elapsed = start.elapsed();

    info!(
        "done in {:.2?}: {}x{} pixels",
        elapsed,
        image.width(),
        image.height()
    );
    Ok(())
}
