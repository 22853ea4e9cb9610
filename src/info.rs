use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::core::container::read_info;

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Input .etca file
    #[arg(short, long)]
    pub input: PathBuf,
}

/// Print header and metadata of a container. The payload is never read.
pub fn run(args: InfoArgs) -> Result<()> {
    let file = read_info(&args.input)?;

    println!("File: {}", args.input.display());
    println!("Format version: {}", file.header.version);
    println!("Compression mode: {}", file.header.mode);
    println!(
        "Image dimensions: {} x {}",
        file.header.width, file.header.height
    );
    println!("Color depth: {}-bit", file.header.color_depth);

    if !file.metadata.is_empty() {
        println!("Metadata ({} bytes):", file.header.metadata_size);
        for (key, value) in file.metadata.iter() {
            println!("  {key} = {value}");
        }
    }

    Ok(())
}
