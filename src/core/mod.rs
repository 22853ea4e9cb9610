pub mod address;
pub mod container;
pub mod entropy;
pub mod error;
pub mod pixels;
pub mod records;
pub mod reconstruct;
pub mod subdivide;
pub mod tree;
pub mod variance;

use std::fmt;

use tracing::debug;

use crate::core::entropy::{adaptive_encode, Codec};
use crate::core::error::EtcaError;
use crate::core::pixels::PixelBuffer;
use crate::core::records::{parse_tree, serialize_tree};
use crate::core::tree::TileTree;

/// Compression mode recorded in the container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMode {
    Lossy,
    Lossless,
}

impl CompressionMode {
    pub fn as_byte(self) -> u8 {
        match self {
            CompressionMode::Lossy => 0x00,
            CompressionMode::Lossless => 0x01,
        }
    }

    /// 0x00 is lossy; any other value reads as lossless.
    pub fn from_byte(byte: u8) -> CompressionMode {
        if byte == 0x00 {
            CompressionMode::Lossy
        } else {
            CompressionMode::Lossless
        }
    }
}

impl fmt::Display for CompressionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionMode::Lossy => write!(f, "lossy"),
            CompressionMode::Lossless => write!(f, "lossless"),
        }
    }
}

/// Tunable parameters for one compression run.
#[derive(Debug, Clone)]
pub struct CompressionConfig {
    /// Regions with variance above this are subdivided. Range 0.0-1.0;
    /// lower keeps more detail and produces more tiles.
    pub variance_threshold: f64,
    /// Recursion cap for the tree build.
    pub max_tree_depth: u16,
    /// Restrict the adaptive entropy stage to RLE.
    pub prefer_speed: bool,
}

impl CompressionConfig {
    /// Lossy preset: the 0-100 quality knob maps straight onto the
    /// variance threshold (`quality / 255`).
    pub fn lossy(quality: f32) -> Self {
        CompressionConfig {
            variance_threshold: (quality as f64 / 255.0).clamp(0.0, 1.0),
            max_tree_depth: 12,
            prefer_speed: false,
        }
    }

    /// Near-lossless preset: aggressive subdivision with a deep tree.
    /// Smooth regions still collapse to one color, so this is not a
    /// bit-exact guarantee.
    pub fn lossless() -> Self {
        CompressionConfig {
            variance_threshold: 0.001,
            max_tree_depth: 24,
            prefer_speed: false,
        }
    }
}

impl Default for CompressionConfig {
    fn default() -> Self {
        CompressionConfig {
            variance_threshold: 0.05,
            max_tree_depth: 12,
            prefer_speed: false,
        }
    }
}

/// Figures from one compression run.
#[derive(Debug, Clone, Copy)]
pub struct CompressionStats {
    pub tile_count: usize,
    pub leaf_count: usize,
    pub max_depth: u16,
    /// Entropy codec the adaptive selector settled on.
    pub codec: Codec,
    /// Record-stream size before entropy coding.
    pub serialized_size: usize,
    /// Payload size after entropy coding.
    pub encoded_size: usize,
}

/// A compressed image: the entropy-coded payload plus its dimensions.
#[derive(Debug, Clone)]
pub struct CompressedImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub stats: CompressionStats,
}

/// Compress an image: build the tile tree, serialize it, entropy-code the
/// stream with the best available codec.
pub fn compress(
    image: &PixelBuffer,
    config: &CompressionConfig,
) -> Result<CompressedImage, EtcaError> {
    let mut tree = TileTree::new(image.width(), image.height());
    tree.build(image, config.variance_threshold, config.max_tree_depth);

    let serialized = serialize_tree(&tree)?;
    let encoded = adaptive_encode(&serialized, config.prefer_speed);
    let codec = encoded
        .first()
        .and_then(|&tag| Codec::from_tag(tag))
        .unwrap_or(Codec::None);

    let stats = CompressionStats {
        tile_count: tree.tile_count(),
        leaf_count: tree.leaves().len(),
        max_depth: tree.max_depth(),
        codec,
        serialized_size: serialized.len(),
        encoded_size: encoded.len(),
    };
    debug!(
        tiles = stats.tile_count,
        leaves = stats.leaf_count,
        max_depth = stats.max_depth,
        codec = codec.name(),
        serialized = stats.serialized_size,
        encoded = stats.encoded_size,
        "tree compressed"
    );

    Ok(CompressedImage {
        width: image.width(),
        height: image.height(),
        data: encoded,
        stats,
    })
}

/// Decompress a payload produced by [`compress`] back into an image.
/// `width` and `height` come from the container and must match the
/// payload's own header. `smooth` applies the 3x3 blend after painting.
pub fn decompress(
    payload: &[u8],
    width: u32,
    height: u32,
    smooth: bool,
) -> Result<PixelBuffer, EtcaError> {
    let tree = parse_tree(payload, width, height)?;
    let image = reconstruct::render(&tree);
    if smooth {
        Ok(reconstruct::smooth(&image))
    } else {
        Ok(image)
    }
}
