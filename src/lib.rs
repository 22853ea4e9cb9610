pub mod core;

pub mod compress;
pub mod decompress;
pub mod image_io;
pub mod info;

pub use crate::core::container::{EtcaFile, EtcaHeader, EtcaMetadata};
pub use crate::core::error::EtcaError;
pub use crate::core::pixels::{PixelBuffer, Rgb};
pub use crate::core::{CompressionConfig, CompressionMode, CompressionStats};
