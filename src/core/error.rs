use std::io;

use thiserror::Error;

/// Errors surfaced by container parsing and the encode/decode pipeline.
///
/// Every variant is fatal to the current call; no partial results are
/// returned. Malformed interior data that can still be skipped (dangling
/// child indices, out-of-range match distances) does not produce an error.
#[derive(Debug, Error)]
pub enum EtcaError {
    #[error("not an .etca file: bad magic bytes")]
    BadMagic,

    #[error("unsupported .etca format version {0}")]
    UnsupportedVersion(u8),

    #[error("truncated input while reading {0}")]
    Truncated(&'static str),

    #[error("invalid image dimensions {0}x{1}")]
    InvalidDimensions(u32, u32),

    #[error(
        "dimension mismatch: container says {container_width}x{container_height}, \
         payload says {payload_width}x{payload_height}"
    )]
    DimensionMismatch {
        container_width: u32,
        container_height: u32,
        payload_width: u32,
        payload_height: u32,
    },

    #[error("tree has {0} tiles, more than the record format can index")]
    TreeTooLarge(usize),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
