//! The `.etca` container format.
//!
//! Layout (all multi-byte fields big-endian):
//!
//! - Header (20 bytes):
//!   ```text
//!   [0..4]   magic "ETCA"
//!   [4]      format version = 1
//!   [5]      compression mode (0x00 lossy, 0x01 lossless)
//!   [6..10]  image width  (u32)
//!   [10..14] image height (u32)
//!   [14]     color depth (0x18 = 24-bit RGB)
//!   [15..19] metadata size in bytes (u32)
//!   [19]     reserved (0x00)
//!   ```
//! - `metadata_size` bytes of UTF-8 `key=value\n` lines.
//! - The entropy-coded payload; its first byte is the codec tag.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use crate::core::error::EtcaError;
use crate::core::pixels::PixelBuffer;
use crate::core::{compress, decompress, CompressionConfig, CompressionMode, CompressionStats};

pub const ETCA_MAGIC: [u8; 4] = *b"ETCA";
pub const ETCA_VERSION: u8 = 1;
pub const HEADER_SIZE: usize = 20;
pub const COLOR_DEPTH_RGB24: u8 = 0x18;

/// The fixed 20-byte container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EtcaHeader {
    pub version: u8,
    pub mode: CompressionMode,
    pub width: u32,
    pub height: u32,
    pub color_depth: u8,
    pub metadata_size: u32,
}

impl EtcaHeader {
    pub fn new(mode: CompressionMode, width: u32, height: u32, metadata_size: u32) -> Self {
        EtcaHeader {
            version: ETCA_VERSION,
            mode,
            width,
            height,
            color_depth: COLOR_DEPTH_RGB24,
            metadata_size,
        }
    }

    pub fn serialize(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(&ETCA_MAGIC);
        out[4] = self.version;
        out[5] = self.mode.as_byte();
        out[6..10].copy_from_slice(&self.width.to_be_bytes());
        out[10..14].copy_from_slice(&self.height.to_be_bytes());
        out[14] = self.color_depth;
        out[15..19].copy_from_slice(&self.metadata_size.to_be_bytes());
        // [19] reserved, already zero
        out
    }

    /// Parse and validate a header. The magic check comes first so garbage
    /// input fails fast without touching the remaining fields.
    pub fn deserialize(data: &[u8]) -> Result<EtcaHeader, EtcaError> {
        if data.len() < HEADER_SIZE {
            return Err(EtcaError::Truncated("container header"));
        }
        if data[0..4] != ETCA_MAGIC {
            return Err(EtcaError::BadMagic);
        }
        let version = data[4];
        if version != ETCA_VERSION {
            return Err(EtcaError::UnsupportedVersion(version));
        }
        let mode = CompressionMode::from_byte(data[5]);
        let width = u32::from_be_bytes([data[6], data[7], data[8], data[9]]);
        let height = u32::from_be_bytes([data[10], data[11], data[12], data[13]]);
        let color_depth = data[14];
        let metadata_size = u32::from_be_bytes([data[15], data[16], data[17], data[18]]);

        if width == 0 || height == 0 {
            return Err(EtcaError::InvalidDimensions(width, height));
        }

        Ok(EtcaHeader {
            version,
            mode,
            width,
            height,
            color_depth,
            metadata_size,
        })
    }
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// Key/value metadata stored between the header and the payload, one
/// `key=value` line per entry. Keys sort deterministically, so serializing
/// the same map twice produces identical bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EtcaMetadata {
    entries: BTreeMap<String, String>,
}

impl EtcaMetadata {
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = String::new();
        for (key, value) in &self.entries {
            out.push_str(key);
            out.push('=');
            out.push_str(value);
            out.push('\n');
        }
        out.into_bytes()
    }

    /// Parse metadata bytes. Lines without a `=` are ignored; the value
    /// keeps any further `=` characters.
    pub fn deserialize(data: &[u8]) -> EtcaMetadata {
        let mut metadata = EtcaMetadata::default();
        for line in String::from_utf8_lossy(data).lines() {
            if line.is_empty() {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                metadata.set(key, value);
            }
        }
        metadata
    }
}

/// Header and metadata of a container, without the payload.
#[derive(Debug, Clone)]
pub struct EtcaFile {
    pub header: EtcaHeader,
    pub metadata: EtcaMetadata,
}

// ---------------------------------------------------------------------------
// File read/write
// ---------------------------------------------------------------------------

/// Compress `image` and write the complete container to `path`.
pub fn write_file(
    path: &Path,
    image: &PixelBuffer,
    mode: CompressionMode,
    config: &CompressionConfig,
    metadata: &EtcaMetadata,
) -> Result<CompressionStats, EtcaError> {
    let compressed = compress(image, config)?;
    let metadata_bytes = metadata.serialize();
    let header = EtcaHeader::new(
        mode,
        image.width(),
        image.height(),
        metadata_bytes.len() as u32,
    );

    let mut out = Vec::with_capacity(HEADER_SIZE + metadata_bytes.len() + compressed.data.len());
    out.extend_from_slice(&header.serialize());
    out.extend_from_slice(&metadata_bytes);
    out.extend_from_slice(&compressed.data);
    fs::write(path, &out)?;

    Ok(compressed.stats)
}

/// Read a container whole: header, metadata and the raw payload bytes.
pub fn read_file(path: &Path) -> Result<(EtcaFile, Vec<u8>), EtcaError> {
    let data = fs::read(path)?;
    let header = EtcaHeader::deserialize(&data)?;

    let metadata_end = HEADER_SIZE + header.metadata_size as usize;
    if data.len() < metadata_end {
        return Err(EtcaError::Truncated("metadata"));
    }
    let metadata = EtcaMetadata::deserialize(&data[HEADER_SIZE..metadata_end]);
    let payload = data[metadata_end..].to_vec();

    Ok((EtcaFile { header, metadata }, payload))
}

/// Read only the header and metadata, leaving the payload untouched.
pub fn read_info(path: &Path) -> Result<EtcaFile, EtcaError> {
    let mut file = File::open(path)?;

    let mut header_bytes = [0u8; HEADER_SIZE];
    file.read_exact(&mut header_bytes)
        .map_err(|_| EtcaError::Truncated("container header"))?;
    let header = EtcaHeader::deserialize(&header_bytes)?;

    let mut metadata_bytes = vec![0u8; header.metadata_size as usize];
    file.read_exact(&mut metadata_bytes)
        .map_err(|_| EtcaError::Truncated("metadata"))?;
    let metadata = EtcaMetadata::deserialize(&metadata_bytes);

    Ok(EtcaFile { header, metadata })
}

/// Read a container and decode it back into pixels.
pub fn decode_file(path: &Path, smooth: bool) -> Result<PixelBuffer, EtcaError> {
    let (file, payload) = read_file(path)?;
    decompress(&payload, file.header.width, file.header.height, smooth)
}
