use std::fs;
use std::path::PathBuf;

use etca::core::container::{
    decode_file, read_info, write_file, EtcaHeader, EtcaMetadata, HEADER_SIZE,
};
use etca::core::error::EtcaError;
use etca::core::{compress, decompress, CompressionConfig, CompressionMode};
use etca::{PixelBuffer, Rgb};

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(name);
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_uniform_gray_end_to_end() {
    // A flat image collapses to the root tile alone and reconstructs
    // byte-for-byte.
    let mut image = PixelBuffer::new(8, 8);
    image.fill(Rgb::new(128, 128, 128));

    let config = CompressionConfig {
        variance_threshold: 0.05,
        max_tree_depth: 4,
        prefer_speed: false,
    };
    let compressed = compress(&image, &config).unwrap();
    assert_eq!(compressed.stats.tile_count, 1);
    assert_eq!(compressed.stats.leaf_count, 1);
    assert_eq!(compressed.stats.max_depth, 0);
    // 14-byte tree header plus a single 9-byte record.
    assert_eq!(compressed.stats.serialized_size, 23);

    let decoded = decompress(&compressed.data, 8, 8, false).unwrap();
    assert_eq!(decoded, image);
}

#[test]
fn test_checkerboard_end_to_end() {
    let mut image = PixelBuffer::new(2, 2);
    image.set(0, 0, Rgb::new(255, 0, 0));
    image.set(1, 1, Rgb::new(255, 0, 0));

    let config = CompressionConfig {
        variance_threshold: 0.01,
        max_tree_depth: 1,
        prefer_speed: false,
    };
    let compressed = compress(&image, &config).unwrap();
    assert_eq!(compressed.stats.tile_count, 5);
    assert_eq!(compressed.stats.leaf_count, 4);
    assert_eq!(compressed.stats.max_depth, 1);

    let decoded = decompress(&compressed.data, 2, 2, false).unwrap();
    assert_eq!(decoded, image);
}

#[test]
fn test_container_file_roundtrip_with_metadata() {
    let dir = temp_dir("etca_it_roundtrip");
    let path = dir.join("image.etca");

    let mut image = PixelBuffer::new(16, 16);
    for y in 0..16 {
        for x in 0..16 {
            image.set(x, y, Rgb::new((x * 16) as u8, (y * 16) as u8, 60));
        }
    }

    let mut metadata = EtcaMetadata::default();
    metadata.set("author", "integration test");
    metadata.set("compression_mode", "lossy");

    write_file(
        &path,
        &image,
        CompressionMode::Lossy,
        &CompressionConfig::lossy(10.0),
        &metadata,
    )
    .unwrap();

    let info = read_info(&path).unwrap();
    assert_eq!(info.header.width, 16);
    assert_eq!(info.header.height, 16);
    assert_eq!(info.header.version, 1);
    assert_eq!(info.header.mode, CompressionMode::Lossy);
    assert_eq!(info.header.color_depth, 0x18);
    assert_eq!(info.metadata.get("author"), Some("integration test"));
    assert_eq!(info.metadata.get("compression_mode"), Some("lossy"));

    let decoded = decode_file(&path, false).unwrap();
    assert_eq!(decoded.width(), 16);
    assert_eq!(decoded.height(), 16);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_near_lossless_reconstructs_small_noise_exactly() {
    // With the near-lossless preset an 8x8 noise patch subdivides down to
    // single pixels, so reconstruction is exact.
    let mut image = PixelBuffer::new(8, 8);
    for y in 0..8 {
        for x in 0..8 {
            let v = ((x * 97 + y * 41 + 13) % 256) as u8;
            image.set(x, y, Rgb::new(v, v.wrapping_mul(7), v.wrapping_add(100)));
        }
    }

    let compressed = compress(&image, &CompressionConfig::lossless()).unwrap();
    let decoded = decompress(&compressed.data, 8, 8, false).unwrap();
    assert_eq!(decoded, image);
}

#[test]
fn test_lower_quality_means_fewer_tiles() {
    let mut image = PixelBuffer::new(32, 32);
    for y in 0..32 {
        for x in 0..32 {
            image.set(x, y, Rgb::new((x * 8) as u8, (y * 8) as u8, ((x + y) * 4) as u8));
        }
    }

    let fine = compress(&image, &CompressionConfig::lossy(2.0)).unwrap();
    let coarse = compress(&image, &CompressionConfig::lossy(80.0)).unwrap();
    assert!(coarse.stats.tile_count < fine.stats.tile_count);
}

#[test]
fn test_smoothing_flag_changes_output() {
    let mut image = PixelBuffer::new(8, 8);
    for y in 0..8 {
        for x in 0..4 {
            image.set(x, y, Rgb::new(255, 255, 255));
        }
    }

    let compressed = compress(&image, &CompressionConfig::lossy(5.0)).unwrap();
    let plain = decompress(&compressed.data, 8, 8, false).unwrap();
    let smoothed = decompress(&compressed.data, 8, 8, true).unwrap();
    assert_ne!(plain, smoothed);
}

#[test]
fn test_bad_magic_file_is_rejected() {
    let dir = temp_dir("etca_it_bad_magic");
    let path = dir.join("garbage.etca");
    fs::write(&path, [0xFFu8; 64]).unwrap();

    assert!(matches!(read_info(&path), Err(EtcaError::BadMagic)));
    assert!(matches!(decode_file(&path, false), Err(EtcaError::BadMagic)));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_truncated_payload_is_rejected() {
    let dir = temp_dir("etca_it_truncated");
    let path = dir.join("cut.etca");

    let mut image = PixelBuffer::new(4, 4);
    image.set(0, 0, Rgb::new(200, 10, 10));
    image.set(3, 3, Rgb::new(10, 200, 10));
    write_file(
        &path,
        &image,
        CompressionMode::Lossy,
        &CompressionConfig::lossy(1.0),
        &EtcaMetadata::default(),
    )
    .unwrap();

    // Drop the tail of the payload; some parse step must come up short.
    let data = fs::read(&path).unwrap();
    fs::write(&path, &data[..data.len() - 6]).unwrap();

    assert!(matches!(
        decode_file(&path, false),
        Err(EtcaError::Truncated(_))
    ));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_dimension_mismatch_between_container_and_payload() {
    let dir = temp_dir("etca_it_dim_mismatch");
    let path = dir.join("lying_header.etca");

    let mut image = PixelBuffer::new(4, 4);
    image.fill(Rgb::new(50, 60, 70));
    write_file(
        &path,
        &image,
        CompressionMode::Lossy,
        &CompressionConfig::lossy(10.0),
        &EtcaMetadata::default(),
    )
    .unwrap();

    // Rewrite the container header to claim different dimensions.
    let mut data = fs::read(&path).unwrap();
    let forged = EtcaHeader::new(CompressionMode::Lossy, 8, 8, 0).serialize();
    data[..HEADER_SIZE].copy_from_slice(&forged);
    fs::write(&path, &data).unwrap();

    assert!(matches!(
        decode_file(&path, false),
        Err(EtcaError::DimensionMismatch { .. })
    ));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_missing_file_surfaces_io_error() {
    let path = PathBuf::from("/nonexistent/etca/input.etca");
    assert!(matches!(read_info(&path), Err(EtcaError::Io(_))));
}
