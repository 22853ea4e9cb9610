use rayon::prelude::*;

use crate::core::pixels::PixelBuffer;

/// Color variance of a region, as the mean of per-channel normalized
/// standard deviations. Each channel contributes
/// `sqrt(mean((p - mean)^2)) / 255`, so the result lands in [0, 1].
/// An empty region has zero variance.
pub fn region_variance(region: &PixelBuffer) -> f64 {
    let (var_r, var_g, var_b) = channel_variance(region);
    (var_r + var_g + var_b) / 3.0
}

/// Per-channel normalized standard deviation of a region.
///
/// Both reductions are associative sums, so they fan out across the
/// rayon pool for large regions.
pub fn channel_variance(region: &PixelBuffer) -> (f64, f64, f64) {
    let pixels = region.pixels();
    if pixels.is_empty() {
        return (0.0, 0.0, 0.0);
    }
    let count = pixels.len() as f64;

    let (sum_r, sum_g, sum_b) = pixels
        .par_iter()
        .map(|p| (p.r as f64, p.g as f64, p.b as f64))
        .reduce(
            || (0.0, 0.0, 0.0),
            |a, b| (a.0 + b.0, a.1 + b.1, a.2 + b.2),
        );
    let mean_r = sum_r / count;
    let mean_g = sum_g / count;
    let mean_b = sum_b / count;

    let (sq_r, sq_g, sq_b) = pixels
        .par_iter()
        .map(|p| {
            let dr = p.r as f64 - mean_r;
            let dg = p.g as f64 - mean_g;
            let db = p.b as f64 - mean_b;
            (dr * dr, dg * dg, db * db)
        })
        .reduce(
            || (0.0, 0.0, 0.0),
            |a, b| (a.0 + b.0, a.1 + b.1, a.2 + b.2),
        );

    (
        (sq_r / count).sqrt() / 255.0,
        (sq_g / count).sqrt() / 255.0,
        (sq_b / count).sqrt() / 255.0,
    )
}

/// The subdivision predicate: regions above the threshold get split.
pub fn should_subdivide(region: &PixelBuffer, threshold: f64) -> bool {
    region_variance(region) > threshold
}
