//! Image reconstruction from a decoded tile tree.

use rayon::prelude::*;

use crate::core::address::TileAddress;
use crate::core::pixels::{PixelBuffer, Rgb};
use crate::core::subdivide::child_bounds;
use crate::core::tree::TileTree;

/// Pixel rectangle of a tile, found by applying the child geometry along its
/// address starting from the full image.
pub fn tile_bounds(address: &TileAddress, width: u32, height: u32) -> (u32, u32, u32, u32) {
    let (mut x, mut y, mut w, mut h) = (0, 0, width, height);
    for &segment in address.segments() {
        let (cx, cy, cw, ch) = child_bounds(w, h, segment);
        x += cx;
        y += cy;
        w = cw;
        h = ch;
    }
    (x, y, w, h)
}

/// Paint every leaf rectangle with the leaf's stored color.
///
/// Leaf rectangles partition the image, so resolving them is data-parallel;
/// the fill itself is a cheap sequential pass. Leaves without an address
/// (possible in malformed streams) are skipped.
pub fn render(tree: &TileTree) -> PixelBuffer {
    let (width, height) = tree.dimensions();
    let mut image = PixelBuffer::new(width, height);

    let leaves = tree.leaves();
    let regions: Vec<(u32, u32, u32, u32, Rgb)> = leaves
        .par_iter()
        .filter_map(|&id| {
            let tile = tree.get(id)?;
            let address = tree.address(id)?;
            let (x, y, w, h) = tile_bounds(address, width, height);
            Some((x, y, w, h, tile.color()))
        })
        .collect();

    for (x, y, w, h, color) in regions {
        let end_x = (x.saturating_add(w)).min(width);
        let end_y = (y.saturating_add(h)).min(height);
        for py in y..end_y {
            for px in x..end_x {
                image.set(px, py, color);
            }
        }
    }
    image
}

/// 3x3 neighborhood blend over the whole image: each output pixel is half
/// the center plus the 8-connected neighbors at 1/16 each. Neighbors
/// missing at the borders drop out of both the sum and the weight.
///
/// Applied everywhere, not only at tile seams, so it also softens edges
/// inside uniform tiles; that matches the reference decoder.
pub fn smooth(image: &PixelBuffer) -> PixelBuffer {
    const CENTER_WEIGHT: f32 = 0.5;
    const NEIGHBOR_WEIGHT: f32 = 0.5 / 8.0;
    const OFFSETS: [(i64, i64); 8] = [
        (-1, -1),
        (0, -1),
        (1, -1),
        (-1, 0),
        (1, 0),
        (-1, 1),
        (0, 1),
        (1, 1),
    ];

    let width = image.width();
    let height = image.height();
    let mut out = image.clone();

    for y in 0..height {
        for x in 0..width {
            let center = image.get(x, y);
            let mut blend_r = center.r as f32 * CENTER_WEIGHT;
            let mut blend_g = center.g as f32 * CENTER_WEIGHT;
            let mut blend_b = center.b as f32 * CENTER_WEIGHT;
            let mut weight = CENTER_WEIGHT;

            for (dx, dy) in OFFSETS {
                let nx = x as i64 + dx;
                let ny = y as i64 + dy;
                if nx >= 0 && nx < width as i64 && ny >= 0 && ny < height as i64 {
                    let neighbor = image.get(nx as u32, ny as u32);
                    blend_r += neighbor.r as f32 * NEIGHBOR_WEIGHT;
                    blend_g += neighbor.g as f32 * NEIGHBOR_WEIGHT;
                    blend_b += neighbor.b as f32 * NEIGHBOR_WEIGHT;
                    weight += NEIGHBOR_WEIGHT;
                }
            }

            out.set(
                x,
                y,
                Rgb::new(
                    (blend_r / weight) as u8,
                    (blend_g / weight) as u8,
                    (blend_b / weight) as u8,
                ),
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tree::TileTree;

    #[test]
    fn test_tile_bounds_walks_the_address() {
        // 8x8 image: child 3 of the root is (4,4,4,4); its child 0 is the
        // top-left quarter of that, (4,4,2,2).
        let address = TileAddress::from_segments(vec![3, 0]);
        assert_eq!(tile_bounds(&address, 8, 8), (4, 4, 2, 2));
        assert_eq!(tile_bounds(&TileAddress::root(), 8, 8), (0, 0, 8, 8));
    }

    #[test]
    fn test_render_uniform_tree() {
        let mut image = PixelBuffer::new(8, 8);
        image.fill(Rgb::new(100, 150, 200));
        let mut tree = TileTree::new(8, 8);
        tree.build(&image, 0.05, 4);

        let rendered = render(&tree);
        assert_eq!(rendered, image);
    }

    #[test]
    fn test_render_checkerboard_tree() {
        let mut image = PixelBuffer::new(2, 2);
        image.set(0, 0, Rgb::new(255, 0, 0));
        image.set(1, 1, Rgb::new(255, 0, 0));
        let mut tree = TileTree::new(2, 2);
        tree.build(&image, 0.01, 1);

        let rendered = render(&tree);
        assert_eq!(rendered, image);
    }

    #[test]
    fn test_leaf_rectangles_cover_image_exactly() {
        let mut image = PixelBuffer::new(7, 5);
        for y in 0..5 {
            for x in 0..7 {
                let v = ((x * 53 + y * 19) % 256) as u8;
                image.set(x, y, Rgb::new(v, v.wrapping_add(80), v.wrapping_mul(5)));
            }
        }
        let mut tree = TileTree::new(7, 5);
        tree.build(&image, 0.01, 3);

        let mut claimed = vec![0u32; 35];
        for id in tree.leaves() {
            let address = tree.address(id).unwrap();
            let (x, y, w, h) = tile_bounds(address, 7, 5);
            for py in y..y + h {
                for px in x..x + w {
                    claimed[(py * 7 + px) as usize] += 1;
                }
            }
        }
        assert!(claimed.iter().all(|&c| c == 1));
    }

    #[test]
    fn test_smooth_keeps_flat_regions_flat() {
        let mut image = PixelBuffer::new(4, 4);
        image.fill(Rgb::new(90, 90, 90));
        let smoothed = smooth(&image);
        // All neighbors equal the center, so the blend is the identity.
        assert_eq!(smoothed, image);
    }

    #[test]
    fn test_smooth_blends_an_edge() {
        // Left half black, right half white: pixels at the seam move
        // toward the other side, corners stay within range.
        let mut image = PixelBuffer::new(4, 4);
        for y in 0..4 {
            for x in 2..4 {
                image.set(x, y, Rgb::new(255, 255, 255));
            }
        }
        let smoothed = smooth(&image);
        let seam_left = smoothed.get(1, 1);
        let seam_right = smoothed.get(2, 1);
        assert!(seam_left.r > 0 && seam_left.r < 128);
        assert!(seam_right.r > 128 && seam_right.r < 255);
    }
}
