//! Child rectangle geometry for one subdivision step.
//!
//! A tile splits into a 2x2 grid. Odd dimensions give the extra pixel to the
//! left column and top row, so the four children always cover the parent
//! exactly, with no overlap. Degenerate (zero-width or zero-height) children
//! only appear when a 1-pixel-wide or -tall region is split.

/// Number of children produced by one subdivision step.
pub const CHILDREN_PER_TILE: usize = 4;

/// Rectangle of child `index` inside a parent of the given size.
/// Returns `(x, y, width, height)` relative to the parent's origin.
/// Index order: 0 top-left, 1 top-right, 2 bottom-left, 3 bottom-right.
pub fn child_bounds(parent_width: u32, parent_height: u32, index: u32) -> (u32, u32, u32, u32) {
    let left_width = (parent_width + 1) / 2;
    let right_width = parent_width - left_width;
    let top_height = (parent_height + 1) / 2;
    let bottom_height = parent_height - top_height;

    match index {
        0 => (0, 0, left_width, top_height),
        1 => (left_width, 0, right_width, top_height),
        2 => (0, top_height, left_width, bottom_height),
        3 => (left_width, top_height, right_width, bottom_height),
        // Out-of-range indices only occur in malformed streams; clamp to a
        // unit rectangle rather than fail.
        _ => (0, 0, 1, 1),
    }
}
