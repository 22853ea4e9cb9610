//! Compact indexed serialization of a tile tree.
//!
//! Layout (all multi-byte fields big-endian):
//!
//! - Header (14 bytes):
//!   ```text
//!   [0..4]   image width  (u32)
//!   [4..8]   image height (u32)
//!   [8..12]  tile count N (u32)
//!   [12..14] max depth    (u16)
//!   ```
//! - N tile records, written in ascending tile-id order:
//!   ```text
//!   [0..2]   tile index   (u16, position in the enumeration)
//!   [2]      depth        (u8)
//!   [3..5]   parent index (u16, 0xFFFF = root)
//!   [5..8]   r, g, b
//!   [8]      child count  (u8, 0 or 4 from this encoder)
//!   [9..]    child count x child index (u16)
//!   ```
//!
//! Indices are assigned in enumeration order, so a reader recovers tile ids
//! as `index + 1` (the root id is 1).

use std::collections::HashMap;

use crate::core::address::TileAddress;
use crate::core::entropy::decode_payload;
use crate::core::error::EtcaError;
use crate::core::pixels::Rgb;
use crate::core::tree::{TileId, TileTree};

pub const TREE_HEADER_SIZE: usize = 14;

/// Parent/child index marking "none".
const NO_INDEX: u16 = 0xFFFF;

/// Serialize a tree into the indexed record stream (header included, no
/// entropy coding). Fails when the tree holds more tiles than a u16 index
/// can address.
pub fn serialize_tree(tree: &TileTree) -> Result<Vec<u8>, EtcaError> {
    let tile_count = tree.tile_count();
    if tile_count > NO_INDEX as usize {
        return Err(EtcaError::TreeTooLarge(tile_count));
    }

    let mut id_to_index: HashMap<TileId, u16> = HashMap::with_capacity(tile_count);
    for (index, tile) in tree.iter().enumerate() {
        id_to_index.insert(tile.id(), index as u16);
    }

    let (width, height) = tree.dimensions();
    let mut out = Vec::with_capacity(TREE_HEADER_SIZE + tile_count * 17);
    out.extend_from_slice(&width.to_be_bytes());
    out.extend_from_slice(&height.to_be_bytes());
    out.extend_from_slice(&(tile_count as u32).to_be_bytes());
    out.extend_from_slice(&tree.max_depth().to_be_bytes());

    for (index, tile) in tree.iter().enumerate() {
        out.extend_from_slice(&(index as u16).to_be_bytes());
        out.push(tile.depth() as u8);

        let parent_index = if tile.parent_id() == 0 {
            NO_INDEX
        } else {
            id_to_index
                .get(&tile.parent_id())
                .copied()
                .unwrap_or(NO_INDEX)
        };
        out.extend_from_slice(&parent_index.to_be_bytes());

        let color = tile.color();
        out.push(color.r);
        out.push(color.g);
        out.push(color.b);

        out.push(tile.children().len() as u8);
        for child_id in tile.children() {
            let child_index = id_to_index.get(child_id).copied().unwrap_or(NO_INDEX);
            out.extend_from_slice(&child_index.to_be_bytes());
        }
    }

    Ok(out)
}

/// Entropy-decode a payload and parse the record stream back into a tree.
///
/// `width` and `height` are the container-declared dimensions; the stream's
/// own header must agree with them. Hierarchical addresses are rebuilt from
/// the child records: each child index is remembered with its position in
/// the parent, and walking those links upward (then reversing) yields the
/// address from the root.
pub fn parse_tree(payload: &[u8], width: u32, height: u32) -> Result<TileTree, EtcaError> {
    let decoded = decode_payload(payload)?;

    if decoded.len() < TREE_HEADER_SIZE {
        return Err(EtcaError::Truncated("tree header"));
    }
    let stored_width = u32::from_be_bytes([decoded[0], decoded[1], decoded[2], decoded[3]]);
    let stored_height = u32::from_be_bytes([decoded[4], decoded[5], decoded[6], decoded[7]]);
    let tile_count = u32::from_be_bytes([decoded[8], decoded[9], decoded[10], decoded[11]]);
    // Max depth is recomputed from the records themselves.

    if stored_width != width || stored_height != height {
        return Err(EtcaError::DimensionMismatch {
            container_width: width,
            container_height: height,
            payload_width: stored_width,
            payload_height: stored_height,
        });
    }

    let mut tree = TileTree::new(width, height);
    // child id -> (parent id, position within the parent's child list)
    let mut child_links: HashMap<TileId, (TileId, u32)> = HashMap::new();

    let mut cursor = TREE_HEADER_SIZE;
    for _ in 0..tile_count {
        if cursor + 9 > decoded.len() {
            return Err(EtcaError::Truncated("tile record"));
        }
        let tile_index = u16::from_be_bytes([decoded[cursor], decoded[cursor + 1]]);
        let id = tile_index as TileId + 1;
        let depth = decoded[cursor + 2] as u16;
        let parent_index = u16::from_be_bytes([decoded[cursor + 3], decoded[cursor + 4]]);
        let parent_id = if parent_index == NO_INDEX {
            0
        } else {
            parent_index as TileId + 1
        };
        let color = Rgb::new(decoded[cursor + 5], decoded[cursor + 6], decoded[cursor + 7]);
        let child_count = decoded[cursor + 8] as usize;
        cursor += 9;

        if cursor + child_count * 2 > decoded.len() {
            return Err(EtcaError::Truncated("tile record"));
        }
        let mut children = Vec::with_capacity(child_count);
        for position in 0..child_count {
            let child_index = u16::from_be_bytes([decoded[cursor], decoded[cursor + 1]]);
            cursor += 2;
            let child_id = if child_index == NO_INDEX {
                0
            } else {
                child_index as TileId + 1
            };
            children.push(child_id);
            child_links.insert(child_id, (id, position as u32));
        }

        tree.insert_decoded_tile(id, depth, parent_id, color, children);
    }

    // Rebuild addresses: collect positions walking up to the root, then
    // reverse. The walk is bounded by the link count so a malformed stream
    // with cyclic parent links cannot spin forever.
    let max_hops = child_links.len();
    for &id in child_links.keys() {
        let mut path = Vec::new();
        let mut current = id;
        for _ in 0..=max_hops {
            match child_links.get(&current) {
                Some(&(parent, position)) => {
                    path.push(position);
                    current = parent;
                }
                None => break,
            }
        }
        path.reverse();
        tree.set_address(id, TileAddress::from_segments(path));
    }

    Ok(tree)
}
