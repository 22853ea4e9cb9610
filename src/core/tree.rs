use std::collections::BTreeMap;

use crate::core::address::TileAddress;
use crate::core::pixels::{PixelBuffer, Rgb};
use crate::core::subdivide::{child_bounds, CHILDREN_PER_TILE};
use crate::core::variance;

pub type TileId = u64;

/// The root tile always has id 1; 0 is reserved for "no parent".
pub const ROOT_ID: TileId = 1;

/// One node of the encoding tree: a rectangular region reduced to its
/// average color, optionally split into four children.
///
/// Tiles hold only ids, never owned children; the [`TileTree`] owns every
/// tile through its id-keyed table.
#[derive(Debug, Clone)]
pub struct Tile {
    id: TileId,
    depth: u16,
    parent_id: TileId,
    color: Rgb,
    children: Vec<TileId>,
}

impl Tile {
    pub fn id(&self) -> TileId {
        self.id
    }

    pub fn depth(&self) -> u16 {
        self.depth
    }

    /// 0 for the root.
    pub fn parent_id(&self) -> TileId {
        self.parent_id
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    /// Empty for leaves, otherwise exactly four ids in child-index order.
    pub fn children(&self) -> &[TileId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// The encoding tree for one image: an id-keyed tile table plus the
/// hierarchical address of every tile.
///
/// Ids come from a per-tree allocator (root = 1, then 2, 3, ...), so two
/// trees built concurrently never interleave ids and every id in a finished
/// tree is consecutive from 1.
#[derive(Debug)]
pub struct TileTree {
    width: u32,
    height: u32,
    tiles: BTreeMap<TileId, Tile>,
    addresses: BTreeMap<TileId, TileAddress>,
    max_depth: u16,
    next_id: TileId,
}

impl TileTree {
    /// Create a tree holding only the root tile.
    pub fn new(width: u32, height: u32) -> Self {
        let mut tiles = BTreeMap::new();
        tiles.insert(
            ROOT_ID,
            Tile {
                id: ROOT_ID,
                depth: 0,
                parent_id: 0,
                color: Rgb::BLACK,
                children: Vec::new(),
            },
        );
        let mut addresses = BTreeMap::new();
        addresses.insert(ROOT_ID, TileAddress::root());
        TileTree {
            width,
            height,
            tiles,
            addresses,
            max_depth: 0,
            next_id: ROOT_ID + 1,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn max_depth(&self) -> u16 {
        self.max_depth
    }

    pub fn get(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(&id)
    }

    pub fn address(&self, id: TileId) -> Option<&TileAddress> {
        self.addresses.get(&id)
    }

    /// All tiles in ascending id order. This is the enumeration order the
    /// serializer relies on; with the per-tree allocator it makes tile ids
    /// and record indices line up as `index == id - 1`.
    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    /// Ids of all tiles without children, ascending.
    pub fn leaves(&self) -> Vec<TileId> {
        self.tiles
            .values()
            .filter(|t| t.is_leaf())
            .map(|t| t.id)
            .collect()
    }

    fn alloc_id(&mut self) -> TileId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Recursively build the tree over `image`.
    ///
    /// Depth-first, pre-order: every tile stores the average color of its
    /// region, and regions whose variance exceeds the threshold are split
    /// until `max_depth` caps the recursion.
    pub fn build(&mut self, image: &PixelBuffer, variance_threshold: f64, max_depth: u16) {
        self.build_recursive(
            ROOT_ID,
            image,
            TileAddress::root(),
            variance_threshold,
            0,
            max_depth,
        );
    }

    fn build_recursive(
        &mut self,
        id: TileId,
        region: &PixelBuffer,
        address: TileAddress,
        variance_threshold: f64,
        depth: u16,
        max_depth: u16,
    ) {
        if depth > self.max_depth {
            self.max_depth = depth;
        }

        let color = region.average_color();
        if let Some(tile) = self.tiles.get_mut(&id) {
            tile.color = color;
        }

        if depth >= max_depth || !variance::should_subdivide(region, variance_threshold) {
            return;
        }

        // Allocate all four ids up front so siblings stay consecutive.
        let child_ids: Vec<TileId> = (0..CHILDREN_PER_TILE).map(|_| self.alloc_id()).collect();
        if let Some(tile) = self.tiles.get_mut(&id) {
            tile.children = child_ids.clone();
        }

        for (index, &child_id) in child_ids.iter().enumerate() {
            let (cx, cy, cw, ch) = child_bounds(region.width(), region.height(), index as u32);
            let child_region = region.extract_region(cx, cy, cw, ch);
            let child_address = address.child(index as u32);

            self.tiles.insert(
                child_id,
                Tile {
                    id: child_id,
                    depth: depth + 1,
                    parent_id: id,
                    color: Rgb::BLACK,
                    children: Vec::new(),
                },
            );
            self.addresses.insert(child_id, child_address.clone());

            self.build_recursive(
                child_id,
                &child_region,
                child_address,
                variance_threshold,
                depth + 1,
                max_depth,
            );
        }
    }

    /// Insert a tile parsed from a record stream. Used by the deserializer;
    /// addresses are reconstructed afterwards from the parent links.
    pub(crate) fn insert_decoded_tile(
        &mut self,
        id: TileId,
        depth: u16,
        parent_id: TileId,
        color: Rgb,
        children: Vec<TileId>,
    ) {
        self.tiles.insert(
            id,
            Tile {
                id,
                depth,
                parent_id,
                color,
                children,
            },
        );
        if depth > self.max_depth {
            self.max_depth = depth;
        }
    }

    pub(crate) fn set_address(&mut self, id: TileId, address: TileAddress) {
        self.addresses.insert(id, address);
    }
}
