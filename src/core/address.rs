use std::fmt;
use std::str::FromStr;

/// Position of a tile in the subdivision hierarchy: the sequence of child
/// indices (each in 0..=3) leading from the root down to the tile.
///
/// The root is the empty sequence. The address length equals the tile's
/// depth, and applying the child geometry along the segments yields the
/// tile's pixel rectangle.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileAddress {
    segments: Vec<u32>,
}

impl TileAddress {
    /// The root address (empty sequence).
    pub fn root() -> Self {
        TileAddress::default()
    }

    pub fn from_segments(segments: Vec<u32>) -> Self {
        TileAddress { segments }
    }

    pub fn segments(&self) -> &[u32] {
        &self.segments
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Address of child `segment` under this tile.
    pub fn child(&self, segment: u32) -> TileAddress {
        let mut segments = self.segments.clone();
        segments.push(segment);
        TileAddress { segments }
    }
}

impl fmt::Display for TileAddress {
    /// Dot-joined segments; the root serializes as `"."`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, ".");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for TileAddress {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s == "." {
            return Ok(TileAddress::root());
        }
        let mut segments = Vec::new();
        for part in s.split('.') {
            if part.is_empty() {
                continue;
            }
            let segment: u32 = part
                .parse()
                .map_err(|_| format!("invalid address segment '{part}'"))?;
            segments.push(segment);
        }
        Ok(TileAddress { segments })
    }
}
