//! Axial hex coordinates for the galaxy grid (§9 "Graph cycles in Galaxy
//! adjacency" — an arena of systems keyed by coordinate, no owning pointers).

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// Axial hex coordinate (q, r). Cube coordinate `s` is derived as `-q - r`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

impl HexCoord {
    pub fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    pub fn s(self) -> i32 {
        -self.q - self.r
    }

    /// The six physical neighbors of this coordinate, in a fixed order.
    pub fn neighbors(self) -> [HexCoord; 6] {
        const DIRS: [(i32, i32); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1), (0, 1)];
        DIRS.map(|(dq, dr)| HexCoord::new(self.q + dq, self.r + dr))
    }

    pub fn is_neighbor_of(self, other: HexCoord) -> bool {
        self.neighbors().contains(&other)
    }

    pub fn distance(self, other: HexCoord) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        ((dq + dr + ds) / 2) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbors_are_distance_one() {
        let center = HexCoord::new(0, 0);
        for n in center.neighbors() {
            assert_eq!(center.distance(n), 1);
            assert!(center.is_neighbor_of(n));
        }
    }

    #[test]
    fn non_neighbor_is_not_adjacent() {
        let center = HexCoord::new(0, 0);
        let far = HexCoord::new(3, 3);
        assert!(!center.is_neighbor_of(far));
    }
}
