//! # Occupancy Module
//!
//! Hash-based occupancy indices used for O(1) broad-phase lookups.
//!
//! - [`StaticOccupancy`] records which cells hold a static cube.
//! - [`LiveOccupancy`] maps every cell a live cube can sweep through to that
//!   cube's id. The footprint is computed once when the cube is registered and
//!   is not updated as the cube moves.

use std::collections::{HashMap, HashSet};

use super::grid::CellIndex;
use super::live_cube::LiveCubeId;

/// Set of cells occupied by static cubes.
#[derive(Debug, Default, Clone)]
pub struct StaticOccupancy {
    cells: HashSet<CellIndex>,
}

impl StaticOccupancy {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a cell as occupied.
    pub fn insert(&mut self, cell: CellIndex) {
        self.cells.insert(cell);
    }

    /// Clears a cell. Clearing an empty cell does nothing.
    pub fn remove(&mut self, cell: CellIndex) {
        self.cells.remove(&cell);
    }

    /// Whether a cell is occupied.
    pub fn contains(&self, cell: CellIndex) -> bool {
        self.cells.contains(&cell)
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Number of occupied cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no cell is occupied.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Map from swept cells to the live cube sweeping them.
#[derive(Debug, Default, Clone)]
pub struct LiveOccupancy {
    cells: HashMap<CellIndex, LiveCubeId>,
}

impl LiveOccupancy {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Points `cell` at live cube `id`.
    ///
    /// When ranges overlap the last registered cube owns the shared cells.
    pub fn insert(&mut self, cell: CellIndex, id: LiveCubeId) {
        if let Some(previous) = self.cells.insert(cell, id) {
            if previous != id {
                log::debug!(
                    "Live cube {} takes cell {:?} over from live cube {}",
                    id,
                    cell,
                    previous
                );
            }
        }
    }

    /// The live cube sweeping `cell`, if any.
    pub fn get(&self, cell: CellIndex) -> Option<LiveCubeId> {
        self.cells.get(&cell).copied()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Number of swept cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no cell is swept.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Point3;
    use proptest::prelude::*;

    #[test]
    fn removing_absent_cell_is_a_no_op() {
        let mut map = StaticOccupancy::new();
        map.insert(Point3::new(1, 2, 3));
        map.remove(Point3::new(0, 0, 0));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn last_registered_live_cube_wins() {
        let mut map = LiveOccupancy::new();
        let cell = Point3::new(0, 0, 4);
        map.insert(cell, 0);
        map.insert(cell, 1);
        assert_eq!(map.get(cell), Some(1));
        assert_eq!(map.len(), 1);
    }

    proptest! {
        #[test]
        fn add_then_remove_restores_the_map(
            existing in proptest::collection::vec((-5i32..5, -5i32..5, -5i32..5), 0..20),
            x in -5i32..5, y in -5i32..5, z in -5i32..5,
        ) {
            let mut map = StaticOccupancy::new();
            for (a, b, c) in existing {
                map.insert(Point3::new(a, b, c));
            }
            let cell = Point3::new(x, y, z);
            prop_assume!(!map.contains(cell));
            let before = map.clone();

            map.insert(cell);
            map.remove(cell);

            prop_assert_eq!(map.cells, before.cells);
        }
    }
}
