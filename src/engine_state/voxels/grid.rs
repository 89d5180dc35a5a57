//! # Grid Module
//!
//! Converts continuous world coordinates to discrete cell indices on the
//! uniform cubic lattice, and derives the cells an actor's bounding volume
//! touches.
//!
//! ## Conventions
//!
//! - Cell `(0, 0, 0)` is centered at the origin offset `(0, 0, half_unit)`,
//!   i.e. the cube sitting on the ground at the world origin.
//! - Conversion rounds half away from zero, so a point exactly on a cell
//!   boundary always resolves to the cell further from the origin.
//! - The actor footprint is a square of half extent `body_clash` around the
//!   eye. Its corners are always produced in the order
//!   (left, top), (right, top), (right, bottom), (left, bottom); the clash
//!   detector assigns mask bit N to corner N.

use cgmath::{EuclideanSpace, Point3, Vector3};

use crate::config::SandboxConfig;

/// Integer coordinates of one lattice cell.
pub type CellIndex = Point3<i32>;

/// Vertical direction of a flight step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlyDirection {
    /// Rising with no horizontal movement.
    Up,
    /// Moving horizontally while airborne.
    Free,
    /// Falling with no horizontal movement.
    Down,
}

/// Which vertical bands of the actor a probe inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// Walking: head and leg bands.
    Move,
    /// Flying in the given direction.
    Fly(FlyDirection),
}

/// The three z indices an actor's body spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeBands {
    /// Band holding the top of the head (eye plus head room).
    pub head: i32,
    /// Band one unit below the eye.
    pub leg: i32,
    /// Band holding the feet.
    pub foot: i32,
}

impl ProbeBands {
    /// Selects the bands a probe tests, top to bottom.
    pub fn select(&self, probe: Probe) -> Vec<i32> {
        match probe {
            Probe::Move => vec![self.head, self.leg],
            Probe::Fly(FlyDirection::Up) => vec![self.head],
            Probe::Fly(FlyDirection::Down) => vec![self.foot],
            Probe::Fly(FlyDirection::Free) if self.leg == self.foot => vec![self.head, self.leg],
            Probe::Fly(FlyDirection::Free) => vec![self.head, self.leg, self.foot],
        }
    }
}

/// Lattice geometry plus the actor dimensions needed to probe it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridIndex {
    /// Edge length of a cell.
    pub unit_size: f32,
    /// Half the edge length of a cell.
    pub half_unit: f32,
    /// World position of the center of cell `(0, 0, 0)`.
    pub origin: Vector3<f32>,
    /// Half side length of the playable ground square.
    pub ground_width: f32,
    /// Eye to feet distance.
    pub body_height: f32,
    /// Horizontal half extent of the actor and head room above the eye.
    pub body_clash: f32,
}

impl GridIndex {
    /// Builds the grid geometry from a configuration.
    pub fn new(config: &SandboxConfig) -> Self {
        Self {
            unit_size: config.unit_size,
            half_unit: config.half_unit(),
            origin: config.origin_offset(),
            ground_width: config.ground_width,
            body_height: config.body_height,
            body_clash: config.body_clash,
        }
    }

    /// Rounds an offset from the origin to a cell coordinate, half away from zero.
    #[inline]
    pub fn index_of_offset(&self, offset: f32) -> i32 {
        (offset / self.unit_size).round() as i32
    }

    /// Cell index of an offset that is already relative to the origin.
    pub fn cell_of_offset(&self, offset: Vector3<f32>) -> CellIndex {
        Point3::new(
            self.index_of_offset(offset.x),
            self.index_of_offset(offset.y),
            self.index_of_offset(offset.z),
        )
    }

    /// Cell index containing a world point.
    pub fn cell_of_point(&self, point: Point3<f32>) -> CellIndex {
        self.cell_of_offset(point.to_vec() - self.origin)
    }

    /// World position of a cell's center.
    pub fn cell_center(&self, cell: CellIndex) -> Point3<f32> {
        Point3::new(
            cell.x as f32 * self.unit_size,
            cell.y as f32 * self.unit_size,
            cell.z as f32 * self.unit_size,
        ) + self.origin
    }

    /// Horizontal cell column containing `(x, y)`.
    pub fn column_of(&self, x: f32, y: f32) -> (i32, i32) {
        (
            self.index_of_offset(x - self.origin.x),
            self.index_of_offset(y - self.origin.y),
        )
    }

    /// The four horizontal corners of the actor footprint around `eye`.
    pub fn footprint_corners(&self, eye: Point3<f32>) -> [(f32, f32); 4] {
        let left = eye.x - self.body_clash;
        let right = eye.x + self.body_clash;
        let bottom = eye.y - self.body_clash;
        let top = eye.y + self.body_clash;
        [(left, top), (right, top), (right, bottom), (left, bottom)]
    }

    /// Cell columns under the four footprint corners, in corner order.
    pub fn footprint_columns(&self, eye: Point3<f32>) -> [(i32, i32); 4] {
        self.footprint_corners(eye)
            .map(|(x, y)| self.column_of(x, y))
    }

    /// Head, leg and foot bands for an eye at height `eye_z`.
    pub fn vertical_bands(&self, eye_z: f32) -> ProbeBands {
        ProbeBands {
            head: self.index_of_offset(eye_z + self.body_clash - self.origin.z),
            leg: self.index_of_offset(eye_z - self.unit_size - self.origin.z),
            foot: self.index_of_offset(eye_z - self.body_height - self.origin.z),
        }
    }

    /// Body and head layers used for the horizontal clash mask.
    ///
    /// Unlike [`GridIndex::vertical_bands`] these truncate the eye height
    /// rather than rounding it, so an actor standing on a surface tests the
    /// layer directly in front of its body and the one above it.
    pub fn move_bands(&self, eye_z: f32) -> (i32, i32) {
        let head = (eye_z / self.unit_size).trunc() as i32;
        (head - 1, head)
    }

    /// Every cell a probe touches, bottom band first, corners in footprint order.
    pub fn probe_cells(&self, eye: Point3<f32>, probe: Probe) -> Vec<CellIndex> {
        let bands = self.vertical_bands(eye.z).select(probe);
        let columns = self.footprint_columns(eye);
        bands
            .iter()
            .rev()
            .flat_map(|&z| columns.iter().map(move |&(x, y)| Point3::new(x, y, z)))
            .collect()
    }

    /// Cells walked from `start` to `start + displacement`, both ends included.
    ///
    /// Each step moves by the sign of the matching `direction` component, so
    /// an axis aligned direction changes exactly one coordinate per step.
    pub fn cell_range(
        &self,
        start: Point3<f32>,
        direction: Vector3<f32>,
        displacement: Vector3<f32>,
    ) -> CellRange {
        CellRange::new(
            self.cell_of_point(start),
            self.cell_of_point(start + displacement),
            direction,
        )
    }

    /// Whether a horizontal position lies over the playable ground.
    pub fn is_in_grid(&self, x: f32, y: f32) -> bool {
        (-self.ground_width..=self.ground_width).contains(&x)
            && (-self.ground_width..=self.ground_width).contains(&y)
    }
}

/// Finite walk over lattice cells from a start cell to an end cell.
///
/// Produced fresh by [`GridIndex::cell_range`]; restart by asking for a new one.
/// The walk takes as many steps as the largest coordinate difference and then
/// yields the end cell, so it terminates even when the step direction does
/// not lead exactly to the end.
#[derive(Debug, Clone)]
pub struct CellRange {
    current: CellIndex,
    end: CellIndex,
    step: Vector3<i32>,
    remaining: u32,
    finished: bool,
}

impl CellRange {
    fn new(start: CellIndex, end: CellIndex, direction: Vector3<f32>) -> Self {
        let sign = |v: f32| {
            if v > 0.0 {
                1
            } else if v < 0.0 {
                -1
            } else {
                0
            }
        };
        let remaining = end
            .x
            .abs_diff(start.x)
            .max(end.y.abs_diff(start.y))
            .max(end.z.abs_diff(start.z));
        Self {
            current: start,
            end,
            step: Vector3::new(sign(direction.x), sign(direction.y), sign(direction.z)),
            remaining,
            finished: false,
        }
    }
}

impl Iterator for CellRange {
    type Item = CellIndex;

    fn next(&mut self) -> Option<CellIndex> {
        if self.finished {
            return None;
        }
        if self.remaining == 0 || self.current == self.end {
            self.finished = true;
            return Some(self.end);
        }
        let cell = self.current;
        self.current = Point3::new(
            cell.x.saturating_add(self.step.x),
            cell.y.saturating_add(self.step.y),
            cell.z.saturating_add(self.step.z),
        );
        self.remaining -= 1;
        Some(cell)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.finished {
            return (0, Some(0));
        }
        // At most `remaining` steps plus the end cell; a walk that reaches
        // the end early yields fewer.
        let upper = usize::try_from(self.remaining)
            .ok()
            .and_then(|n| n.checked_add(1));
        (1, upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn grid() -> GridIndex {
        GridIndex::new(&SandboxConfig::default())
    }

    #[test]
    fn ground_cube_is_cell_zero() {
        let g = grid();
        assert_eq!(g.cell_of_point(Point3::new(0.0, 0.0, 0.5)), Point3::new(0, 0, 0));
        assert_eq!(g.cell_of_point(Point3::new(2.0, -3.0, 1.5)), Point3::new(2, -3, 1));
    }

    #[test]
    fn boundaries_round_away_from_zero() {
        let g = grid();
        assert_eq!(g.index_of_offset(0.5), 1);
        assert_eq!(g.index_of_offset(-0.5), -1);
        assert_eq!(g.index_of_offset(0.49), 0);
        assert_eq!(g.index_of_offset(-1.5), -2);
    }

    #[test]
    fn footprint_corner_order() {
        let g = grid();
        let corners = g.footprint_corners(Point3::new(1.0, 2.0, 1.5));
        let (left, right) = (1.0f32 - 0.1, 1.0f32 + 0.1);
        let (bottom, top) = (2.0f32 - 0.1, 2.0f32 + 0.1);
        assert_eq!(corners, [(left, top), (right, top), (right, bottom), (left, bottom)]);
    }

    #[test]
    fn bands_for_standing_actor() {
        let g = grid();
        let bands = g.vertical_bands(1.5);
        // Feet resting on the ground sit on the boundary below cell zero.
        assert_eq!(bands, ProbeBands { head: 1, leg: 0, foot: -1 });
        assert_eq!(g.move_bands(1.5), (0, 1));
    }

    #[test]
    fn free_flight_collapses_coinciding_bands() {
        let bands = ProbeBands { head: 2, leg: 1, foot: 1 };
        assert_eq!(bands.select(Probe::Fly(FlyDirection::Free)), vec![2, 1]);
        let bands = ProbeBands { head: 3, leg: 2, foot: 1 };
        assert_eq!(bands.select(Probe::Fly(FlyDirection::Free)), vec![3, 2, 1]);
        assert_eq!(bands.select(Probe::Fly(FlyDirection::Up)), vec![3]);
        assert_eq!(bands.select(Probe::Fly(FlyDirection::Down)), vec![1]);
        assert_eq!(bands.select(Probe::Move), vec![3, 2]);
    }

    #[test]
    fn probe_cells_start_at_the_lowest_band() {
        let g = grid();
        let cells = g.probe_cells(Point3::new(0.0, 0.0, 2.5), Probe::Move);
        assert_eq!(cells.len(), 8);
        assert_eq!(cells[0].z, 1);
        assert_eq!(cells[7].z, 2);
    }

    #[test]
    fn cell_range_walks_one_axis() {
        let g = grid();
        let cells: Vec<_> = g
            .cell_range(
                Point3::new(0.0, 0.0, 4.0),
                Vector3::new(0.0, 0.0, 1.0),
                Vector3::new(0.0, 0.0, 6.0),
            )
            .collect();
        let expected: Vec<_> = (4..=10).map(|z| Point3::new(0, 0, z)).collect();
        assert_eq!(cells, expected);
    }

    #[test]
    fn cell_range_terminates_without_direction() {
        let g = grid();
        let cells: Vec<_> = g
            .cell_range(
                Point3::new(0.0, 0.0, 0.5),
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(3.0, 0.0, 0.0),
            )
            .collect();
        assert_eq!(cells.len(), 4);
        assert_eq!(cells.last(), Some(&Point3::new(3, 0, 0)));
    }

    #[test]
    fn cell_range_spanning_the_whole_index_space() {
        let g = grid();
        let mut cells = g.cell_range(
            Point3::new(-3e9, 0.0, 0.5),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(6e9, 0.0, 0.0),
        );
        assert_eq!(cells.size_hint(), (1, usize::try_from(u32::MAX as u64 + 1).ok()));
        assert_eq!(cells.next(), Some(Point3::new(i32::MIN, 0, 0)));
        assert_eq!(cells.next(), Some(Point3::new(i32::MIN + 1, 0, 0)));
    }

    #[test]
    fn cell_range_step_saturates_at_the_index_limit() {
        let range = CellRange::new(
            Point3::new(i32::MAX, 0, 0),
            Point3::new(i32::MAX - 2, 0, 0),
            Vector3::new(1.0, 0.0, 0.0),
        );
        let cells: Vec<_> = range.collect();
        assert_eq!(
            cells,
            vec![
                Point3::new(i32::MAX, 0, 0),
                Point3::new(i32::MAX, 0, 0),
                Point3::new(i32::MAX - 2, 0, 0),
            ]
        );
    }

    #[test]
    fn playable_grid_is_inclusive() {
        let g = grid();
        assert!(g.is_in_grid(15.5, -15.5));
        assert!(!g.is_in_grid(15.6, 0.0));
    }

    proptest! {
        #[test]
        fn cell_index_is_stable_under_its_own_center(
            x in -50.0f32..50.0,
            y in -50.0f32..50.0,
            z in -50.0f32..50.0,
        ) {
            let g = grid();
            let cell = g.cell_of_point(Point3::new(x, y, z));
            prop_assert_eq!(g.cell_of_point(g.cell_center(cell)), cell);
        }
    }
}
