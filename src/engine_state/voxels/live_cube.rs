//! # Live Cube Module
//!
//! Cubes that oscillate along a fixed axis.
//!
//! A live cube's position is a closed-form function of time:
//!
//! ```text
//! position(t) = center + amplitude * (1 - sin t) * direction
//! ```
//!
//! so it travels between `center` and `center + 2 * amplitude * direction`
//! with no integration state.

use cgmath::{InnerSpace, Point3, Vector3, Zero};

use super::grid::{CellRange, GridIndex};

/// Index of a live cube in the world's live cube list.
pub type LiveCubeId = usize;

/// A cube moving back and forth along one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveCube {
    /// World position at one end of the swing, reached when `sin t = 1`.
    pub center: Point3<f32>,
    /// Unit vector along the axis of motion.
    pub direction: Vector3<f32>,
    /// Half of the total travel distance.
    pub amplitude: f32,
    /// Display colour, unused by collision.
    pub color: [f32; 3],
}

impl LiveCube {
    /// Creates a live cube from its motion vector, as stored in live scene files.
    ///
    /// `motion` is `direction * amplitude`. A zero motion vector yields a cube
    /// that never moves.
    pub fn from_motion(center: Point3<f32>, motion: Vector3<f32>, color: [f32; 3]) -> Self {
        let amplitude = motion.magnitude();
        let direction = if amplitude > 0.0 {
            motion / amplitude
        } else {
            Vector3::zero()
        };
        Self {
            center,
            direction,
            amplitude,
            color,
        }
    }

    /// The motion vector, `direction * amplitude`.
    pub fn motion(&self) -> Vector3<f32> {
        self.direction * self.amplitude
    }

    /// Position of the cube's center at `time` seconds.
    pub fn position(&self, time: f32) -> Point3<f32> {
        self.center + self.direction * (self.amplitude * (1.0 - time.sin()))
    }

    /// Every cell the cube can occupy, from its center to the far end of its swing.
    pub fn swept_range(&self, grid: &GridIndex) -> CellRange {
        grid.cell_range(self.center, self.direction, self.motion() * 2.0)
    }
}
