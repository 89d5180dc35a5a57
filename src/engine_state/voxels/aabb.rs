//! # AABB Module
//!
//! Axis-aligned box tests between the actor and a single cube.
//!
//! The actor box spans `body_clash` horizontally around the eye and
//! `[eye.z - body_height, eye.z + body_clash]` vertically. A cube box spans
//! half a unit around its center on every axis.

use cgmath::{Point3, Vector3};

use super::grid::GridIndex;

/// Push-out directions in the fixed enumeration order +x, -x, +y, -y, +z, -z.
const CUBE_FACES: [Vector3<f32>; 6] = [
    Vector3::new(1.0, 0.0, 0.0),
    Vector3::new(-1.0, 0.0, 0.0),
    Vector3::new(0.0, 1.0, 0.0),
    Vector3::new(0.0, -1.0, 0.0),
    Vector3::new(0.0, 0.0, 1.0),
    Vector3::new(0.0, 0.0, -1.0),
];

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point3<f32>,
    /// Maximum corner.
    pub max: Point3<f32>,
}

impl Aabb {
    /// Box of the actor whose eye is at `eye`.
    pub fn actor(eye: Point3<f32>, grid: &GridIndex) -> Self {
        Self {
            min: Point3::new(
                eye.x - grid.body_clash,
                eye.y - grid.body_clash,
                eye.z - grid.body_height,
            ),
            max: Point3::new(
                eye.x + grid.body_clash,
                eye.y + grid.body_clash,
                eye.z + grid.body_clash,
            ),
        }
    }

    /// Box of a unit cube centered at `center`.
    pub fn cube(center: Point3<f32>, grid: &GridIndex) -> Self {
        let half = Vector3::new(grid.half_unit, grid.half_unit, grid.half_unit);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// The same box with its floor lowered by `by`.
    pub fn extend_floor(mut self, by: f32) -> Self {
        self.min.z -= by;
        self
    }

    /// Strict overlap test on all six faces; touching boxes do not intersect.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.min.y < other.max.y
            && self.min.z < other.max.z
            && self.max.x > other.min.x
            && self.max.y > other.min.y
            && self.max.z > other.min.z
    }

    /// Shallowest vector by which `self` overlaps `other`, or `None` when they
    /// do not intersect.
    ///
    /// Subtracting the result from `self`'s position separates the boxes.
    /// When two faces overlap by the same depth the earlier face in the order
    /// +x, -x, +y, -y, +z, -z wins.
    pub fn penetration(&self, other: &Aabb) -> Option<Vector3<f32>> {
        if !self.intersects(other) {
            return None;
        }

        let distances = [
            self.max.x - other.min.x,
            other.max.x - self.min.x,
            self.max.y - other.min.y,
            other.max.y - self.min.y,
            self.max.z - other.min.z,
            other.max.z - self.min.z,
        ];

        let mut face = 0;
        for (i, distance) in distances.iter().enumerate().skip(1) {
            if *distance < distances[face] {
                face = i;
            }
        }
        Some(CUBE_FACES[face] * distances[face])
    }
}

/// Whether the actor at `eye` overlaps the cube at `center`.
pub fn actor_intersects(eye: Point3<f32>, center: Point3<f32>, grid: &GridIndex) -> bool {
    Aabb::actor(eye, grid).intersects(&Aabb::cube(center, grid))
}

/// Whether the actor at `eye` stands on the cube at `center`, allowing half a
/// unit of tolerance below the feet.
pub fn actor_is_landing_on(eye: Point3<f32>, center: Point3<f32>, grid: &GridIndex) -> bool {
    Aabb::actor(eye, grid)
        .extend_floor(grid.half_unit)
        .intersects(&Aabb::cube(center, grid))
}

/// Shallowest push-out of the actor at `eye` from the cube at `center`.
pub fn actor_penetration(
    eye: Point3<f32>,
    center: Point3<f32>,
    grid: &GridIndex,
) -> Option<Vector3<f32>> {
    Aabb::actor(eye, grid).penetration(&Aabb::cube(center, grid))
}
