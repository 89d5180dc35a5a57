//! # Cube Module
//!
//! Static cube records, the colour palette used when placing cubes and the
//! faces a new cube can be attached to.

use cgmath::{Point3, Vector3};

/// An RGB colour with components in `[0, 1]`.
pub type Color = [f32; 3];

/// Colours selectable with the number keys 1 to 9. Key 0 selects a random colour.
pub static PALETTE: phf::Map<u8, Color> = phf::phf_map! {
    1u8 => [1.0, 0.0, 0.0],
    2u8 => [1.0, 0.5, 0.0],
    3u8 => [1.0, 1.0, 0.0],
    4u8 => [0.0, 1.0, 0.0],
    5u8 => [0.0, 1.0, 1.0],
    6u8 => [0.0, 0.0, 1.0],
    7u8 => [0.5, 0.0, 1.0],
    8u8 => [0.5, 0.5, 0.0],
    9u8 => [0.1, 0.1, 0.1],
};

/// A permanently placed cube.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticCube {
    /// World position of the cube's center.
    pub center: Point3<f32>,
    /// Display colour, unused by collision.
    pub color: Color,
}

impl StaticCube {
    /// Creates a cube at `center`.
    pub fn new(center: Point3<f32>, color: Color) -> Self {
        Self { center, color }
    }

    /// Flips the colour to its complement. Applying it twice restores the cube.
    pub fn invert_color(&mut self) {
        self.color = self.color.map(|c| 1.0 - c);
    }
}

/// A face of a cube, numbered the way the picking buffer reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubeFace {
    /// +z
    Top,
    /// +x
    East,
    /// -y
    South,
    /// -x
    West,
    /// -z
    Bottom,
    /// +y
    North,
}

impl CubeFace {
    /// Face for a picking id in `0..6`.
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(CubeFace::Top),
            1 => Some(CubeFace::East),
            2 => Some(CubeFace::South),
            3 => Some(CubeFace::West),
            4 => Some(CubeFace::Bottom),
            5 => Some(CubeFace::North),
            _ => None,
        }
    }

    /// Offset from a cube's center to the center of the cube attached to this face.
    pub fn offset(self, unit_size: f32) -> Vector3<f32> {
        let normal = match self {
            CubeFace::Top => Vector3::new(0.0, 0.0, 1.0),
            CubeFace::East => Vector3::new(1.0, 0.0, 0.0),
            CubeFace::South => Vector3::new(0.0, -1.0, 0.0),
            CubeFace::West => Vector3::new(-1.0, 0.0, 0.0),
            CubeFace::Bottom => Vector3::new(0.0, 0.0, -1.0),
            CubeFace::North => Vector3::new(0.0, 1.0, 0.0),
        };
        normal * unit_size
    }
}

/// Palette colour for a number key, or `None` for key 0 and unknown keys.
pub fn palette_color(digit: u8) -> Option<Color> {
    PALETTE.get(&digit).copied()
}

/// A uniformly random colour.
pub fn random_color() -> Color {
    [fastrand::f32(), fastrand::f32(), fastrand::f32()]
}
