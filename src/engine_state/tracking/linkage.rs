//! # Linkage
//!
//! Ride-along state between the actor and a live cube it landed on.
//!
//! While riding, the actor's eye is the cube's position plus a stored offset.
//! Only the horizontal part of the offset ever changes after the link starts,
//! so the actor bobs with the cube and can still walk around on top of it.

use cgmath::{Point3, Vector3};

use crate::engine_state::voxels::{live_cube::LiveCubeId, world::World};

/// Whether the actor is riding a live cube.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Linkage {
    /// Not attached to anything.
    #[default]
    Idle,
    /// Attached to a live cube.
    Riding {
        /// The cube being ridden.
        cube: LiveCubeId,
        /// Eye position relative to the cube.
        offset: Vector3<f32>,
    },
}

impl Linkage {
    /// Attaches the actor at `eye` to `cube` as it is at `time`.
    ///
    /// Stays idle when the cube does not exist.
    pub fn start(&mut self, world: &World, cube: LiveCubeId, eye: Point3<f32>, time: f32) {
        match world.live_position(cube, time) {
            Some(position) => {
                log::debug!("Riding live cube {}", cube);
                *self = Linkage::Riding {
                    cube,
                    offset: eye - position,
                };
            }
            None => log::warn!("Cannot ride missing live cube {}", cube),
        }
    }

    /// Shifts the horizontal offset by `delta`; the vertical offset is kept.
    pub fn update_offset(&mut self, delta: Vector3<f32>) {
        if let Linkage::Riding { offset, .. } = self {
            offset.x += delta.x;
            offset.y += delta.y;
        }
    }

    /// Eye position while riding, `None` when idle.
    pub fn linked_eye(&self, world: &World, time: f32) -> Option<Point3<f32>> {
        match *self {
            Linkage::Riding { cube, offset } => world.live_position(cube, time).map(|p| p + offset),
            Linkage::Idle => None,
        }
    }

    /// Detaches the actor.
    pub fn end(&mut self) {
        if let Linkage::Riding { cube, .. } = *self {
            log::debug!("Left live cube {}", cube);
        }
        *self = Linkage::Idle;
    }

    /// The cube being ridden.
    pub fn riding_cube(&self) -> Option<LiveCubeId> {
        match *self {
            Linkage::Riding { cube, .. } => Some(cube),
            Linkage::Idle => None,
        }
    }

    /// Whether the actor is riding.
    pub fn is_riding(&self) -> bool {
        matches!(self, Linkage::Riding { .. })
    }
}
