//! # Placement Validator
//!
//! Rules for putting a cube into a cell, and for moving a cube the actor may
//! be standing on.
//!
//! A rejection is a normal outcome, not an error. It is reported as a
//! [`PlacementRejection`] so the caller can decide what to tell the user.

use std::fmt;

use cgmath::{Point3, Vector3};

use super::clash::ClashDetector;
use crate::engine_state::voxels::{
    grid::{FlyDirection, Probe},
    world::World,
};
use crate::engine_state::KeyAction;

/// Why a cube cannot go where it was asked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementRejection {
    /// The target lies below the ground plane.
    BelowGround,
    /// A static cube already occupies the cell.
    StaticClash,
    /// A live cube sweeps through the cell.
    LiveClash,
    /// The cell overlaps the actor's own body.
    TooCloseToEye,
}

impl fmt::Display for PlacementRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            PlacementRejection::BelowGround => "cannot put cube below ground",
            PlacementRejection::StaticClash => "clash with static cube",
            PlacementRejection::LiveClash => "clash with live cube",
            PlacementRejection::TooCloseToEye => "too close to eye",
        };
        f.write_str(reason)
    }
}

/// Checks whether a cube centered at `target` may be placed.
///
/// When `eye` is given, cells overlapping the actor are refused too.
pub fn check_placement(
    world: &World,
    target: Point3<f32>,
    eye: Option<Point3<f32>>,
) -> Result<(), PlacementRejection> {
    let grid = world.grid();
    if target.z - grid.origin.z < 0.0 {
        return Err(PlacementRejection::BelowGround);
    }

    let cell = grid.cell_of_point(target);
    if world.is_static_cell(cell) {
        return Err(PlacementRejection::StaticClash);
    }
    if world.live_at(cell).is_some() {
        return Err(PlacementRejection::LiveClash);
    }

    if let Some(eye) = eye {
        if grid
            .probe_cells(eye, Probe::Fly(FlyDirection::Free))
            .contains(&cell)
        {
            return Err(PlacementRejection::TooCloseToEye);
        }
    }
    Ok(())
}

/// Checks moving the cube at `from` to `to` with `action`.
///
/// If the actor stands on the cube it travels along, so its own new position
/// must be free as well: the cell at eye height and, except for an upward
/// push, the cell one unit below it. A downward push only checks the cube.
/// On success returns the displacement the actor must follow, if any.
pub fn plan_move(
    world: &World,
    detector: &ClashDetector,
    from: Point3<f32>,
    to: Point3<f32>,
    action: KeyAction,
    eye: Point3<f32>,
) -> Result<Option<Vector3<f32>>, PlacementRejection> {
    if !detector.is_standing_on(world, eye, from) {
        check_placement(world, to, Some(eye))?;
        return Ok(None);
    }

    check_placement(world, to, None)?;
    let shift = to - from;
    if action == KeyAction::Down {
        return Ok(Some(shift));
    }

    let mut target = eye + shift;
    check_placement(world, target, None)?;
    if action == KeyAction::Up {
        return Ok(Some(shift));
    }

    target.z -= world.grid().unit_size;
    check_placement(world, target, None)?;
    Ok(Some(shift))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SandboxConfig;
    use crate::engine_state::voxels::live_cube::LiveCube;

    fn world_with(cubes: &[(f32, f32, f32)]) -> World {
        let mut world = World::new(&SandboxConfig::default());
        for &(x, y, z) in cubes {
            world.add_cube(Point3::new(x, y, z), [1.0; 3]).unwrap();
        }
        world
    }

    #[test]
    fn rejection_reasons() {
        let mut world = world_with(&[(2.0, 0.0, 0.5)]);
        world
            .add_live_cube(LiveCube::from_motion(
                Point3::new(5.0, 0.0, 0.5),
                Vector3::new(1.0, 0.0, 0.0),
                [0.0; 3],
            ))
            .unwrap();

        assert_eq!(
            check_placement(&world, Point3::new(0.0, 0.0, -0.5), None),
            Err(PlacementRejection::BelowGround)
        );
        assert_eq!(
            check_placement(&world, Point3::new(2.0, 0.0, 0.5), None),
            Err(PlacementRejection::StaticClash)
        );
        assert_eq!(
            check_placement(&world, Point3::new(7.0, 0.0, 0.5), None),
            Err(PlacementRejection::LiveClash)
        );
        assert_eq!(
            check_placement(&world, Point3::new(0.0, 0.0, 0.5), Some(Point3::new(0.0, 0.0, 1.5))),
            Err(PlacementRejection::TooCloseToEye)
        );
        assert_eq!(
            check_placement(&world, Point3::new(3.0, 0.0, 0.5), Some(Point3::new(0.0, 0.0, 1.5))),
            Ok(())
        );
    }

    #[test]
    fn moving_a_cube_nobody_stands_on() {
        let world = world_with(&[(2.0, 0.0, 0.5)]);
        let detector = ClashDetector::new();
        let planned = plan_move(
            &world,
            &detector,
            Point3::new(2.0, 0.0, 0.5),
            Point3::new(3.0, 0.0, 0.5),
            KeyAction::Forward,
            Point3::new(0.0, 0.0, 1.5),
        );
        assert_eq!(planned, Ok(None));
    }

    #[test]
    fn actor_follows_the_cube_it_stands_on() {
        let world = world_with(&[(0.0, 0.0, 0.5)]);
        let detector = ClashDetector::new();
        let eye = Point3::new(0.0, 0.0, 2.5);
        let planned = plan_move(
            &world,
            &detector,
            Point3::new(0.0, 0.0, 0.5),
            Point3::new(1.0, 0.0, 0.5),
            KeyAction::Right,
            eye,
        );
        assert_eq!(planned, Ok(Some(Vector3::new(1.0, 0.0, 0.0))));
    }

    #[test]
    fn blocked_actor_cancels_the_move() {
        // The actor would be carried into the cube at (1, 0, 1.5).
        let world = world_with(&[(0.0, 0.0, 0.5), (1.0, 0.0, 1.5)]);
        let detector = ClashDetector::new();
        let planned = plan_move(
            &world,
            &detector,
            Point3::new(0.0, 0.0, 0.5),
            Point3::new(1.0, 0.0, 0.5),
            KeyAction::Right,
            Point3::new(0.0, 0.0, 2.5),
        );
        assert_eq!(planned, Err(PlacementRejection::StaticClash));
    }

    #[test]
    fn downward_push_checks_only_the_cube() {
        let world = world_with(&[(0.0, 0.0, 1.5), (1.0, 0.0, 2.5)]);
        let detector = ClashDetector::new();
        let planned = plan_move(
            &world,
            &detector,
            Point3::new(0.0, 0.0, 1.5),
            Point3::new(0.0, 0.0, 0.5),
            KeyAction::Down,
            Point3::new(0.0, 0.0, 3.5),
        );
        assert_eq!(planned, Ok(Some(Vector3::new(0.0, 0.0, -1.0))));
    }
}
