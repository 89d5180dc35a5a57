//! # Scene Tracking
//!
//! The per-frame collision protocols the walk controller and the cube editor
//! call into.
//!
//! ## Key Components
//!
//! * `clash` - Broad-phase clash detection against static and live cubes
//! * `linkage` - Ride-along state for standing on a live cube
//! * `placement` - Rules for placing and moving cubes
//! * `SceneTracker` - Ties the three together and carries the flags the walk
//!   controller picks up on its next frame
//!
//! ## Protocols
//!
//! 1. **Walking**: [`SceneTracker::resolve_move`] resolves a horizontal step
//!    and reports whether the actor lost its support.
//! 2. **Flying**: [`SceneTracker::resolve_fly`] resolves a step with a
//!    vertical component and classifies what it hit.
//! 3. **Editing**: [`SceneTracker::can_place`], [`SceneTracker::can_move`]
//!    and [`SceneTracker::validate_remove`] gate cube edits and leave a
//!    follow-up or fall flag for the actor when an edit carries it along.
//!
//! Every call is synchronous and reads the scene from a borrowed [`World`].

use cgmath::{Point3, Vector3};

use crate::engine_state::audio::{Sound, SoundSink};
use crate::engine_state::voxels::{grid::FlyDirection, live_cube::LiveCubeId, world::World};
use crate::engine_state::KeyAction;

use clash::{ClashDetector, ClashKind, FlyBlock};

pub mod clash;
pub mod linkage;
pub mod placement;

/// Result of a walking step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveOutcome {
    /// Where the actor ends up.
    pub position: Point3<f32>,
    /// Whether nothing holds the actor up any more.
    pub falling: bool,
}

/// Collision front end for a single actor.
pub struct SceneTracker {
    detector: ClashDetector,
    follow_up: Option<Vector3<f32>>,
    fall_down: bool,
    sounds: Box<dyn SoundSink>,
}

impl SceneTracker {
    /// Creates a tracker that sends sound cues to `sounds`.
    pub fn new(sounds: Box<dyn SoundSink>) -> Self {
        Self {
            detector: ClashDetector::new(),
            follow_up: None,
            fall_down: false,
            sounds,
        }
    }

    /// Live cube found by the most recent live probe.
    pub fn clashed_cube(&self) -> Option<LiveCubeId> {
        self.detector.clashed_cube()
    }

    /// Resolves a walking step from `from` to `to` at `time`.
    ///
    /// While riding `riding`, the step is accepted as is and only support
    /// from that cube is checked. Otherwise the step slides along static cubes
    /// and is undone entirely if it runs into a live cube.
    pub fn resolve_move(
        &mut self,
        world: &World,
        from: Point3<f32>,
        to: Point3<f32>,
        time: f32,
        riding: Option<LiveCubeId>,
    ) -> MoveOutcome {
        if let Some(cube) = riding {
            return MoveOutcome {
                position: to,
                falling: !self.detector.is_landed_on_live_cube(world, to, cube, time),
            };
        }

        let position = self.detector.resolve_horizontal(world, from, to);
        if self.detector.hits_live_cube(world, position, time) {
            return MoveOutcome {
                position: from,
                falling: false,
            };
        }
        MoveOutcome {
            position,
            falling: self.detector.is_airborne(world, position),
        }
    }

    /// Resolves a flying step from `from` to `to` at `time`.
    ///
    /// Static cubes and the ground reject the step; live cubes push the actor
    /// out along the shallowest axis.
    pub fn resolve_fly(
        &mut self,
        world: &World,
        from: Point3<f32>,
        to: Point3<f32>,
        dir: FlyDirection,
        time: f32,
    ) -> (Point3<f32>, ClashKind) {
        match self.detector.detect_fly_block(world, to, dir) {
            FlyBlock::Ground => {
                self.sounds.play(Sound::Landing);
                return (from, ClashKind::Static);
            }
            FlyBlock::Static => return (from, ClashKind::Static),
            FlyBlock::Clear => {}
        }

        match self.detector.live_penetration(world, to, time) {
            Some(penetration) => (to - penetration, ClashKind::from_penetration(penetration)),
            None => (to, ClashKind::NoClash),
        }
    }

    /// Whether a cube may be placed at `target`, logging the reason if not.
    pub fn can_place(&self, world: &World, target: Point3<f32>, eye: Option<Point3<f32>>) -> bool {
        match placement::check_placement(world, target, eye) {
            Ok(()) => true,
            Err(rejection) => {
                log::warn!("Cannot place cube at {:?}: {}", target, rejection);
                false
            }
        }
    }

    /// Whether the cube at `from` may move to `to`.
    ///
    /// When the actor stands on the cube, the displacement is stored as a
    /// follow-up for the actor's next frame.
    pub fn can_move(
        &mut self,
        world: &World,
        from: Point3<f32>,
        to: Point3<f32>,
        action: KeyAction,
        eye: Point3<f32>,
    ) -> bool {
        match placement::plan_move(world, &self.detector, from, to, action, eye) {
            Ok(follow_up) => {
                if follow_up.is_some() {
                    self.follow_up = follow_up;
                }
                true
            }
            Err(rejection) => {
                log::warn!("Cannot move cube to {:?}: {}", to, rejection);
                false
            }
        }
    }

    /// Flags the actor to fall if the cube at `center` was holding it up.
    pub fn validate_remove(&mut self, world: &World, center: Point3<f32>, eye: Point3<f32>) {
        if self.detector.is_standing_on(world, eye, center) {
            self.fall_down = true;
        }
    }

    /// Lifts or drops `eye` onto the nearest support; see
    /// [`ClashDetector::reset_eye_position`].
    pub fn reset_eye_position(&self, world: &World, eye: Point3<f32>) -> Option<Point3<f32>> {
        self.detector.reset_eye_position(world, eye)
    }

    /// Sends a sound cue to the sink.
    pub fn play_sound(&self, sound: Sound) {
        self.sounds.play(sound);
    }

    /// Takes the pending follow-up displacement.
    pub fn take_follow_up(&mut self) -> Option<Vector3<f32>> {
        self.follow_up.take()
    }

    /// Takes the pending fall flag.
    pub fn take_fall_down(&mut self) -> bool {
        std::mem::take(&mut self.fall_down)
    }
}

impl std::fmt::Debug for SceneTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneTracker")
            .field("detector", &self.detector)
            .field("follow_up", &self.follow_up)
            .field("fall_down", &self.fall_down)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SandboxConfig;
    use crate::engine_state::audio::LogSoundSink;
    use crate::engine_state::voxels::live_cube::LiveCube;
    use proptest::prelude::*;
    use std::f32::consts::FRAC_PI_2;

    fn tracker() -> SceneTracker {
        SceneTracker::new(Box::new(LogSoundSink))
    }

    #[test]
    fn walking_into_a_live_cube_reverts() {
        let mut world = World::new(&SandboxConfig::default());
        world
            .add_live_cube(LiveCube::from_motion(
                Point3::new(1.0, 0.0, 1.5),
                Vector3::new(0.0, 0.0, 0.0),
                [0.5; 3],
            ))
            .unwrap();
        let mut tracker = tracker();
        let from = Point3::new(0.3, 0.0, 1.5);
        let outcome = tracker.resolve_move(&world, from, Point3::new(0.45, 0.0, 1.5), FRAC_PI_2, None);
        assert_eq!(outcome, MoveOutcome { position: from, falling: false });
        assert_eq!(tracker.clashed_cube(), Some(0));
    }

    #[test]
    fn riding_accepts_the_step_and_checks_support() {
        let mut world = World::new(&SandboxConfig::default());
        let id = world
            .add_live_cube(LiveCube::from_motion(
                Point3::new(0.0, 0.0, 4.0),
                Vector3::new(0.0, 0.0, 3.0),
                [0.5; 3],
            ))
            .unwrap();
        let mut tracker = tracker();
        let on_top = Point3::new(0.2, 0.0, 6.0);
        let outcome = tracker.resolve_move(&world, Point3::new(0.0, 0.0, 6.0), on_top, FRAC_PI_2, Some(id));
        assert_eq!(outcome, MoveOutcome { position: on_top, falling: false });

        let off_edge = Point3::new(0.8, 0.0, 6.0);
        let outcome = tracker.resolve_move(&world, on_top, off_edge, FRAC_PI_2, Some(id));
        assert!(outcome.falling);
    }

    #[test]
    fn flying_into_a_live_cube_from_above_lands() {
        let mut world = World::new(&SandboxConfig::default());
        world
            .add_live_cube(LiveCube::from_motion(
                Point3::new(0.0, 0.0, 4.0),
                Vector3::new(0.0, 0.0, 3.0),
                [0.5; 3],
            ))
            .unwrap();
        let mut tracker = tracker();
        let (position, kind) = tracker.resolve_fly(
            &world,
            Point3::new(0.0, 0.0, 6.05),
            Point3::new(0.0, 0.0, 5.9),
            FlyDirection::Down,
            FRAC_PI_2,
        );
        assert_eq!(kind, ClashKind::LiveNz);
        assert!((position.z - 6.0).abs() < 1e-4);
    }

    #[test]
    fn removing_the_support_flags_a_fall() {
        let mut world = World::new(&SandboxConfig::default());
        world.add_cube(Point3::new(0.0, 0.0, 0.5), [1.0; 3]).unwrap();
        let mut tracker = tracker();
        tracker.validate_remove(&world, Point3::new(3.0, 0.0, 0.5), Point3::new(0.0, 0.0, 2.5));
        assert!(!tracker.take_fall_down());
        tracker.validate_remove(&world, Point3::new(0.0, 0.0, 0.5), Point3::new(0.0, 0.0, 2.5));
        assert!(tracker.take_fall_down());
        assert!(!tracker.take_fall_down());
    }

    #[test]
    fn follow_up_is_taken_once() {
        let mut world = World::new(&SandboxConfig::default());
        world.add_cube(Point3::new(0.0, 0.0, 0.5), [1.0; 3]).unwrap();
        let mut tracker = tracker();
        assert!(tracker.can_move(
            &world,
            Point3::new(0.0, 0.0, 0.5),
            Point3::new(0.0, 1.0, 0.5),
            KeyAction::Forward,
            Point3::new(0.0, 0.0, 2.5),
        ));
        assert_eq!(tracker.take_follow_up(), Some(Vector3::new(0.0, 1.0, 0.0)));
        assert_eq!(tracker.take_follow_up(), None);
    }

    proptest! {
        #[test]
        fn empty_scene_never_alters_a_step(
            fx in -10.0f32..10.0, fy in -10.0f32..10.0,
            dx in -0.2f32..0.2, dy in -0.2f32..0.2,
            z in 1.5f32..8.0,
        ) {
            let world = World::new(&SandboxConfig::default());
            let mut tracker = tracker();
            let from = Point3::new(fx, fy, z);
            let to = Point3::new(fx + dx, fy + dy, z);
            let outcome = tracker.resolve_move(&world, from, to, 0.0, None);
            prop_assert_eq!(outcome.position, to);
        }
    }
}
