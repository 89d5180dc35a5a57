//! # Walk Camera
//!
//! First-person movement controller for the actor.
//!
//! The controller owns the actor's eye position, look direction and held
//! movement keys. Every frame it turns them into a step and hands that step
//! to the [`SceneTracker`], then interprets the outcome:
//!
//! - a walking step that loses support starts a fall,
//! - a rising step that hits something turns into a fall,
//! - a falling step that lands stops the fall and resumes any held key,
//! - landing on top of a live cube starts riding it.
//!
//! ## Key Components
//! - `Motion`: Held direction along one axis
//! - `WalkCamera`: Eye position, orientation and movement state

use cgmath::{Deg, InnerSpace, Matrix4, Point3, Vector3};

use crate::config::SandboxConfig;
use crate::engine_state::audio::Sound;
use crate::engine_state::tracking::{clash::ClashKind, linkage::Linkage, SceneTracker};
use crate::engine_state::voxels::{grid::FlyDirection, world::World};
use crate::engine_state::KeyAction;

/// Yaw the camera starts with, looking along +y.
const INITIAL_YAW: f32 = 90.0;

/// Held direction along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Motion {
    /// Not moving.
    #[default]
    Still,
    /// Moving along the positive axis.
    Positive,
    /// Moving along the negative axis.
    Negative,
}

impl Motion {
    /// `1`, `-1` or `0`.
    pub fn sign(self) -> f32 {
        match self {
            Motion::Still => 0.0,
            Motion::Positive => 1.0,
            Motion::Negative => -1.0,
        }
    }

    fn release(&mut self, held: Motion) {
        if *self == held {
            *self = Motion::Still;
        }
    }
}

/// First-person walking camera.
///
/// `x` moves along `right`, `y` along `front` and `z` along world up.
#[derive(Debug, Clone)]
pub struct WalkCamera {
    /// Eye position in world space.
    pub position: Point3<f32>,
    /// Horizontal look angle, counter clockwise from +x.
    pub yaw: Deg<f32>,
    /// Vertical look angle, positive looks up.
    pub pitch: Deg<f32>,
    view_dir: Vector3<f32>,
    front: Vector3<f32>,
    right: Vector3<f32>,
    xdir: Motion,
    ydir: Motion,
    zdir: Motion,
    fly_time: f32,
    link: Linkage,
    move_action: Option<KeyAction>,
    initial_eye: Point3<f32>,
    velocity: f32,
    sensitivity: f32,
    max_look_up: f32,
    max_look_down: f32,
    max_fly_time: f32,
}

impl WalkCamera {
    /// Creates a camera standing at the configured starting point.
    pub fn new(config: &SandboxConfig, world: &World, tracker: &SceneTracker) -> Self {
        let mut camera = Self {
            position: config.initial_eye(),
            yaw: Deg(INITIAL_YAW),
            pitch: Deg(0.0),
            view_dir: Vector3::unit_y(),
            front: Vector3::unit_y(),
            right: Vector3::unit_x(),
            xdir: Motion::Still,
            ydir: Motion::Still,
            zdir: Motion::Still,
            fly_time: 0.0,
            link: Linkage::Idle,
            move_action: None,
            initial_eye: config.initial_eye(),
            velocity: config.walk_velocity,
            sensitivity: config.mouse_sensitivity,
            max_look_up: config.max_look_up,
            max_look_down: config.max_look_down,
            max_fly_time: config.max_fly_time,
        };
        camera.reset(world, tracker);
        camera
    }

    /// Sends the actor back to the starting point, looking along +y.
    pub fn reset(&mut self, world: &World, tracker: &SceneTracker) {
        tracker.play_sound(Sound::Reset);
        self.position = tracker
            .reset_eye_position(world, self.initial_eye)
            .unwrap_or(self.initial_eye);
        self.yaw = Deg(INITIAL_YAW);
        self.pitch = Deg(0.0);
        self.update_vectors();

        self.xdir = Motion::Still;
        self.ydir = Motion::Still;
        self.zdir = Motion::Still;
        self.fly_time = 0.0;
        self.link.end();
        log::info!("Actor reset to {:?}", self.position);
    }

    /// Settles the actor where it is after the scene changed underneath it,
    /// falling back to a full reset when there is nowhere to stand.
    ///
    /// Any ride ends, since live cube ids do not survive a scene change.
    pub fn settle(&mut self, world: &World, tracker: &SceneTracker) {
        self.link.end();
        match tracker.reset_eye_position(world, self.position) {
            Some(eye) => self.position = eye,
            None => self.reset(world, tracker),
        }
    }

    /// Advances the actor by one frame of `dt` seconds at scene time `time`.
    ///
    /// Returns the new eye position.
    pub fn look_and_move(
        &mut self,
        world: &World,
        tracker: &mut SceneTracker,
        time: f32,
        dt: f32,
    ) -> Point3<f32> {
        if let Some(eye) = self.link.linked_eye(world, time) {
            self.position = eye;
        } else if let Some(shift) = tracker.take_follow_up() {
            self.position += shift;
        } else if tracker.take_fall_down() {
            self.zdir = Motion::Negative;
        }

        if self.is_moving() {
            let step = self.velocity * dt;
            let next = self.position
                + self.right * (self.xdir.sign() * step)
                + self.front * (self.ydir.sign() * step);

            if self.zdir == Motion::Still {
                self.walk_to(world, tracker, next, time);
            } else {
                self.fly_to(world, tracker, next, time, dt);
            }

            if !world.grid().is_in_grid(self.position.x, self.position.y) && self.position.z < 0.0 {
                self.reset(world, tracker);
            }
        }
        self.position
    }

    fn walk_to(&mut self, world: &World, tracker: &mut SceneTracker, next: Point3<f32>, time: f32) {
        let outcome = tracker.resolve_move(world, self.position, next, time, self.link.riding_cube());
        if self.link.is_riding() {
            self.link.update_offset(outcome.position - self.position);
        }
        self.position = outcome.position;
        if outcome.falling {
            self.zdir = Motion::Negative;
            self.link.end();
        }
    }

    fn fly_to(
        &mut self,
        world: &World,
        tracker: &mut SceneTracker,
        next: Point3<f32>,
        time: f32,
        dt: f32,
    ) {
        let next = next + Vector3::unit_z() * (self.zdir.sign() * self.velocity * dt);
        let flat = self.xdir != Motion::Still || self.ydir != Motion::Still;
        let dir = if flat {
            FlyDirection::Free
        } else if self.zdir == Motion::Positive {
            FlyDirection::Up
        } else {
            FlyDirection::Down
        };

        let (position, kind) = tracker.resolve_fly(world, self.position, next, dir, time);
        self.position = position;

        if kind != ClashKind::NoClash {
            if flat {
                self.xdir = Motion::Still;
                self.ydir = Motion::Still;
            } else if self.zdir == Motion::Positive {
                self.zdir = Motion::Negative;
            } else if kind.stops_fall() {
                self.zdir = Motion::Still;
                if kind == ClashKind::LiveNz {
                    if let Some(cube) = tracker.clashed_cube() {
                        self.link.start(world, cube, self.position, time);
                    }
                }
                self.resume_move();
            }
        }

        if self.zdir == Motion::Positive {
            self.fly_time += dt;
            if self.fly_time >= self.max_fly_time {
                self.zdir = Motion::Negative;
            }
        }
    }

    /// Applies a key press or release.
    pub fn move_state(&mut self, action: KeyAction, pressed: bool) {
        match action {
            KeyAction::Forward | KeyAction::Backward | KeyAction::Left | KeyAction::Right => {
                self.move_action = pressed.then_some(action);
                let (axis, held) = match action {
                    KeyAction::Forward => (&mut self.ydir, Motion::Positive),
                    KeyAction::Backward => (&mut self.ydir, Motion::Negative),
                    KeyAction::Left => (&mut self.xdir, Motion::Negative),
                    _ => (&mut self.xdir, Motion::Positive),
                };
                if pressed {
                    *axis = held;
                } else {
                    axis.release(held);
                }
            }
            KeyAction::Jump => {
                if pressed {
                    self.zdir = Motion::Positive;
                    self.fly_time = 0.0;
                    self.link.end();
                } else if self.zdir == Motion::Positive {
                    self.zdir = Motion::Negative;
                }
            }
            KeyAction::Up | KeyAction::Down => {}
        }
    }

    /// Restarts the direction of the last held movement key.
    pub fn resume_move(&mut self) {
        match self.move_action {
            Some(KeyAction::Forward) => self.ydir = Motion::Positive,
            Some(KeyAction::Backward) => self.ydir = Motion::Negative,
            Some(KeyAction::Left) => self.xdir = Motion::Negative,
            Some(KeyAction::Right) => self.xdir = Motion::Positive,
            _ => {}
        }
    }

    /// Turns the view by a mouse delta.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw -= Deg(dx * self.sensitivity);
        self.pitch -= Deg(dy * self.sensitivity * 0.5);
        self.pitch = Deg(self.pitch.0.clamp(self.max_look_down, self.max_look_up));
        self.update_vectors();
    }

    fn update_vectors(&mut self) {
        let (yaw_sin, yaw_cos) = self.yaw.0.to_radians().sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.0.to_radians().sin_cos();
        self.view_dir = Vector3::new(yaw_cos * pitch_cos, yaw_sin * pitch_cos, pitch_sin);
        self.front = Vector3::new(yaw_cos, yaw_sin, 0.0).normalize();
        self.right = self.front.cross(Vector3::unit_z()).normalize();
    }

    /// View matrix looking along the view direction with +z up.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.position, self.view_dir, Vector3::unit_z())
    }

    /// Whether any direction is held.
    pub fn is_moving(&self) -> bool {
        self.xdir != Motion::Still || self.ydir != Motion::Still || self.zdir != Motion::Still
    }

    /// Whether the actor is rising or falling.
    pub fn is_flying(&self) -> bool {
        self.zdir != Motion::Still
    }

    /// Vertical motion.
    pub fn vertical_motion(&self) -> Motion {
        self.zdir
    }

    /// Normalized look direction.
    pub fn view_dir(&self) -> Vector3<f32> {
        self.view_dir
    }

    /// Horizontal forward direction.
    pub fn front(&self) -> Vector3<f32> {
        self.front
    }

    /// Horizontal right direction.
    pub fn right(&self) -> Vector3<f32> {
        self.right
    }

    /// Ride-along state.
    pub fn linkage(&self) -> &Linkage {
        &self.link
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::audio::LogSoundSink;
    use crate::engine_state::voxels::live_cube::LiveCube;
    use std::f32::consts::FRAC_PI_2;

    /// Scene time at which every live cube sits at its center.
    const AT_CENTER: f32 = FRAC_PI_2;

    fn setup(cubes: &[(f32, f32, f32)]) -> (World, SceneTracker, WalkCamera) {
        let config = SandboxConfig::default();
        let mut world = World::new(&config);
        for &(x, y, z) in cubes {
            world.add_cube(Point3::new(x, y, z), [1.0; 3]).unwrap();
        }
        let tracker = SceneTracker::new(Box::new(LogSoundSink));
        let camera = WalkCamera::new(&config, &world, &tracker);
        (world, tracker, camera)
    }

    #[test]
    fn starts_on_the_ground_facing_y() {
        let (_, _, camera) = setup(&[]);
        assert_eq!(camera.position, Point3::new(0.0, 0.0, 1.5));
        assert!((camera.front() - Vector3::unit_y()).magnitude() < 1e-6);
        assert!((camera.right() - Vector3::unit_x()).magnitude() < 1e-6);
        assert!(!camera.is_moving());
    }

    #[test]
    fn starts_on_top_of_a_cube_at_the_origin() {
        let (_, _, camera) = setup(&[(0.0, 0.0, 0.5)]);
        assert_eq!(camera.position, Point3::new(0.0, 0.0, 2.5));
    }

    #[test]
    fn walking_forward_moves_along_y() {
        let (world, mut tracker, mut camera) = setup(&[]);
        camera.move_state(KeyAction::Forward, true);
        let position = camera.look_and_move(&world, &mut tracker, 0.0, 0.1);
        assert!((position.y - 0.4).abs() < 1e-5);
        assert!(position.x.abs() < 1e-5);
        camera.move_state(KeyAction::Forward, false);
        assert!(!camera.is_moving());
    }

    #[test]
    fn releasing_an_opposite_key_keeps_direction() {
        let (_, _, mut camera) = setup(&[]);
        camera.move_state(KeyAction::Forward, true);
        camera.move_state(KeyAction::Backward, false);
        assert!(camera.is_moving());
    }

    #[test]
    fn jump_rises_then_falls_back_to_the_ground() {
        let (world, mut tracker, mut camera) = setup(&[]);
        camera.move_state(KeyAction::Jump, true);
        let mut highest: f32 = 0.0;
        for _ in 0..100 {
            let position = camera.look_and_move(&world, &mut tracker, 0.0, 0.05);
            highest = highest.max(position.z);
            if !camera.is_flying() {
                break;
            }
        }
        assert!(highest > 4.0);
        assert!(!camera.is_flying());
        assert!((camera.position.z - 1.5).abs() < 0.25);
    }

    #[test]
    fn pitch_is_clamped() {
        let (_, _, mut camera) = setup(&[]);
        camera.rotate(0.0, -10_000.0);
        assert_eq!(camera.pitch, Deg(30.0));
        camera.rotate(0.0, 10_000.0);
        assert_eq!(camera.pitch, Deg(-85.0));
    }

    fn add_live(world: &mut World, center: (f32, f32, f32), motion: (f32, f32, f32)) {
        world
            .add_live_cube(LiveCube::from_motion(
                Point3::new(center.0, center.1, center.2),
                Vector3::new(motion.0, motion.1, motion.2),
                [0.5; 3],
            ))
            .unwrap();
    }

    /// Drops the actor from `eye` until it stops falling.
    fn drop_from(
        world: &World,
        tracker: &mut SceneTracker,
        camera: &mut WalkCamera,
        eye: Point3<f32>,
    ) {
        camera.position = eye;
        camera.move_state(KeyAction::Jump, true);
        camera.move_state(KeyAction::Jump, false);
        assert_eq!(camera.vertical_motion(), Motion::Negative);
        for _ in 0..20 {
            camera.look_and_move(world, tracker, AT_CENTER, 0.05);
            if !camera.is_flying() {
                break;
            }
        }
    }

    #[test]
    fn landing_on_a_live_cube_starts_riding() {
        let (mut world, mut tracker, mut camera) = setup(&[]);
        add_live(&mut world, (5.0, 0.0, 2.5), (0.0, 1.0, 0.0));

        drop_from(&world, &mut tracker, &mut camera, Point3::new(5.0, 0.0, 4.3));
        assert!(!camera.is_flying());
        assert!((camera.position.z - 4.5).abs() < 1e-4);
        match *camera.linkage() {
            Linkage::Riding { cube, offset } => {
                assert_eq!(cube, 0);
                assert!((offset - Vector3::new(0.0, 0.0, 2.0)).magnitude() < 1e-4);
            }
            Linkage::Idle => panic!("actor should ride the cube it landed on"),
        }

        // At t = 0 the cube is one unit further along +y.
        let position = camera.look_and_move(&world, &mut tracker, 0.0, 0.05);
        assert!((position - Point3::new(5.0, 1.0, 4.5)).magnitude() < 1e-4);
    }

    #[test]
    fn live_ceiling_turns_a_jump_into_a_fall() {
        let (mut world, mut tracker, mut camera) = setup(&[]);
        add_live(&mut world, (0.0, 0.0, 3.5), (0.0, 0.0, 0.0));

        camera.move_state(KeyAction::Jump, true);
        let mut frames = 0;
        while camera.vertical_motion() == Motion::Positive && frames < 20 {
            camera.look_and_move(&world, &mut tracker, AT_CENTER, 0.05);
            frames += 1;
        }
        // Well before the jump would run out on its own.
        assert!(frames < 10);
        assert_eq!(camera.vertical_motion(), Motion::Negative);
        assert!(camera.position.z + 0.1 <= 3.0 + 1e-4);
        assert!(!camera.linkage().is_riding());
    }

    #[test]
    fn walking_off_a_ridden_cube_starts_a_fall() {
        let (mut world, mut tracker, mut camera) = setup(&[]);
        add_live(&mut world, (5.0, 0.0, 2.5), (0.0, 0.0, 0.0));
        drop_from(&world, &mut tracker, &mut camera, Point3::new(5.0, 0.0, 4.3));
        assert!(camera.linkage().is_riding());

        camera.move_state(KeyAction::Forward, true);
        for _ in 0..10 {
            camera.look_and_move(&world, &mut tracker, AT_CENTER, 0.05);
            if camera.is_flying() {
                break;
            }
        }
        assert_eq!(camera.vertical_motion(), Motion::Negative);
        assert_eq!(*camera.linkage(), Linkage::Idle);
        assert!(camera.position.y >= 0.55);
    }

    #[test]
    fn settle_ends_the_ride_and_drops_to_the_ground() {
        let (mut world, mut tracker, mut camera) = setup(&[]);
        add_live(&mut world, (5.0, 0.0, 2.5), (0.0, 0.0, 0.0));
        drop_from(&world, &mut tracker, &mut camera, Point3::new(5.0, 0.0, 4.3));
        assert!(camera.linkage().is_riding());

        world.rebuild_live_from_list(&[10.0, 10.0, 8.5, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0]).unwrap();
        camera.settle(&world, &tracker);
        assert_eq!(*camera.linkage(), Linkage::Idle);

        let position = camera.look_and_move(&world, &mut tracker, AT_CENTER, 0.05);
        assert!((position - Point3::new(5.0, 0.0, 1.5)).magnitude() < 1e-4);
    }

    #[test]
    fn walking_off_a_ledge_starts_a_fall() {
        let (world, mut tracker, mut camera) = setup(&[(0.0, 0.0, 0.5)]);
        camera.move_state(KeyAction::Forward, true);
        for _ in 0..4 {
            camera.look_and_move(&world, &mut tracker, 0.0, 0.1);
        }
        assert_eq!(camera.vertical_motion(), Motion::Negative);
    }
}
