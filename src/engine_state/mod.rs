//! # Engine State Module
//!
//! The core module that owns the sandbox state and exposes it to the outside.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container: scene, tracker and actor
//! * `audio` - Sound cues handed to an external player
//! * `camera_state` - The actor's first-person movement controller
//! * `tracking` - Collision resolution and edit validation
//! * `voxels` - Cube data, occupancy indices and scene files
//!
//! ## Architecture
//!
//! `EngineState` is the single owner of the `World`. Subsystems never hold
//! on to it; each call borrows what it needs for its duration, so one frame
//! runs as a straight sequence of synchronous calls:
//!
//! 1. Input arrives as key and mouse events
//! 2. `update` advances the clock and moves the actor through the tracker
//! 3. Edits are validated by the tracker before the world is changed
//!
//! Rendering, windowing and picking are external. Callers pass in world
//! positions and cube indices they resolved themselves.

use cgmath::{Point3, Vector3};
use web_time::Duration;

use audio::SoundSink;
use camera_state::WalkCamera;
use tracking::SceneTracker;
use voxels::{
    cube::{palette_color, random_color, Color, CubeFace},
    live_cube::{LiveCube, LiveCubeId},
    scene_file::SceneStore,
    world::World,
};

use crate::config::SandboxConfig;
use crate::error::SandboxError;

pub mod audio;
pub mod camera_state;
pub mod tracking;
pub mod voxels;

/// Discrete input actions.
///
/// The movement keys drive the actor; all but `Jump` also move the selected
/// cube when passed to [`EngineState::move_selected`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Walk forward.
    Forward,
    /// Walk backward.
    Backward,
    /// Strafe left.
    Left,
    /// Strafe right.
    Right,
    /// Jump while pressed.
    Jump,
    /// Raise the selected cube.
    Up,
    /// Lower the selected cube.
    Down,
}

impl KeyAction {
    /// Displacement of a cube moved with this action, given the viewer's
    /// horizontal forward direction.
    ///
    /// Horizontal moves snap the view to its dominant axis first, so a cube
    /// always moves exactly one cell. `Jump` does not move cubes.
    pub fn cube_shift(self, front: Vector3<f32>, unit_size: f32) -> Option<Vector3<f32>> {
        let d = if front.y.abs() >= front.x.abs() {
            Vector3::new(0.0, if front.y > 0.0 { 1.0 } else { -1.0 }, 0.0)
        } else {
            Vector3::new(if front.x > 0.0 { 1.0 } else { -1.0 }, 0.0, 0.0)
        };
        let shift = match self {
            KeyAction::Forward => d,
            KeyAction::Backward => -d,
            KeyAction::Left => Vector3::new(-d.y, d.x, d.z),
            KeyAction::Right => Vector3::new(d.y, -d.x, d.z),
            KeyAction::Up => Vector3::unit_z(),
            KeyAction::Down => -Vector3::unit_z(),
            KeyAction::Jump => return None,
        };
        Some(shift * unit_size)
    }
}

/// The main state container for the sandbox
///
/// This struct owns the scene, the collision tracker and the actor, and
/// coordinates their interactions. It handles input, per-frame movement and
/// cube editing.
///
/// # Examples
///
/// ```
/// use cube_sandbox::config::SandboxConfig;
/// use cube_sandbox::engine_state::{EngineState, KeyAction};
/// use cube_sandbox::engine_state::audio::LogSoundSink;
/// use cube_sandbox::engine_state::voxels::scene_file::MemorySceneStore;
/// use web_time::Duration;
///
/// let mut engine = EngineState::new(
///     SandboxConfig::default(),
///     Box::new(MemorySceneStore::new()),
///     Box::new(LogSoundSink),
/// );
///
/// engine.key_event(KeyAction::Forward, true);
/// for _ in 0..10 {
///     engine.update(Duration::from_millis(16));
/// }
/// assert!(engine.position().y > 0.0);
/// ```
pub struct EngineState {
    config: SandboxConfig,
    world: World,
    tracker: SceneTracker,
    camera: WalkCamera,
    store: Box<dyn SceneStore>,
    /// Colour for new cubes; `None` picks a random colour per cube
    cube_color: Option<Color>,
    /// Index of the highlighted cube
    selection: Option<usize>,
    /// Scene clock in seconds
    time: f32,
}

impl EngineState {
    /// Creates the engine and loads the configured scenes from `store`.
    ///
    /// Scenes that fail to load leave the world empty; see [`World::reload`].
    pub fn new(
        config: SandboxConfig,
        store: Box<dyn SceneStore>,
        sounds: Box<dyn SoundSink>,
    ) -> Self {
        let mut world = World::new(&config);
        world.reload(store.as_ref(), &config.scene_name);
        world.reload_live(store.as_ref(), &config.live_scene_name);

        let tracker = SceneTracker::new(sounds);
        let camera = WalkCamera::new(&config, &world, &tracker);

        Self {
            config,
            world,
            tracker,
            camera,
            store,
            cube_color: None,
            selection: None,
            time: 0.0,
        }
    }

    /// The scene.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The actor's controller.
    pub fn camera(&self) -> &WalkCamera {
        &self.camera
    }

    /// The collision tracker.
    pub fn tracker(&self) -> &SceneTracker {
        &self.tracker
    }

    /// The actor's eye position.
    pub fn position(&self) -> Point3<f32> {
        self.camera.position
    }

    /// Seconds of scene time elapsed.
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Index of the highlighted cube.
    pub fn selection(&self) -> Option<usize> {
        self.selection
    }

    /// Advances the scene clock by `dt` and moves the actor.
    ///
    /// Returns the actor's new eye position.
    pub fn update(&mut self, dt: Duration) -> Point3<f32> {
        let dt = dt.as_secs_f32();
        self.time += dt;
        self.camera
            .look_and_move(&self.world, &mut self.tracker, self.time, dt)
    }

    /// Forwards a key press or release to the actor.
    pub fn key_event(&mut self, action: KeyAction, pressed: bool) {
        self.camera.move_state(action, pressed);
    }

    /// Turns the view by a mouse delta.
    pub fn rotate_view(&mut self, dx: f32, dy: f32) {
        self.camera.rotate(dx, dy);
    }

    /// Picks the colour for new cubes from a number key.
    ///
    /// Key 0 switches to random colours.
    pub fn select_color(&mut self, digit: u8) {
        match (digit, palette_color(digit)) {
            (0, _) => self.cube_color = None,
            (_, Some(color)) => self.cube_color = Some(color),
            (_, None) => log::warn!("No palette colour for key {}", digit),
        }
    }

    /// Places a cube centered at `target` if the cell is free and clear of
    /// the actor.
    pub fn add_cube(&mut self, target: Point3<f32>) -> bool {
        if self.world.cubes().len() >= self.config.max_cubes {
            log::warn!("Reached the maximum number {} of cubes", self.config.max_cubes);
            return false;
        }
        if !self
            .tracker
            .can_place(&self.world, target, Some(self.camera.position))
        {
            return false;
        }

        let color = self.cube_color.unwrap_or_else(random_color);
        match self.world.add_cube(target, color) {
            Ok(index) => {
                log::debug!("Added cube {} at {:?}", index, target);
                true
            }
            Err(err) => {
                log::warn!("{}", err);
                false
            }
        }
    }

    /// Places a cube against `face` of the cube at `index`.
    pub fn add_cube_against(&mut self, index: usize, face: CubeFace) -> bool {
        match self.world.cubes().get(index) {
            Some(cube) => {
                let target = cube.center + face.offset(self.config.unit_size);
                self.add_cube(target)
            }
            None => {
                log::warn!("No cube {} to build against", index);
                false
            }
        }
    }

    /// Removes the cube at `index`. The actor falls if it was standing on it.
    pub fn remove_cube(&mut self, index: usize) -> bool {
        if self.world.cubes().is_empty() {
            log::warn!("No cubes in the scene");
            return false;
        }
        if index < self.world.cubes().len() {
            self.clear_selection();
        }
        match self.world.remove_cube(index) {
            Some(cube) => {
                self.tracker
                    .validate_remove(&self.world, cube.center, self.camera.position);
                true
            }
            None => false,
        }
    }

    /// Highlights the cube at `index` by inverting its colour.
    ///
    /// The previous selection gets its colour back. Selecting the highlighted
    /// cube again clears the selection.
    pub fn select_cube(&mut self, index: usize) -> bool {
        if index >= self.world.cubes().len() {
            log::warn!("No cube {} to select", index);
            return false;
        }
        let previous = self.clear_selection();
        if previous == Some(index) {
            return true;
        }
        if let Some(cube) = self.world.cube_mut(index) {
            cube.invert_color();
        }
        self.selection = Some(index);
        true
    }

    /// Restores the highlighted cube's colour and forgets the selection.
    pub fn clear_selection(&mut self) -> Option<usize> {
        let previous = self.selection.take();
        if let Some(cube) = previous.and_then(|index| self.world.cube_mut(index)) {
            cube.invert_color();
        }
        previous
    }

    /// Moves the selected cube one cell in the direction of `action`.
    ///
    /// The actor travels with the cube when standing on it.
    pub fn move_selected(&mut self, action: KeyAction) -> bool {
        let Some(index) = self.selection else {
            return false;
        };
        let Some(shift) = action.cube_shift(self.camera.front(), self.config.unit_size) else {
            return false;
        };
        let Some(from) = self.world.cubes().get(index).map(|cube| cube.center) else {
            return false;
        };

        let to = from + shift;
        if !self
            .tracker
            .can_move(&self.world, from, to, action, self.camera.position)
        {
            return false;
        }
        self.world.move_cube(index, to).is_some()
    }

    /// Registers a live cube moving along `motion`.
    pub fn add_live_cube(
        &mut self,
        center: Point3<f32>,
        motion: Vector3<f32>,
        color: Color,
    ) -> Result<LiveCubeId, SandboxError> {
        self.world
            .add_live_cube(LiveCube::from_motion(center, motion, color))
    }

    /// Replaces the static cubes with the named scene and resets the actor.
    pub fn reload(&mut self, name: &str) -> usize {
        self.selection = None;
        let count = self.world.reload(self.store.as_ref(), name);
        self.camera.reset(&self.world, &self.tracker);
        count
    }

    /// Saves the static cubes under `name`.
    ///
    /// The highlighted cube is saved with its own colour.
    pub fn save(&mut self, name: &str) -> Result<(), SandboxError> {
        self.clear_selection();
        self.world.save(self.store.as_ref(), name)?;
        log::info!("Saved {} cubes to scene '{}'", self.world.cubes().len(), name);
        Ok(())
    }

    /// Replaces the live cubes with the named scene.
    ///
    /// The actor stops riding and drops onto whatever is below it.
    pub fn reload_live(&mut self, name: &str) -> usize {
        let count = self.world.reload_live(self.store.as_ref(), name);
        self.camera.settle(&self.world, &self.tracker);
        count
    }

    /// Saves the live cubes under `name`.
    pub fn save_live(&self, name: &str) -> Result<(), SandboxError> {
        self.world.save_live(self.store.as_ref(), name)
    }
}
