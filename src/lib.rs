#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Cube Sandbox
//!
//! The simulation core of a first-person cube building sandbox.
//!
//! An actor walks, jumps and falls through a scene of unit cubes on a flat
//! ground grid. Cubes can be placed, removed and pushed around, and live
//! cubes oscillate along fixed paths, carrying the actor when it stands on
//! them.
//!
//! ## Key Modules
//!
//! * `config` - Tunable world and movement parameters, loaded from JSON
//! * `engine_state` - The scene, collision tracking and the actor's controller
//! * `error` - Errors raised while loading and saving
//!
//! ## Architecture
//!
//! The crate is a library with a headless driver. Rendering, windowing,
//! picking and audio playback belong to the embedding application, which
//! talks to [`engine_state::EngineState`] through:
//! * Key and mouse events
//! * Per-frame `update` calls
//! * Edit operations on world positions and cube indices
//! * The [`engine_state::voxels::scene_file::SceneStore`] and
//!   [`engine_state::audio::SoundSink`] collaborators
//!
//! ## Usage
//!
//! ```no_run
//! fn main() {
//!     cube_sandbox::run();
//! }
//! ```
//!
//! ## Performance Considerations
//!
//! * Collision uses O(1) hash lookups on a handful of cells per frame
//! * Live cube paths are indexed once, when the cube is added
//! * Everything runs on one thread, one synchronous pass per frame

use std::path::Path;

use log::info;
use web_time::{Duration, Instant};

use config::SandboxConfig;
use engine_state::{
    audio::LogSoundSink, voxels::scene_file::FileSceneStore, EngineState, KeyAction,
};

pub mod config;
pub mod engine_state;
pub mod error;

/// Configuration file read by [`run`] when present.
pub const CONFIG_FILE: &str = "sandbox.json";

/// Frame length of the headless driver.
const FRAME: Duration = Duration::from_micros(16_667);

/// Key events replayed by the headless driver, as `(frame, action, pressed)`.
const DEMO_SCRIPT: &[(u32, KeyAction, bool)] = &[
    (0, KeyAction::Forward, true),
    (45, KeyAction::Jump, true),
    (60, KeyAction::Jump, false),
    (120, KeyAction::Forward, false),
    (130, KeyAction::Right, true),
    (190, KeyAction::Right, false),
];

/// Number of frames the headless driver simulates.
const DEMO_FRAMES: u32 = 240;

/// Runs the sandbox headless: loads the configured scenes, replays a short
/// walk and logs where the actor ends up.
pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let config = load_config(Path::new(CONFIG_FILE));
    let store = FileSceneStore::new(config.resource_dir.clone());
    let mut engine = EngineState::new(config, Box::new(store), Box::new(LogSoundSink));
    info!(
        "Scene ready with {} cubes and {} live cubes, actor at {:?}",
        engine.world().cubes().len(),
        engine.world().live_cubes().len(),
        engine.position()
    );

    let start = Instant::now();
    for frame in 0..DEMO_FRAMES {
        for &(_, action, pressed) in DEMO_SCRIPT.iter().filter(|(at, _, _)| *at == frame) {
            engine.key_event(action, pressed);
        }
        engine.update(FRAME);
    }
    let duration = start.elapsed().as_secs_f64();

    info!("Actor finished at {:?}", engine.position());
    if duration > 0.0 {
        info!(
            "Duration: {:.2}s @ {:.2} FPS",
            duration,
            f64::from(DEMO_FRAMES) / duration
        );
    }
}

/// Reads the configuration file, falling back to defaults when it is absent
/// or unusable.
fn load_config(path: &Path) -> SandboxConfig {
    if !path.exists() {
        info!("No {:?}, using default configuration", path);
        return SandboxConfig::default();
    }
    match SandboxConfig::load(path) {
        Ok(config) => config,
        Err(err) => {
            log::error!("Error loading {:?}: {}, using default configuration", path, err);
            SandboxConfig::default()
        }
    }
}
