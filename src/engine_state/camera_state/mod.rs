//! # Camera State Management
//!
//! This module handles the actor's point of view:
//! - Eye position tracking, driven through the scene tracker
//! - Look direction and view matrix calculation
//! - Held movement keys, jumping and falling
//! - Riding live cubes
//!
//! ## Core Components
//! - `WalkCamera`: First-person controller that walks, jumps and rides
//! - `Motion`: Held direction along a single axis
//!
//! ## Key Features
//! - First-person controls (WASD, jump, mouse look)
//! - Sliding along walls instead of stopping dead
//! - Automatic reset when the actor falls off the playable grid

pub mod walk;

pub use walk::{Motion, WalkCamera};
