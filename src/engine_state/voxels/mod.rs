//! # Cube Scene Core
//!
//! This module holds the data side of the sandbox: the lattice, the cubes
//! placed on it and the indices collision reads from.
//!
//! ## Architecture
//!
//! The scene is organized into several components:
//!
//! * **Grid**: Maps world coordinates to lattice cells and derives the cells an actor touches
//! * **Cube / Live Cube**: Static cube records and cubes oscillating along an axis
//! * **Occupancy**: Hash indices from cells to static or live occupancy
//! * **AABB**: Exact box tests between the actor and a single cube
//! * **World**: Owns the cube lists and keeps the occupancy indices in step
//! * **Scene File**: Text format and named storage for cube lists
//!
//! ## Data Flow
//!
//! 1. Scenes are loaded by name into the `World`
//! 2. Every edit goes through the `World`, which updates list and index together
//! 3. The scene tracker reads the indices for the broad phase
//! 4. Candidate cells are confirmed with AABB tests against exact positions
//!
//! ## Performance Considerations
//!
//! * Cell lookups are O(1) hash probes; no step scans the cube list
//! * A probe inspects at most twelve cells (three bands by four corners)
//! * Live cube sweeps are indexed once at registration

pub mod aabb;
pub mod cube;
pub mod grid;
pub mod live_cube;
pub mod occupancy;
pub mod scene_file;
pub mod world;
