//! # World Module
//!
//! This module provides the `World` struct, the single owner of the scene's
//! cube lists and the occupancy indices derived from them.
//!
//! ## Architecture
//!
//! The world keeps two representations of each cube kind in step:
//! - an ordered list of cube records (what gets saved and drawn), and
//! - a hash index from lattice cells to occupancy (what collision reads).
//!
//! Every mutation goes through `World` so the two never drift apart. The
//! clash detector and placement validator borrow the world read-only.
//!
//! ## Live Cubes
//!
//! A live cube is registered in the live index over its whole swept range
//! once, when it is added. The index is a static broad-phase approximation
//! and is not refreshed as the cube moves.

use cgmath::{Point3, Vector3};

use super::cube::{Color, StaticCube};
use super::grid::{CellIndex, GridIndex};
use super::live_cube::{LiveCube, LiveCubeId};
use super::occupancy::{LiveOccupancy, StaticOccupancy};
use super::scene_file::{
    format_records, parse_records, SceneStore, LIVE_RECORD_LEN, STATIC_RECORD_LEN,
};
use crate::config::SandboxConfig;
use crate::error::SandboxError;

/// The cube scene: static cubes, live cubes and their occupancy indices.
///
/// # Examples
///
/// ```
/// use cgmath::Point3;
/// use cube_sandbox::config::SandboxConfig;
/// use cube_sandbox::engine_state::voxels::world::World;
///
/// let mut world = World::new(&SandboxConfig::default());
/// world.add_cube(Point3::new(0.0, 0.0, 0.5), [1.0, 0.0, 0.0]).unwrap();
/// assert!(world.is_static_cell(Point3::new(0, 0, 0)));
/// ```
#[derive(Debug, Clone)]
pub struct World {
    grid: GridIndex,
    cubes: Vec<StaticCube>,
    live_cubes: Vec<LiveCube>,
    static_map: StaticOccupancy,
    live_map: LiveOccupancy,
    max_cubes: usize,
    max_live_cubes: usize,
}

impl World {
    /// Creates an empty world.
    pub fn new(config: &SandboxConfig) -> Self {
        World {
            grid: GridIndex::new(config),
            cubes: Vec::new(),
            live_cubes: Vec::new(),
            static_map: StaticOccupancy::new(),
            live_map: LiveOccupancy::new(),
            max_cubes: config.max_cubes,
            max_live_cubes: config.max_live_cubes,
        }
    }

    /// Lattice geometry of this world.
    pub fn grid(&self) -> &GridIndex {
        &self.grid
    }

    /// Static cubes in insertion order.
    pub fn cubes(&self) -> &[StaticCube] {
        &self.cubes
    }

    /// Live cubes in registration order; a cube's id is its position here.
    pub fn live_cubes(&self) -> &[LiveCube] {
        &self.live_cubes
    }

    /// Static occupancy index.
    pub fn static_map(&self) -> &StaticOccupancy {
        &self.static_map
    }

    /// Live occupancy index.
    pub fn live_map(&self) -> &LiveOccupancy {
        &self.live_map
    }

    /// Whether a static cube occupies `cell`.
    pub fn is_static_cell(&self, cell: CellIndex) -> bool {
        self.static_map.contains(cell)
    }

    /// The live cube sweeping `cell`, if any.
    pub fn live_at(&self, cell: CellIndex) -> Option<LiveCubeId> {
        self.live_map.get(cell)
    }

    /// A live cube by id.
    pub fn live_cube(&self, id: LiveCubeId) -> Option<&LiveCube> {
        self.live_cubes.get(id)
    }

    /// Position of a live cube at `time`.
    pub fn live_position(&self, id: LiveCubeId, time: f32) -> Option<Point3<f32>> {
        self.live_cube(id).map(|cube| cube.position(time))
    }

    /// Marks the cell containing `center` as occupied without recording a cube.
    fn occupy(&mut self, center: Point3<f32>) {
        self.static_map.insert(self.grid.cell_of_point(center));
    }

    /// Clears the cell containing `center` without touching the cube list.
    fn vacate(&mut self, center: Point3<f32>) {
        self.static_map.remove(self.grid.cell_of_point(center));
    }

    /// Adds a static cube and returns its index.
    ///
    /// # Errors
    /// `CapacityReached` when the scene already holds `max_cubes` cubes.
    pub fn add_cube(&mut self, center: Point3<f32>, color: Color) -> Result<usize, SandboxError> {
        if self.cubes.len() >= self.max_cubes {
            return Err(SandboxError::CapacityReached {
                limit: self.max_cubes,
            });
        }
        self.cubes.push(StaticCube::new(center, color));
        self.occupy(center);
        Ok(self.cubes.len() - 1)
    }

    /// Removes the static cube at `index`, returning it.
    pub fn remove_cube(&mut self, index: usize) -> Option<StaticCube> {
        if index >= self.cubes.len() {
            return None;
        }
        let cube = self.cubes.remove(index);
        self.vacate(cube.center);
        Some(cube)
    }

    /// Index of the static cube whose center lies in the same cell as `center`.
    pub fn find_cube(&self, center: Point3<f32>) -> Option<usize> {
        let cell = self.grid.cell_of_point(center);
        self.cubes
            .iter()
            .position(|cube| self.grid.cell_of_point(cube.center) == cell)
    }

    /// Moves the static cube at `index` to `center`.
    ///
    /// Returns the previous center, or `None` when there is no such cube.
    pub fn move_cube(&mut self, index: usize, center: Point3<f32>) -> Option<Point3<f32>> {
        let old = self.cubes.get(index)?.center;
        self.vacate(old);
        self.occupy(center);
        self.cubes[index].center = center;
        Some(old)
    }

    /// Mutable access to a static cube record, for recolouring.
    pub fn cube_mut(&mut self, index: usize) -> Option<&mut StaticCube> {
        self.cubes.get_mut(index)
    }

    /// Replaces every static cube with the records in a flat list of
    /// `x y z r g b` values.
    ///
    /// # Errors
    /// `FieldCount` when the list does not split into whole records,
    /// `CapacityReached` when it holds more than `max_cubes` cubes. On error
    /// the world keeps whatever was loaded before the failing record.
    pub fn rebuild_from_list(&mut self, values: &[f32]) -> Result<usize, SandboxError> {
        if values.len() % STATIC_RECORD_LEN != 0 {
            return Err(SandboxError::FieldCount {
                per_record: STATIC_RECORD_LEN,
                found: values.len(),
            });
        }
        self.cubes.clear();
        self.static_map.clear();
        for record in values.chunks_exact(STATIC_RECORD_LEN) {
            self.add_cube(
                Point3::new(record[0], record[1], record[2]),
                [record[3], record[4], record[5]],
            )?;
        }
        Ok(self.cubes.len())
    }

    /// Static cubes as a flat `x y z r g b` list.
    pub fn to_list(&self) -> Vec<f32> {
        self.cubes
            .iter()
            .flat_map(|cube| {
                [
                    cube.center.x,
                    cube.center.y,
                    cube.center.z,
                    cube.color[0],
                    cube.color[1],
                    cube.color[2],
                ]
            })
            .collect()
    }

    /// Registers a live cube and its swept cells, returning its id.
    ///
    /// # Errors
    /// `CapacityReached` when the scene already holds `max_live_cubes` cubes.
    pub fn add_live_cube(&mut self, cube: LiveCube) -> Result<LiveCubeId, SandboxError> {
        if self.live_cubes.len() >= self.max_live_cubes {
            return Err(SandboxError::CapacityReached {
                limit: self.max_live_cubes,
            });
        }
        let id = self.live_cubes.len();
        self.live_cubes.push(cube);
        for cell in cube.swept_range(&self.grid) {
            self.live_map.insert(cell, id);
        }
        Ok(id)
    }

    /// Replaces every live cube with the records in a flat list of
    /// `x y z dx dy dz r g b` values.
    pub fn rebuild_live_from_list(&mut self, values: &[f32]) -> Result<usize, SandboxError> {
        if values.len() % LIVE_RECORD_LEN != 0 {
            return Err(SandboxError::FieldCount {
                per_record: LIVE_RECORD_LEN,
                found: values.len(),
            });
        }
        self.live_cubes.clear();
        self.live_map.clear();
        for record in values.chunks_exact(LIVE_RECORD_LEN) {
            self.add_live_cube(LiveCube::from_motion(
                Point3::new(record[0], record[1], record[2]),
                Vector3::new(record[3], record[4], record[5]),
                [record[6], record[7], record[8]],
            ))?;
        }
        Ok(self.live_cubes.len())
    }

    /// Live cubes as a flat `x y z dx dy dz r g b` list.
    pub fn live_to_list(&self) -> Vec<f32> {
        self.live_cubes
            .iter()
            .flat_map(|cube| {
                let motion = cube.motion();
                [
                    cube.center.x,
                    cube.center.y,
                    cube.center.z,
                    motion.x,
                    motion.y,
                    motion.z,
                    cube.color[0],
                    cube.color[1],
                    cube.color[2],
                ]
            })
            .collect()
    }

    /// Loads the named static scene, leaving the world empty when it cannot be
    /// read or parsed. Returns the number of cubes loaded.
    pub fn reload(&mut self, store: &dyn SceneStore, name: &str) -> usize {
        let loaded = store
            .load(name)
            .and_then(|text| parse_records(&text, STATIC_RECORD_LEN))
            .and_then(|values| self.rebuild_from_list(&values));

        match loaded {
            Ok(count) => {
                log::info!("Loaded {} cubes from scene '{}'", count, name);
                count
            }
            Err(err) => {
                log::error!("Error loading scene '{}': {}", name, err);
                self.cubes.clear();
                self.static_map.clear();
                0
            }
        }
    }

    /// Loads the named live cube scene, leaving no live cubes on failure.
    pub fn reload_live(&mut self, store: &dyn SceneStore, name: &str) -> usize {
        let loaded = store
            .load(name)
            .and_then(|text| parse_records(&text, LIVE_RECORD_LEN))
            .and_then(|values| self.rebuild_live_from_list(&values));

        match loaded {
            Ok(count) => {
                log::info!("Loaded {} live cubes from scene '{}'", count, name);
                count
            }
            Err(err) => {
                log::error!("Error loading live scene '{}': {}", name, err);
                self.live_cubes.clear();
                self.live_map.clear();
                0
            }
        }
    }

    /// Writes the static cubes to the named scene.
    pub fn save(&self, store: &dyn SceneStore, name: &str) -> Result<(), SandboxError> {
        store.persist(name, &format_records(&self.to_list(), STATIC_RECORD_LEN))
    }

    /// Writes the live cubes to the named scene.
    pub fn save_live(&self, store: &dyn SceneStore, name: &str) -> Result<(), SandboxError> {
        store.persist(name, &format_records(&self.live_to_list(), LIVE_RECORD_LEN))
    }
}
