//! # Clash Detector
//!
//! Broad-phase collision queries between the actor and the cube scene.
//!
//! ## Horizontal Moves
//!
//! A walking step samples the four footprint corners of the target position
//! at two layers, the body layer and the head layer, and packs the hits into
//! an 8 bit [`ClashMask`]: bit N for corner N in the body layer, bit N + 4 in
//! the head layer. [`MoveDecision::from_mask`] turns the mask into one of a
//! handful of outcomes, so the actor slides along a wall instead of sticking
//! to it.
//!
//! ## Vertical Moves
//!
//! Flying steps probe the bands the actor is moving into, then fall back to a
//! penetration test against live cubes, whose push-out vector tells the
//! caller whether it bumped a ceiling, a side or landed on top.
//!
//! The detector keeps only the mask, slide axis and last probed live cube
//! between calls. The scene itself is always borrowed from the [`World`].

use cgmath::{Point3, Vector3};

use crate::engine_state::voxels::{
    aabb::{actor_intersects, actor_is_landing_on, actor_penetration},
    grid::{FlyDirection, Probe},
    live_cube::LiveCubeId,
    world::World,
};

/// Penetration z components within this distance of zero count as horizontal.
pub const PENETRATION_EPSILON: f32 = 1e-6;

/// Outcome of a flying step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClashKind {
    /// The step was accepted unchanged.
    NoClash,
    /// Blocked by a static cube or the ground; the actor stays put.
    Static,
    /// Pushed up out of a live cube: the actor is on top of it.
    LiveNz,
    /// Pushed down out of a live cube: the actor hit it from below.
    LivePz,
    /// Pushed sideways out of a live cube.
    LiveXy,
}

impl ClashKind {
    /// Classifies a penetration vector by the sign of its z component.
    pub fn from_penetration(penetration: Vector3<f32>) -> Self {
        if penetration.z > PENETRATION_EPSILON {
            ClashKind::LivePz
        } else if penetration.z < -PENETRATION_EPSILON {
            ClashKind::LiveNz
        } else {
            ClashKind::LiveXy
        }
    }

    /// Whether a falling actor comes to rest after this clash.
    pub fn stops_fall(self) -> bool {
        matches!(self, ClashKind::Static | ClashKind::LiveNz)
    }
}

/// Axis the actor last slid along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlideAxis {
    /// No slide in progress.
    #[default]
    None,
    /// Sliding along x.
    X,
    /// Sliding along y.
    Y,
    /// Last step was fully blocked; there is nothing to continue.
    Blocked,
}

/// Corner hits of a horizontal probe.
///
/// Low nibble: body layer, high nibble: head layer. Bit N of each nibble is
/// footprint corner N, in the order (left, top), (right, top),
/// (right, bottom), (left, bottom).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClashMask(pub u8);

impl ClashMask {
    /// Body layer hits.
    pub fn low(self) -> u8 {
        self.0 & 0x0F
    }

    /// Head layer hits.
    pub fn high(self) -> u8 {
        (self.0 >> 4) & 0x0F
    }

    /// Whether nothing was hit.
    pub fn is_clear(self) -> bool {
        self.0 == 0
    }
}

/// What a horizontal step does for a given [`ClashMask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDecision {
    /// Nothing in the way.
    Free,
    /// A whole top or bottom side is blocked; keep the x movement.
    SlideX,
    /// A whole left or right side is blocked; keep the y movement.
    SlideY,
    /// A single corner is blocked; keep sliding the way the actor already was.
    Continue,
    /// Anything else; the actor does not move.
    Stop,
}

impl MoveDecision {
    /// The decision table for horizontal steps.
    ///
    /// | body | head must not contain | decision |
    /// |------|-----------------------|----------|
    /// | `0000` with clear head | | `Free` |
    /// | `0011` | `1100` | `SlideX` |
    /// | `1100` | `0011` | `SlideX` |
    /// | `0110` | `1001` | `SlideY` |
    /// | `1001` | `0110` | `SlideY` |
    /// | one bit | any other bit | `Continue` |
    /// | otherwise | | `Stop` |
    pub fn from_mask(mask: ClashMask) -> Self {
        if mask.is_clear() {
            return MoveDecision::Free;
        }
        let (low, high) = (mask.low(), mask.high());
        match low {
            0x03 if high & 0x0C == 0 => MoveDecision::SlideX,
            0x0C if high & 0x03 == 0 => MoveDecision::SlideX,
            0x06 if high & 0x09 == 0 => MoveDecision::SlideY,
            0x09 if high & 0x06 == 0 => MoveDecision::SlideY,
            _ if low & low.wrapping_sub(1) == 0 && low | high == low => MoveDecision::Continue,
            _ => MoveDecision::Stop,
        }
    }
}

/// Why a flying step was rejected before any live cube was considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlyBlock {
    /// Nothing static in the way.
    Clear,
    /// The feet would go below the ground plane over the playable grid.
    Ground,
    /// A static cube occupies one of the probed cells.
    Static,
}

/// Per-actor clash state.
#[derive(Debug, Clone, Default)]
pub struct ClashDetector {
    mask: ClashMask,
    slide: SlideAxis,
    clashed: Option<LiveCubeId>,
}

impl ClashDetector {
    /// Creates a detector with no remembered state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mask computed by the last horizontal step.
    pub fn last_mask(&self) -> ClashMask {
        self.mask
    }

    /// Axis remembered from the last horizontal step.
    pub fn slide_axis(&self) -> SlideAxis {
        self.slide
    }

    /// Live cube found by the most recent live probe.
    pub fn clashed_cube(&self) -> Option<LiveCubeId> {
        self.clashed
    }

    /// Static corner hits around `to` at the body and head layers.
    pub fn clash_mask(&self, world: &World, to: Point3<f32>) -> ClashMask {
        let grid = world.grid();
        let (body, head) = grid.move_bands(to.z);
        let mut mask = 0u8;
        for (corner, &(x, y)) in grid.footprint_columns(to).iter().enumerate() {
            if world.is_static_cell(Point3::new(x, y, body)) {
                mask |= 1 << corner;
            }
            if world.is_static_cell(Point3::new(x, y, head)) {
                mask |= 1 << (corner + 4);
            }
        }
        ClashMask(mask)
    }

    /// Resolves a walking step against static cubes, sliding where possible.
    ///
    /// Anything short of a free move keeps `from`'s height.
    pub fn resolve_horizontal(
        &mut self,
        world: &World,
        from: Point3<f32>,
        to: Point3<f32>,
    ) -> Point3<f32> {
        self.mask = self.clash_mask(world, to);
        let along_x = Point3::new(to.x, from.y, from.z);
        let along_y = Point3::new(from.x, to.y, from.z);

        match MoveDecision::from_mask(self.mask) {
            MoveDecision::Free => {
                self.slide = SlideAxis::None;
                to
            }
            MoveDecision::SlideX => {
                self.slide = SlideAxis::X;
                along_x
            }
            MoveDecision::SlideY => {
                self.slide = SlideAxis::Y;
                along_y
            }
            MoveDecision::Continue => match self.slide {
                SlideAxis::X => along_x,
                SlideAxis::Y => along_y,
                SlideAxis::None | SlideAxis::Blocked => from,
            },
            MoveDecision::Stop => {
                self.slide = SlideAxis::Blocked;
                from
            }
        }
    }

    /// Checks a flying step against the ground plane and static cubes.
    pub fn detect_fly_block(&self, world: &World, to: Point3<f32>, dir: FlyDirection) -> FlyBlock {
        let grid = world.grid();
        // Ground plane is z = 0.
        let foot = to.z - grid.body_height;
        if foot < 0.0 && grid.is_in_grid(to.x, to.y) {
            return FlyBlock::Ground;
        }
        if grid
            .probe_cells(to, Probe::Fly(dir))
            .into_iter()
            .any(|cell| world.is_static_cell(cell))
        {
            return FlyBlock::Static;
        }
        FlyBlock::Clear
    }

    /// Push-out from the first live cube found around `eye`.
    ///
    /// Only the first swept cell found is tested. Returns `None` when no cell
    /// is swept or the cube is elsewhere along its path at `time`.
    pub fn live_penetration(
        &mut self,
        world: &World,
        eye: Point3<f32>,
        time: f32,
    ) -> Option<Vector3<f32>> {
        let id = self.first_live_cube(world, eye, Probe::Fly(FlyDirection::Free))?;
        let position = world.live_position(id, time)?;
        actor_penetration(eye, position, world.grid())
    }

    /// Whether a walking actor at `eye` overlaps the first live cube found
    /// in its head and leg bands.
    pub fn hits_live_cube(&mut self, world: &World, eye: Point3<f32>, time: f32) -> bool {
        self.first_live_cube(world, eye, Probe::Move)
            .and_then(|id| world.live_position(id, time))
            .is_some_and(|position| actor_intersects(eye, position, world.grid()))
    }

    /// Whether the actor at `eye` still rests on live cube `id`.
    pub fn is_landed_on_live_cube(
        &self,
        world: &World,
        eye: Point3<f32>,
        id: LiveCubeId,
        time: f32,
    ) -> bool {
        world
            .live_position(id, time)
            .is_some_and(|position| actor_is_landing_on(eye, position, world.grid()))
    }

    /// Whether nothing supports the actor at `eye`.
    ///
    /// Feet at ground level over the playable grid are always supported.
    /// Otherwise a static cube must sit under one of the footprint corners.
    pub fn is_airborne(&self, world: &World, eye: Point3<f32>) -> bool {
        let grid = world.grid();
        let foot = eye.z - grid.body_height;
        if foot < grid.origin.z && grid.is_in_grid(eye.x, eye.y) {
            return false;
        }
        let z = support_layer(foot, grid.half_unit, grid.unit_size);
        !grid
            .footprint_columns(eye)
            .iter()
            .any(|&(x, y)| world.is_static_cell(Point3::new(x, y, z)))
    }

    /// Whether the actor at `eye` stands on the cube centered at `center`.
    pub fn is_standing_on(&self, world: &World, eye: Point3<f32>, center: Point3<f32>) -> bool {
        let grid = world.grid();
        let target = grid.cell_of_point(center);
        let z = support_layer(eye.z - grid.body_height, grid.half_unit, grid.unit_size);
        grid.footprint_columns(eye)
            .iter()
            .any(|&(x, y)| Point3::new(x, y, z) == target)
    }

    /// Moves `eye` vertically to a free spot resting on the nearest support.
    ///
    /// The eye first climbs until neither its own cell nor the one below is
    /// occupied, then drops while the cell two below is empty. Returns `None`
    /// when it ends up at ground level outside the playable grid.
    pub fn reset_eye_position(&self, world: &World, eye: Point3<f32>) -> Option<Point3<f32>> {
        let grid = world.grid();
        let cell = grid.cell_of_point(eye);
        let (x, y) = (cell.x, cell.y);
        let mut z = cell.z;
        let mut eye_z = eye.z;

        while world.is_static_cell(Point3::new(x, y, z))
            || world.is_static_cell(Point3::new(x, y, z - 1))
        {
            z += 1;
            eye_z += grid.unit_size;
        }
        while z > 1 && !world.is_static_cell(Point3::new(x, y, z - 2)) {
            z -= 1;
            eye_z -= grid.unit_size;
        }

        if z <= 1 && !grid.is_in_grid(eye.x, eye.y) {
            return None;
        }
        Some(Point3::new(eye.x, eye.y, eye_z))
    }

    fn first_live_cube(&mut self, world: &World, eye: Point3<f32>, probe: Probe) -> Option<LiveCubeId> {
        let found = world
            .grid()
            .probe_cells(eye, probe)
            .into_iter()
            .find_map(|cell| world.live_at(cell));
        if found.is_some() {
            self.clashed = found;
        }
        found
    }
}

/// Layer index of the cell directly under feet at height `foot`.
fn support_layer(foot: f32, half_unit: f32, unit_size: f32) -> i32 {
    ((foot - half_unit) / unit_size).trunc() as i32
}
