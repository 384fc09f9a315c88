//! Terrain viability: can a runner travel spawn -> bastion -> fortress
//! through open nether air?
//!
//! A segment is sampled every 10 blocks at a fixed altitude. It is open when
//! at least 80% of the samples are air-like. The low pass runs at y=60; if it
//! fails the segment is retried at y=95. A fortress segment that only clears
//! at y=95 also needs a mostly open vertical shaft above the fortress.

use crate::pos::CHUNK_WIDTH;

pub const SAMPLE_SPACING: f64 = 10.0;
pub const MIN_OPEN_FRACTION: f64 = 0.8;

pub const LOW_ALTITUDE: i32 = 60;
pub const HIGH_ALTITUDE: i32 = 95;

/// Offset of the fortress crossroads centre from its chunk's -x/-z corner.
pub const FORTRESS_CENTER_OFFSET: i32 = 11;

pub const SHAFT_TOP: i32 = 95;
pub const SHAFT_BOTTOM: i32 = 50;
pub const SHAFT_STEP: usize = 5;
pub const SHAFT_MIN_OPEN: usize = 6;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum BlockKind {
    Air,
    CaveAir,
    VoidAir,
    /// Anything that is not some kind of air, fluids included.
    Solid,
}

impl BlockKind {
    pub fn is_air_like(self) -> bool {
        matches!(self, BlockKind::Air | BlockKind::CaveAir | BlockKind::VoidAir)
    }
}

/// Read-only view of the blocks of one world.
pub trait TerrainSample {
    /// `None` when the block cannot be resolved (outside the generated height).
    fn block_at(&self, x: i32, y: i32, z: i32) -> Option<BlockKind>;

    /// Unresolved blocks count as solid.
    fn is_open(&self, x: i32, y: i32, z: i32) -> bool {
        self.block_at(x, y, z).unwrap_or(BlockKind::Solid).is_air_like()
    }
}

impl<F> TerrainSample for F
where
    F: Fn(i32, i32, i32) -> Option<BlockKind>,
{
    fn block_at(&self, x: i32, y: i32, z: i32) -> Option<BlockKind> {
        self(x, y, z)
    }
}

/// Horizontal block column.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub struct Column {
    pub x: i32,
    pub z: i32,
}

impl Column {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    pub fn bastion_anchor(chunk_x: i8, chunk_z: i8) -> Self {
        Self::new(i32::from(chunk_x) * CHUNK_WIDTH, i32::from(chunk_z) * CHUNK_WIDTH)
    }

    pub fn fortress_anchor(chunk_x: i8, chunk_z: i8) -> Self {
        Self::new(
            i32::from(chunk_x) * CHUNK_WIDTH + FORTRESS_CENTER_OFFSET,
            i32::from(chunk_z) * CHUNK_WIDTH + FORTRESS_CENTER_OFFSET,
        )
    }
}

/// Sample points of the segment, endpoints included.
pub fn segment_samples(p1: Column, p2: Column) -> Vec<Column> {
    let dx = i64::from(p2.x) - i64::from(p1.x);
    let dz = i64::from(p2.z) - i64::from(p1.z);
    let distance = ((dx * dx + dz * dz) as f64).sqrt();
    let count = (distance / SAMPLE_SPACING) as usize + 1;

    (0..count)
        .map(|i| {
            let t = if count > 1 { i as f64 / (count - 1) as f64 } else { 0.0 };
            Column::new(
                (f64::from(p1.x) + dx as f64 * t) as i32,
                (f64::from(p1.z) + dz as f64 * t) as i32,
            )
        })
        .collect()
}

pub fn is_segment_open<T: TerrainSample + ?Sized>(p1: Column, p2: Column, altitude: i32, terrain: &T) -> bool {
    let samples = segment_samples(p1, p2);
    let open = samples
        .iter()
        .filter(|c| terrain.is_open(c.x, altitude, c.z))
        .count();
    let fraction = open as f64 / samples.len() as f64;
    log::trace!(
        "segment {:?} -> {:?} at y={}: {}/{} open",
        p1,
        p2,
        altitude,
        open,
        samples.len()
    );
    fraction >= MIN_OPEN_FRACTION
}

/// Air-like blocks among y = 95, 90, ..., 50 above the column.
pub fn shaft_open_count<T: TerrainSample + ?Sized>(column: Column, terrain: &T) -> usize {
    (SHAFT_BOTTOM..=SHAFT_TOP)
        .rev()
        .step_by(SHAFT_STEP)
        .filter(|&y| terrain.is_open(column.x, y, column.z))
        .count()
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct PathVerdict {
    pub viable: bool,
    /// The fortress segment was only open at the high altitude.
    pub used_high_altitude: bool,
}

/// Checks spawn -> bastion and bastion -> fortress.
pub fn is_terrain_path_viable<T: TerrainSample + ?Sized>(
    bastion: Column,
    fortress: Column,
    terrain: &T,
) -> PathVerdict {
    let origin = Column::new(0, 0);

    let spawn_leg = is_segment_open(origin, bastion, LOW_ALTITUDE, terrain)
        || is_segment_open(origin, bastion, HIGH_ALTITUDE, terrain);
    if !spawn_leg {
        return PathVerdict { viable: false, used_high_altitude: false };
    }

    if is_segment_open(bastion, fortress, LOW_ALTITUDE, terrain) {
        return PathVerdict { viable: true, used_high_altitude: false };
    }
    if !is_segment_open(bastion, fortress, HIGH_ALTITUDE, terrain) {
        return PathVerdict { viable: false, used_high_altitude: false };
    }

    let shaft = shaft_open_count(fortress, terrain);
    log::trace!("high fortress route, shaft at {:?} has {} open samples", fortress, shaft);
    PathVerdict {
        viable: shaft >= SHAFT_MIN_OPEN,
        used_high_altitude: true,
    }
}
