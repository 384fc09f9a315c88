//! Block and chunk coordinates plus the horizontal direction/rotation algebra
//! used to locate chests inside a rotated structure template.

use serde::{Deserialize, Serialize};

/// Width of a chunk in blocks.
pub const CHUNK_WIDTH: i32 = 16;

/// Integer world coordinate of a single block.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[i32; 3]", into = "[i32; 3]")]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Moves `distance` blocks along a horizontal direction.
    pub fn relative(self, direction: Direction, distance: i32) -> Self {
        let (dx, dz) = direction.offset();
        Self {
            x: self.x + dx * distance,
            y: self.y,
            z: self.z + dz * distance,
        }
    }

    /// True when both positions share the same column, whatever their altitude.
    pub fn same_column(&self, other: &BlockPos) -> bool {
        self.x == other.x && self.z == other.z
    }
}

impl From<[i32; 3]> for BlockPos {
    fn from([x, y, z]: [i32; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<BlockPos> for [i32; 3] {
    fn from(pos: BlockPos) -> Self {
        [pos.x, pos.y, pos.z]
    }
}

/// Coordinates for a chunk in the world.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Default)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk containing the given block column.
    pub fn containing(x: i32, z: i32) -> Self {
        Self { x: x >> 4, z: z >> 4 }
    }

    /// The -x/-z corner of the chunk at y = 0.
    pub fn to_block_pos(self) -> BlockPos {
        BlockPos::new(self.x * CHUNK_WIDTH, 0, self.z * CHUNK_WIDTH)
    }
}

/// Horizontal cardinal direction.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// Unit (dx, dz) step. North is -z.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    pub fn clockwise(self) -> Self {
        match self {
            Direction::North => Direction::East,
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
        }
    }

    pub fn counter_clockwise(self) -> Self {
        match self {
            Direction::North => Direction::West,
            Direction::West => Direction::South,
            Direction::South => Direction::East,
            Direction::East => Direction::North,
        }
    }

    pub fn opposite(self) -> Self {
        self.clockwise().clockwise()
    }
}

/// Rotation applied to a structure template when it is placed.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    #[serde(rename = "none", alias = "NONE")]
    None,
    #[serde(rename = "clockwise_90", alias = "CLOCKWISE_90")]
    Clockwise90,
    #[serde(rename = "clockwise_180", alias = "CLOCKWISE_180")]
    Clockwise180,
    #[serde(rename = "counterclockwise_90", alias = "COUNTERCLOCKWISE_90")]
    CounterClockwise90,
}

impl Rotation {
    pub fn rotate(self, direction: Direction) -> Direction {
        match self {
            Rotation::None => direction,
            Rotation::Clockwise90 => direction.clockwise(),
            Rotation::Clockwise180 => direction.opposite(),
            Rotation::CounterClockwise90 => direction.counter_clockwise(),
        }
    }
}
