//! Decision logic for bastion obsidian scoring and nether route viability.
//!
//! Nothing in here generates a world: structures and blocks come from a
//! generator behind the `netherscout-gen` traits.

pub mod chest;
pub mod loot;
pub mod pos;
pub mod survey;
pub mod terrain;

pub use chest::{Bastion, BastionType, ChestClassifier, ChestRecord, LootChest, StablesRule};
pub use loot::ItemStack;
pub use pos::{BlockPos, ChunkPos, Direction, Rotation};
pub use terrain::{BlockKind, Column, PathVerdict, TerrainSample};
