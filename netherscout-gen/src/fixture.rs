//! Bastion layouts replayed from a JSON file.
//!
//! ```json
//! { "bastions": [
//!     { "seed": 42, "chunk_x": 3, "chunk_z": -5,
//!       "variant": "housing", "rotation": "clockwise_90",
//!       "chests": [ { "pos": [42, 36, -100],
//!                     "items": [ { "item": "minecraft:obsidian", "count": 5 } ] } ] }
//! ] }
//! ```
//!
//! `origin` defaults to the chunk's -x/-z corner and `rotation` to `none`.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use netherscout_core::{Bastion, BastionType, BlockPos, ChunkPos, LootChest, Rotation};
use serde::Deserialize;

use crate::StructureGenerator;

#[derive(Debug, Deserialize)]
struct FixtureFile {
    #[serde(default)]
    bastions: Vec<BastionEntry>,
}

#[derive(Debug, Deserialize)]
struct BastionEntry {
    seed: i64,
    chunk_x: i32,
    chunk_z: i32,
    variant: BastionType,
    #[serde(default)]
    rotation: Rotation,
    #[serde(default)]
    origin: Option<BlockPos>,
    #[serde(default)]
    chests: Vec<LootChest>,
}

#[derive(Debug, Default)]
pub struct FixtureStructures {
    bastions: HashMap<(i64, ChunkPos), Bastion>,
}

impl FixtureStructures {
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read structure fixture {:?}", path))?;
        Self::from_json(&json).with_context(|| format!("Invalid structure fixture {:?}", path))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: FixtureFile = serde_json::from_str(json)?;
        let mut bastions = HashMap::with_capacity(file.bastions.len());

        for entry in file.bastions {
            let chunk = ChunkPos::new(entry.chunk_x, entry.chunk_z);
            let bastion = Bastion {
                variant: entry.variant,
                origin: entry.origin.unwrap_or_else(|| chunk.to_block_pos()),
                rotation: entry.rotation,
                chests: entry.chests,
            };
            if bastions.insert((entry.seed, chunk), bastion).is_some() {
                log::warn!(
                    "Duplicate fixture bastion for seed {} at chunk ({}, {}), keeping the last one",
                    entry.seed,
                    chunk.x,
                    chunk.z
                );
            }
        }

        Ok(Self { bastions })
    }

    pub fn len(&self) -> usize {
        self.bastions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bastions.is_empty()
    }
}

impl StructureGenerator for FixtureStructures {
    fn generate_bastion(&self, seed: i64, chunk: ChunkPos) -> Result<Option<Bastion>> {
        Ok(self.bastions.get(&(seed, chunk)).cloned())
    }
}
