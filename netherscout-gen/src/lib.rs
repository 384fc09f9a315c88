use anyhow::Result;
use netherscout_core::{Bastion, ChunkPos, TerrainSample};

/// Produces the bastion, if any, whose start piece lies in a chunk.
pub trait StructureGenerator: Send + Sync {
    fn generate_bastion(&self, seed: i64, chunk: ChunkPos) -> Result<Option<Bastion>>;
}

/// Produces a block view of the nether for a seed.
///
/// The returned view lives for one request; any chunk caching it does is
/// dropped with it.
pub trait TerrainGenerator: Send + Sync {
    fn terrain(&self, seed: i64) -> Result<Box<dyn TerrainSample + '_>>;
}

/// Used when no structure source is configured: every chunk is empty.
pub struct NoStructures;

impl StructureGenerator for NoStructures {
    fn generate_bastion(&self, _seed: i64, _chunk: ChunkPos) -> Result<Option<Bastion>> {
        Ok(None)
    }
}

pub mod fixture;
pub mod flat;
pub mod nether;
