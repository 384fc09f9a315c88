use crate::TerrainGenerator;
use anyhow::{Context, Result};
use netherscout_benchmark::BenchmarkMetrics;
use netherscout_core::{BlockKind, ChunkPos, TerrainSample};
use pumpkin_data::Block;
use pumpkin_data::noise_router::NETHER_BASE_NOISE_ROUTER;
use pumpkin_world::biome::hash_seed;
use pumpkin_world::dimension::Dimension;
use pumpkin_world::generation::GlobalRandomConfig;
use pumpkin_world::generation::noise::router::proto_noise_router::ProtoNoiseRouters;
use pumpkin_world::generation::proto_chunk::ProtoChunk;
use pumpkin_world::generation::settings::{GENERATION_SETTINGS, GenerationSettings, GeneratorSetting};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

/// Raw block state ids of the three air blocks.
#[derive(Debug, Clone, Copy)]
struct AirStates {
    air: u16,
    cave_air: u16,
    void_air: u16,
}

impl AirStates {
    fn lookup() -> Result<Self> {
        let state = |key: &str| {
            Block::from_registry_key(key)
                .map(|block| block.default_state.id)
                .with_context(|| format!("Block {} missing from registry", key))
        };
        Ok(Self {
            air: state("air")?,
            cave_air: state("cave_air")?,
            void_air: state("void_air")?,
        })
    }

    fn classify(&self, state: u16) -> BlockKind {
        if state == self.air {
            BlockKind::Air
        } else if state == self.cave_air {
            BlockKind::CaveAir
        } else if state == self.void_air {
            BlockKind::VoidAir
        } else {
            BlockKind::Solid
        }
    }
}

fn nether_settings() -> Result<&'static GenerationSettings> {
    GENERATION_SETTINGS
        .get(&GeneratorSetting::Nether)
        .context("Nether generation settings not found")
}

/// Nether terrain from Pumpkin's noise generator.
pub struct NetherGenerator {
    air: AirStates,
    settings: &'static GenerationSettings,
    benchmark: Option<Arc<BenchmarkMetrics>>,
}

impl NetherGenerator {
    pub fn new(benchmark: Option<Arc<BenchmarkMetrics>>) -> Result<Self> {
        Ok(Self {
            air: AirStates::lookup()?,
            settings: nether_settings()?,
            benchmark,
        })
    }
}

impl TerrainGenerator for NetherGenerator {
    fn terrain(&self, seed: i64) -> Result<Box<dyn TerrainSample + '_>> {
        Ok(Box::new(NetherTerrain::new(
            seed as u64,
            self.settings,
            self.air,
            self.benchmark.as_deref(),
        )))
    }
}

/// Block view of one seed's nether.
///
/// Chunks are generated through the biome and noise stages the first time a
/// block inside them is asked for. Surface rules and features are skipped;
/// they do not turn solid blocks into air in the nether.
pub struct NetherTerrain<'a> {
    random_config: GlobalRandomConfig,
    noise_router: ProtoNoiseRouters,
    settings: &'static GenerationSettings,
    air: AirStates,
    benchmark: Option<&'a BenchmarkMetrics>,
    // Block state ids per chunk, indexed by (y * 16 + z) * 16 + x
    chunks: RefCell<HashMap<ChunkPos, Box<[u16]>>>,
}

impl<'a> NetherTerrain<'a> {
    fn new(
        seed: u64,
        settings: &'static GenerationSettings,
        air: AirStates,
        benchmark: Option<&'a BenchmarkMetrics>,
    ) -> Self {
        // Initialize noise configuration (reused for every chunk of this seed)
        let random_config = GlobalRandomConfig::new(seed, false);
        let noise_router = ProtoNoiseRouters::generate(&NETHER_BASE_NOISE_ROUTER, &random_config);

        Self {
            random_config,
            noise_router,
            settings,
            air,
            benchmark,
            chunks: RefCell::new(HashMap::new()),
        }
    }

    fn height(&self) -> usize {
        self.settings.shape.height as usize
    }

    fn min_y(&self) -> i32 {
        self.settings.shape.min_y as i32
    }

    fn generate_chunk(&self, pos: ChunkPos) -> Box<[u16]> {
        let start = std::time::Instant::now();
        let settings = self.settings;
        let default_block = settings.default_block.get_state();
        let biome_mixer_seed = hash_seed(self.random_config.seed);

        let mut proto_chunk = ProtoChunk::new(pos.x, pos.z, settings, default_block, biome_mixer_seed);
        proto_chunk.step_to_biomes(Dimension::Nether, &self.noise_router);
        proto_chunk.step_to_noise(settings, &self.random_config, &self.noise_router);

        let height = self.height();
        let mut states = Vec::with_capacity(height * 16 * 16);
        for y in 0..height {
            for z in 0..16 {
                for x in 0..16 {
                    states.push(proto_chunk.get_block_state_raw(x, y as i32, z));
                }
            }
        }

        if let Some(bench) = self.benchmark {
            bench.record_chunk_generation(start.elapsed());
        }
        log::trace!("Generated nether chunk ({}, {})", pos.x, pos.z);
        states.into_boxed_slice()
    }
}

impl TerrainSample for NetherTerrain<'_> {
    fn block_at(&self, x: i32, y: i32, z: i32) -> Option<BlockKind> {
        let rel_y = y - self.min_y();
        if rel_y < 0 || rel_y as usize >= self.height() {
            return None;
        }

        let pos = ChunkPos::containing(x, z);
        let mut chunks = self.chunks.borrow_mut();
        let states = chunks.entry(pos).or_insert_with(|| self.generate_chunk(pos));
        let index = (rel_y as usize * 16 + (z & 15) as usize) * 16 + (x & 15) as usize;
        states.get(index).map(|&state| self.air.classify(state))
    }
}
