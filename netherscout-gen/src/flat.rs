use crate::TerrainGenerator;
use netherscout_core::{BlockKind, TerrainSample};

/// Lowest and highest y a nether column resolves.
pub const WORLD_BOTTOM: i32 = 0;
pub const WORLD_TOP: i32 = 127;

/// Seed-independent terrain: air strictly between `floor` and `ceiling`,
/// netherrack everywhere else.
#[derive(Debug, Clone, Copy)]
pub struct FlatTerrain {
    pub floor: i32,
    pub ceiling: i32,
}

impl TerrainSample for FlatTerrain {
    fn block_at(&self, _x: i32, y: i32, _z: i32) -> Option<BlockKind> {
        if !(WORLD_BOTTOM..=WORLD_TOP).contains(&y) {
            return None;
        }
        if y > self.floor && y < self.ceiling {
            Some(BlockKind::Air)
        } else {
            Some(BlockKind::Solid)
        }
    }
}

pub struct FlatGenerator {
    terrain: FlatTerrain,
}

impl FlatGenerator {
    pub fn new(floor: i32, ceiling: i32) -> Self {
        Self { terrain: FlatTerrain { floor, ceiling } }
    }
}

impl TerrainGenerator for FlatGenerator {
    fn terrain(&self, _seed: i64) -> anyhow::Result<Box<dyn TerrainSample + '_>> {
        Ok(Box::new(self.terrain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_band_is_exclusive() {
        let terrain = FlatTerrain { floor: 31, ceiling: 101 };
        assert!(!terrain.is_open(0, 31, 0));
        assert!(terrain.is_open(0, 32, 0));
        assert!(terrain.is_open(0, 100, 0));
        assert!(!terrain.is_open(0, 101, 0));
    }

    #[test]
    fn test_outside_world_is_unresolved() {
        let terrain = FlatTerrain { floor: -10, ceiling: 200 };
        assert_eq!(terrain.block_at(0, -1, 0), None);
        assert_eq!(terrain.block_at(0, 128, 0), None);
        assert!(!terrain.is_open(0, 128, 0));
    }

    #[test]
    fn test_generator_ignores_seed() {
        let generator = FlatGenerator::new(31, 101);
        for seed in [0, -1, i64::MAX] {
            let terrain = generator.terrain(seed).unwrap();
            assert!(terrain.is_open(1000, 60, -1000));
            assert!(terrain.is_open(-5, 95, 5));
        }
    }
}
