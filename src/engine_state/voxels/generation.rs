//! # Chunk Generation
//!
//! Procedural generators that fill a chunk from its position alone, so they
//! can run on worker threads without touching the world.

use cgmath::Point3;
use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use crate::config::{TerrainConfig, WorldConfig};

use super::block::block_type::BlockType;
use super::chunk::{chunk_creation::ChunkCreationIterator, Chunk, CHUNK_DIMENSION};

/// Threshold above which Perlin noise is considered solid for terrain generation.
pub const PERLIN_POSITIVE_THRESHOLD: f64 = 0.2;
/// Threshold below which Perlin noise is considered empty for terrain generation.
pub const PERLIN_NEGATIVE_THRESHOLD: f64 = -0.2;
/// Scaling factor applied to world coordinates when sampling Perlin noise.
pub const PERLIN_SCALE_FACTOR: f64 = 0.02;
/// Fraction of air blocks in `Random` chunks.
pub const RANDOM_SPARSENESS: f64 = 0.9;
/// Depth of the dirt layer above the stone.
const DIRT_DEPTH: i64 = 3;

/// The method used to generate new chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkGenerationMethod {
    /// 2D heightmap with layered soil, beaches and water.
    Terrain,
    /// 3D noise with caves and overhangs.
    Perlin,
    /// Alternating dirt and air.
    Checkerboard,
    /// All dirt.
    Solid,
    /// All air.
    Empty,
    /// Scattered random opaque blocks of mixed types. Not deterministic.
    Random,
}

/// World coordinates of the lowest corner block of the chunk at `position`.
///
/// Widened to `i64`, so chunks at any `i32` position have an origin.
fn block_origin(position: Point3<i32>) -> Point3<i64> {
    let dimension = i64::from(CHUNK_DIMENSION);
    Point3::new(
        i64::from(position.x) * dimension,
        i64::from(position.y) * dimension,
        i64::from(position.z) * dimension,
    )
}

/// Generates chunk contents for a given seed and method.
#[derive(Debug, Clone)]
pub struct TerrainGenerator {
    seed: u32,
    method: ChunkGenerationMethod,
    terrain: TerrainConfig,
    perlin: Perlin,
}

impl TerrainGenerator {
    pub fn new(seed: u32, method: ChunkGenerationMethod, terrain: TerrainConfig) -> Self {
        TerrainGenerator {
            seed,
            method,
            terrain,
            perlin: Perlin::new(seed),
        }
    }

    pub fn from_config(config: &WorldConfig) -> Self {
        Self::new(config.seed, config.generation_method, config.terrain.clone())
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn method(&self) -> ChunkGenerationMethod {
        self.method
    }

    /// Builds the chunk at `position` (chunk coordinates).
    pub fn generate(&self, position: Point3<i32>) -> Chunk {
        match self.method {
            ChunkGenerationMethod::Terrain => self.terrain(position),
            ChunkGenerationMethod::Perlin => self.perlin(position),
            ChunkGenerationMethod::Checkerboard => Chunk::checkerboard(&position),
            ChunkGenerationMethod::Solid => Chunk::solid(&position, BlockType::DIRT),
            ChunkGenerationMethod::Empty => Chunk::empty(&position),
            ChunkGenerationMethod::Random => Self::random(position),
        }
    }

    /// Surface height of the column at world `(x, z)`.
    pub fn surface_height(&self, x: i64, z: i64) -> i64 {
        let sample = self.perlin.get([
            x as f64 * self.terrain.scale,
            z as f64 * self.terrain.scale,
        ]);
        i64::from(self.terrain.base_height)
            .saturating_add((sample * self.terrain.amplitude).round() as i64)
    }

    fn terrain_block(&self, y: i64, height: i64) -> BlockType {
        let sea_level = i64::from(self.terrain.sea_level);
        if y > height {
            if y <= sea_level {
                BlockType::WATER
            } else {
                BlockType::AIR
            }
        } else if y < height.saturating_sub(DIRT_DEPTH) {
            BlockType::STONE
        } else if height <= sea_level + 1 {
            BlockType::SAND
        } else if y < height {
            BlockType::DIRT
        } else {
            BlockType::GRASS
        }
    }

    fn terrain(&self, position: Point3<i32>) -> Chunk {
        let dimension = CHUNK_DIMENSION as usize;
        let origin = block_origin(position);

        let mut heights = vec![0; dimension * dimension];
        for k in 0..CHUNK_DIMENSION as i64 {
            for i in 0..CHUNK_DIMENSION as i64 {
                heights[i as usize + dimension * k as usize] =
                    self.surface_height(origin.x + i, origin.z + k);
            }
        }

        let mut cci = ChunkCreationIterator::new(position);
        for k in 0..dimension {
            for j in 0..CHUNK_DIMENSION as i64 {
                for i in 0..dimension {
                    let height = heights[i + dimension * k];
                    cci.push_block_type(self.terrain_block(origin.y + j, height));
                }
            }
        }
        cci.return_chunk()
    }

    /// Generates a chunk using 3D Perlin noise for cave-like terrain.
    ///
    /// Blocks whose noise sample lies outside the
    /// `[PERLIN_NEGATIVE_THRESHOLD, PERLIN_POSITIVE_THRESHOLD]` band are solid.
    fn perlin(&self, position: Point3<i32>) -> Chunk {
        let mut cci = ChunkCreationIterator::new(position);
        let origin = block_origin(position);

        for k in 0..CHUNK_DIMENSION as i64 {
            for j in 0..CHUNK_DIMENSION as i64 {
                for i in 0..CHUNK_DIMENSION as i64 {
                    let bposition = Point3::new(origin.x + i, origin.y + j, origin.z + k);
                    let perlin_sample = self
                        .perlin
                        .get(Self::to_perlin_pos(bposition, PERLIN_SCALE_FACTOR));
                    if !(PERLIN_NEGATIVE_THRESHOLD..=PERLIN_POSITIVE_THRESHOLD)
                        .contains(&perlin_sample)
                    {
                        cci.push_block_type(Self::perlin_block_type(bposition));
                    } else {
                        cci.push_block_type(BlockType::AIR);
                    }
                }
            }
        }

        cci.return_chunk()
    }

    /// Deterministic material choice for noise terrain, banded by depth.
    fn perlin_block_type(position: Point3<i64>) -> BlockType {
        match position.y {
            y if y < -16 => BlockType::STONE,
            y if y < 0 => BlockType::DIRT,
            _ => BlockType::GRASS,
        }
    }

    /// Converts world block coordinates to Perlin sampling coordinates.
    fn to_perlin_pos(pos: Point3<i64>, scale_factor: f64) -> [f64; 3] {
        [
            (pos.x as f64 * scale_factor),
            (pos.y as f64 * scale_factor),
            (pos.z as f64 * scale_factor),
        ]
    }

    /// Scattered random opaque blocks, used for stress testing the meshers.
    fn random(position: Point3<i32>) -> Chunk {
        let mut cci = ChunkCreationIterator::new(position);

        for _ in 0..super::chunk::CHUNK_SIZE {
            if fastrand::f64() < RANDOM_SPARSENESS {
                cci.push_block_type(BlockType::AIR);
            } else {
                cci.push_block_type(BlockType::random_solid());
            }
        }

        cci.return_chunk()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(method: ChunkGenerationMethod) -> TerrainGenerator {
        TerrainGenerator::new(42, method, TerrainConfig::default())
    }

    fn same_blocks(a: &Chunk, b: &Chunk) -> bool {
        a.blocks().eq(b.blocks())
    }

    #[test]
    fn terrain_is_deterministic_per_seed() {
        let position = Point3::new(3, 0, -2);
        let a = generator(ChunkGenerationMethod::Terrain).generate(position);
        let b = generator(ChunkGenerationMethod::Terrain).generate(position);
        assert!(same_blocks(&a, &b));
    }

    #[test]
    fn perlin_is_deterministic_per_seed() {
        let position = Point3::new(-1, 1, 4);
        let a = generator(ChunkGenerationMethod::Perlin).generate(position);
        let b = generator(ChunkGenerationMethod::Perlin).generate(position);
        assert!(same_blocks(&a, &b));
    }

    #[test]
    fn terrain_is_solid_deep_down_and_empty_high_up() {
        let generator = generator(ChunkGenerationMethod::Terrain);
        // base 8, amplitude 12: the surface stays within -4..=20
        let deep = generator.generate(Point3::new(0, -2, 0));
        assert_eq!(deep.solid_block_count(), 4096);
        assert!(deep
            .blocks()
            .all(|(_, block)| block.get_type() == BlockType::STONE));

        let sky = generator.generate(Point3::new(0, 3, 0));
        assert!(sky.is_empty());
    }

    #[test]
    fn terrain_columns_are_layered() {
        let generator = generator(ChunkGenerationMethod::Terrain);
        let height = generator.surface_height(0, 0);
        let sea_level = i64::from(TerrainConfig::default().sea_level);

        assert_eq!(generator.terrain_block(height + 1, height).is_air(), height + 1 > sea_level);
        assert_eq!(generator.terrain_block(height - 10, height), BlockType::STONE);
        if height > sea_level + 1 {
            assert_eq!(generator.terrain_block(height, height), BlockType::GRASS);
            assert_eq!(generator.terrain_block(height - 1, height), BlockType::DIRT);
        } else {
            assert_eq!(generator.terrain_block(height, height), BlockType::SAND);
        }
    }

    #[test]
    fn water_fills_air_below_sea_level() {
        let generator = generator(ChunkGenerationMethod::Terrain);
        let sea_level = i64::from(TerrainConfig::default().sea_level);
        assert_eq!(generator.terrain_block(sea_level, sea_level - 5), BlockType::WATER);
        assert_eq!(generator.terrain_block(sea_level + 1, sea_level - 5), BlockType::AIR);
    }

    #[test]
    fn chunks_at_extreme_coordinates_generate() {
        let edge = Point3::new(i32::MAX, i32::MIN, i32::MAX);
        for method in [ChunkGenerationMethod::Terrain, ChunkGenerationMethod::Perlin] {
            let chunk = generator(method).generate(edge);
            assert_eq!(chunk.position, edge);
        }

        // Far below the surface everything is stone.
        let deep = generator(ChunkGenerationMethod::Terrain).generate(edge);
        assert_eq!(deep.solid_block_count(), 4096);
        assert_eq!(block_origin(edge).x, i64::from(i32::MAX) * 16);
    }

    #[test]
    fn random_chunks_hold_air_and_opaque_blocks() {
        let chunk = generator(ChunkGenerationMethod::Random).generate(Point3::new(0, 0, 0));
        assert!(chunk.solid_block_count() < 4096);
        assert!(chunk.blocks().all(|(_, block)| block.get_type().is_opaque()));
    }

    #[test]
    fn fixed_methods_match_chunk_constructors() {
        let position = Point3::new(0, 0, 0);
        assert!(generator(ChunkGenerationMethod::Empty).generate(position).is_empty());
        assert_eq!(
            generator(ChunkGenerationMethod::Solid)
                .generate(position)
                .solid_block_count(),
            4096
        );
        assert_eq!(
            generator(ChunkGenerationMethod::Checkerboard)
                .generate(position)
                .solid_block_count(),
            2048
        );
    }

    #[test]
    fn method_names_are_snake_case() {
        let method: ChunkGenerationMethod = serde_json::from_str("\"checkerboard\"").unwrap();
        assert_eq!(method, ChunkGenerationMethod::Checkerboard);
        assert_eq!(
            serde_json::to_string(&ChunkGenerationMethod::Terrain).unwrap(),
            "\"terrain\""
        );
    }
}
