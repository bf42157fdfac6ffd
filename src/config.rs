//! # Engine Configuration
//!
//! All tunables of the engine live in [`EngineConfig`], which is read from a
//! JSON document. Every section and field has a default, so a partial file
//! (or `{}`) is a valid configuration.
//!
//! ```json
//! {
//!     "world": { "seed": 7, "generation_method": "terrain" },
//!     "streaming": { "render_distance": 6, "max_generation_requests_per_frame": 4 },
//!     "meshing": { "strategy": "greedy" }
//! }
//! ```

use std::{fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    engine_state::{meshing::MeshingStrategy, voxels::generation::ChunkGenerationMethod},
    error::ConfigError,
};

/// Root configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub world: WorldConfig,
    pub streaming: StreamingConfig,
    pub meshing: MeshingConfig,
    pub tasks: TaskConfig,
    pub camera: CameraConfig,
    pub visibility: VisibilityConfig,
}

/// World generation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    pub seed: u32,
    pub generation_method: ChunkGenerationMethod,
    pub terrain: TerrainConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            generation_method: ChunkGenerationMethod::Terrain,
            terrain: TerrainConfig::default(),
        }
    }
}

/// Heightmap terrain parameters, in blocks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// Mean surface height.
    pub base_height: i32,
    /// Maximum deviation of the surface from `base_height`.
    pub amplitude: f64,
    /// Noise sampling scale applied to world x/z.
    pub scale: f64,
    /// Air at or below this height becomes water.
    pub sea_level: i32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            base_height: 8,
            amplitude: 12.0,
            scale: 0.01,
            sea_level: 4,
        }
    }
}

/// Chunk streaming radii and per-frame budgets. Distances are in chunks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamingConfig {
    pub render_distance: i32,
    pub vertical_render_distance: i32,
    /// Extra distance a loaded chunk may drift out before it is unloaded.
    pub unload_margin: i32,
    pub max_generation_requests_per_frame: usize,
    pub max_mesh_requests_per_frame: usize,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            render_distance: 4,
            vertical_render_distance: 2,
            unload_margin: 1,
            max_generation_requests_per_frame: 8,
            max_mesh_requests_per_frame: 8,
        }
    }
}

impl StreamingConfig {
    /// Number of chunk positions inside the keep range (render distance plus
    /// the unload margin). This is the most chunks the streamer keeps loaded.
    pub fn keep_volume(&self) -> usize {
        let radius = self.render_distance + self.unload_margin;
        let vertical = self.vertical_render_distance + self.unload_margin;
        let mut count = 0;
        for x in -radius..=radius {
            for z in -radius..=radius {
                if x * x + z * z <= radius * radius {
                    count += (2 * vertical + 1) as usize;
                }
            }
        }
        count
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MeshingConfig {
    pub strategy: MeshingStrategy,
    /// Capacity of the mesh cache and of the chunk index pool.
    pub max_meshed_chunks: usize,
}

impl Default for MeshingConfig {
    fn default() -> Self {
        Self {
            strategy: MeshingStrategy::Greedy,
            max_meshed_chunks: 4096,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TaskConfig {
    /// Worker thread count; 0 means one per available core.
    pub num_workers: usize,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self { num_workers: 4 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub fovy_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
    pub aspect_ratio: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fovy_degrees: 45.0,
            znear: 0.1,
            zfar: 1000.0,
            aspect_ratio: 16.0 / 9.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VisibilityConfig {
    pub frustum_culling: bool,
    /// Also drop sides the view direction points away from (45 degree cutoff).
    pub view_direction_side_culling: bool,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            frustum_culling: true,
            view_direction_side_culling: false,
        }
    }
}

impl EngineConfig {
    /// Reads and validates a JSON configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let config: EngineConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a JSON configuration string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let streaming = &self.streaming;
        if streaming.render_distance < 1 {
            return Err(ConfigError::Invalid(
                "streaming.render_distance must be at least 1".into(),
            ));
        }
        if streaming.vertical_render_distance < 0 || streaming.unload_margin < 0 {
            return Err(ConfigError::Invalid(
                "streaming distances must not be negative".into(),
            ));
        }
        if streaming.max_generation_requests_per_frame == 0
            || streaming.max_mesh_requests_per_frame == 0
        {
            return Err(ConfigError::Invalid(
                "per-frame request budgets must be non-zero".into(),
            ));
        }

        let keep_volume = streaming.keep_volume();
        if self.meshing.max_meshed_chunks < keep_volume {
            return Err(ConfigError::Invalid(format!(
                "meshing.max_meshed_chunks ({}) is smaller than the streamed volume ({} chunks)",
                self.meshing.max_meshed_chunks, keep_volume
            )));
        }

        let camera = &self.camera;
        if !(camera.znear > 0.0 && camera.zfar > camera.znear) {
            return Err(ConfigError::Invalid(
                "camera clip range must satisfy 0 < znear < zfar".into(),
            ));
        }
        if !(camera.fovy_degrees > 0.0 && camera.fovy_degrees < 180.0) || camera.aspect_ratio <= 0.0
        {
            return Err(ConfigError::Invalid(
                "camera fovy must be in (0, 180) and aspect ratio positive".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = EngineConfig::from_json_str(
            r#"{ "world": { "seed": 11, "generation_method": "perlin" },
                 "streaming": { "render_distance": 2 },
                 "meshing": { "strategy": "culled" } }"#,
        )
        .unwrap();

        assert_eq!(config.world.seed, 11);
        assert_eq!(config.world.generation_method, ChunkGenerationMethod::Perlin);
        assert_eq!(config.streaming.render_distance, 2);
        assert_eq!(config.streaming.vertical_render_distance, 2);
        assert_eq!(config.meshing.strategy, MeshingStrategy::Culled);
    }

    #[test]
    fn rejects_zero_render_distance() {
        let err = EngineConfig::from_json_str(r#"{ "streaming": { "render_distance": 0 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_mesh_cache_smaller_than_keep_volume() {
        let err = EngineConfig::from_json_str(r#"{ "meshing": { "max_meshed_chunks": 10 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = EngineConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn keep_volume_counts_cylinder() {
        let config = StreamingConfig {
            render_distance: 1,
            vertical_render_distance: 0,
            unload_margin: 0,
            ..StreamingConfig::default()
        };
        // centre plus four axis neighbours in one layer
        assert_eq!(config.keep_volume(), 5);
    }
}
