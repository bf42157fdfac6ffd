#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Globe
//!
//! The engine core of a voxel world: chunk storage, meshing and chunk streaming.
//!
//! The crate turns 16³ chunks of block types into per-side triangle meshes
//! (with face culling or greedy merging) and decides which chunks around a
//! moving player are loaded, meshed and visible. Its output is CPU-side mesh
//! data and a front-to-back list of visible chunks for a renderer to draw.
//!
//! ## Key Modules
//!
//! * `config` - JSON configuration of every engine tunable
//! * `core` - Shared-ownership containers and the service registry used by tasks
//! * `engine_state` - The engine: voxels, meshing, streaming, camera and task management
//! * `error` - Error types
//!
//! ## Usage
//!
//! ```no_run
//! fn main() {
//!     voxel_globe::run();
//! }
//! ```

use std::{env, time::Duration};

use cgmath::{Deg, Point3};
use log::{error, info};

pub mod config;
pub mod core;
pub mod engine_state;
pub mod error;

use config::EngineConfig;
use engine_state::EngineState;
use error::EngineError;

/// Environment variable naming a JSON config file for `run()`.
pub const CONFIG_PATH_ENV: &str = "VOXEL_GLOBE_CONFIG";

const FLIGHT_FRAMES: u32 = 240;
/// Blocks travelled along +X per frame.
const FLIGHT_SPEED: f32 = 0.5;
const REPORT_INTERVAL: u32 = 60;

/// Runs a headless flight over the terrain and logs what the engine does.
///
/// Logging is configured through `RUST_LOG`; the engine configuration is read
/// from the file named by `VOXEL_GLOBE_CONFIG`, or defaults when unset.
pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    if let Err(err) = fly() {
        error!("Engine failed: {}", err);
        std::process::exit(1);
    }
}

fn fly() -> Result<(), EngineError> {
    let config = match env::var(CONFIG_PATH_ENV) {
        Ok(path) => {
            info!("Loading configuration from {}", path);
            EngineConfig::load(path)?
        }
        Err(_) => EngineConfig::default(),
    };
    let altitude = config.world.terrain.base_height as f32 + config.world.terrain.amplitude as f32 + 8.0;

    let mut engine = EngineState::new(config)?;
    let mut position = Point3::new(8.0, altitude, 8.0);

    for frame in 1..=FLIGHT_FRAMES {
        let stats = engine.frame(position, Deg(0.0), Deg(-20.0));
        if frame % REPORT_INTERVAL == 0 {
            info!(
                "Frame {} at chunk {:?}: {} loaded, {} meshed, {} visible, {} tasks pending, {:?}",
                stats.frame,
                stats.player_chunk,
                stats.loaded_chunks,
                stats.meshed_chunks,
                stats.visible_chunks,
                stats.pending_tasks,
                stats.frame_time
            );
        }
        position.x += FLIGHT_SPEED;
    }

    let idle = engine.wait_until_idle(Duration::from_secs(30));
    let mesh_stats = engine.mesh_stats();
    info!(
        "Flight finished (idle: {}): {} chunks loaded, {} meshes with {} faces, {} evictions",
        idle,
        engine.world().get().len(),
        mesh_stats.cached_meshes,
        mesh_stats.total_faces,
        mesh_stats.evictions
    );
    Ok(())
}
