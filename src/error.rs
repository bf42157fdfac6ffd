//! Error types shared by the engine.

use cgmath::Point3;
use thiserror::Error;

/// Failures while loading or validating an [`EngineConfig`](crate::config::EngineConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors surfaced by world edits and engine construction.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("local block position ({x}, {y}, {z}) is outside the chunk")]
    OutOfBounds { x: usize, y: usize, z: usize },
    #[error("chunk {0:?} is not loaded")]
    ChunkNotLoaded(Point3<i32>),
}
