//! # Meshing Task System
//!
//! Tasks that build chunk meshes on worker threads.

pub mod chunk_mesh_generation_task;
