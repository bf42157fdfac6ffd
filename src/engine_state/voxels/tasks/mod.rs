//! # Voxel Task System
//!
//! This module contains tasks related to voxel world generation.
//! These tasks run on the worker pool so generation never stalls a frame.

pub mod chunk_generation_task;
