//! # Voxel Data
//!
//! Blocks, chunks and the sparse world that holds them.
//!
//! ## Architecture
//!
//! * **Block**: Block types, their opacity and per-side texture indices
//! * **Chunk**: A 16³ block array stored with a one-block padding ring that
//!   mirrors the neighbouring chunks' borders
//! * **Generation**: Deterministic terrain and test-pattern chunk generators
//! * **World**: The loaded chunks, keyed by chunk position
//! * **Tasks**: Chunk generation on the worker pool
//!
//! ## Data Flow
//!
//! 1. The streamer asks for a chunk position to be generated
//! 2. A worker generates the chunk; the main thread inserts it into the world
//! 3. Inserting syncs the padding of the chunk and its loaded neighbours
//! 4. The chunk and every neighbour whose padding changed are remeshed
//!
//! ## Thread Safety
//!
//! Each chunk sits behind its own `MtResource`, so mesh workers read chunks
//! without ever locking the world.

pub mod block;
pub mod chunk;
pub mod generation;
pub mod tasks;
pub mod world;
