//! Greedy meshing implementation for chunk meshes.
//!
//! This module implements the greedy meshing algorithm which combines adjacent coplanar
//! faces with the same block type into larger quads, significantly reducing the number of
//! vertices needed to render a voxel world.
//!
//! For every requested side the chunk is cut into 16 slices along the side's
//! normal. Each slice becomes a 16x16 mask of visible face types, which is then
//! swept row by row: a run is grown along u as far as the type repeats, then
//! grown along v while every cell of the next row matches.

use log::debug;
use web_time::Instant;

use crate::engine_state::voxels::{
    block::{block_side::BlockSide, block_type::BlockType},
    chunk::{Chunk, CHUNK_DIMENSION},
};

use super::{face::Face, mesh::Mesh};

const DIMENSION: usize = CHUNK_DIMENSION as usize;

/// Visible face types of one slice, indexed `u + DIMENSION * v`.
type SliceMask = [Option<BlockType>; DIMENSION * DIMENSION];

/// Maps slice coordinates `(slice, u, v)` to chunk-local `(x, y, z)` for a side.
#[inline]
fn slice_to_local(side: BlockSide, slice: usize, u: usize, v: usize) -> (usize, usize, usize) {
    match side {
        BlockSide::FRONT | BlockSide::BACK => (slice, v, u),
        BlockSide::LEFT | BlockSide::RIGHT => (u, v, slice),
        BlockSide::BOTTOM | BlockSide::TOP => (v, slice, u),
    }
}

/// Fills `mask` with the visible faces of `side` in one slice.
///
/// Returns `false` if the slice has no visible face at all.
fn build_slice_mask(chunk: &Chunk, side: BlockSide, slice: usize, mask: &mut SliceMask) -> bool {
    let mut any_visible = false;

    for v in 0..DIMENSION {
        for u in 0..DIMENSION {
            let (x, y, z) = slice_to_local(side, slice, u, v);
            let (i, j, k) = (x + 1, y + 1, z + 1);
            let block = chunk.block_at_padded(i, j, k);

            let cell = if block.is_air() || chunk.is_face_occluded(i, j, k, side) {
                None
            } else {
                any_visible = true;
                Some(block.get_type())
            };
            mask[u + DIMENSION * v] = cell;
        }
    }

    any_visible
}

/// Sweeps a slice mask and emits maximal rectangles. The mask is consumed.
fn merge_slice(
    mask: &mut SliceMask,
    side: BlockSide,
    slice: usize,
    faces_to_make: &mut Vec<Face>,
) {
    for v in 0..DIMENSION {
        let mut u = 0;
        while u < DIMENSION {
            let Some(block_type) = mask[u + DIMENSION * v] else {
                u += 1;
                continue;
            };

            let mut width = 1;
            while u + width < DIMENSION && mask[u + width + DIMENSION * v] == Some(block_type) {
                width += 1;
            }

            let mut height = 1;
            'grow: while v + height < DIMENSION {
                let row = DIMENSION * (v + height);
                for du in 0..width {
                    if mask[u + du + row] != Some(block_type) {
                        break 'grow;
                    }
                }
                height += 1;
            }

            for dv in 0..height {
                let row = DIMENSION * (v + dv);
                for du in 0..width {
                    mask[u + du + row] = None;
                }
            }

            let (x, y, z) = slice_to_local(side, slice, u, v);
            faces_to_make.push(Face::new_sized(x, y, z, width, height, block_type, side));
            u += width;
        }
    }
}

/// Generates a mesh for the specified chunk using greedy meshing for the given sides.
///
/// # Arguments
/// * `chunk` - The chunk to generate the mesh for
/// * `index` - The chunk coordinate index stamped into every vertex
/// * `sides` - A list of block sides to generate mesh data for
///
/// # Returns
/// A new `Mesh` covering exactly the same block faces as the culling mesher,
/// with as few quads as the greedy sweep finds.
pub fn greedy_sided(chunk: &Chunk, index: u32, sides: &[BlockSide]) -> Mesh {
    let start = Instant::now();
    let mut mesh = Mesh::new();

    if chunk.is_empty() {
        return mesh;
    }

    let mut mask: SliceMask = [None; DIMENSION * DIMENSION];
    let mut faces_to_make = Vec::new();

    for side in sides {
        for slice in 0..DIMENSION {
            if build_slice_mask(chunk, *side, slice, &mut mask) {
                merge_slice(&mut mask, *side, slice, &mut faces_to_make);
            }
        }
    }

    for face in &faces_to_make {
        mesh.add_face(face, index);
    }

    debug!(
        "Greedy mesh for chunk {:?}: {} faces in {:?}",
        chunk.position,
        faces_to_make.len(),
        start.elapsed()
    );

    mesh
}
