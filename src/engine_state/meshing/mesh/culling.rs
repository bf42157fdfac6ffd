//! Face-culling mesher: one quad per block face that is not hidden by its
//! neighbour. Simpler and faster to build than the greedy mesher, at the cost
//! of many more quads on flat surfaces.

use log::debug;
use web_time::Instant;

use crate::engine_state::voxels::{block::block_side::BlockSide, chunk::Chunk};

use super::{face::Face, mesh::Mesh};

pub fn culled_sided(chunk: &Chunk, index: u32, sides: &[BlockSide]) -> Mesh {
    let start = Instant::now();
    let mut mesh = Mesh::new();

    for (position, block) in chunk.blocks() {
        let occluded = chunk.generate_adjacent_blocks(position.x, position.y, position.z);
        for side in sides {
            if occluded[*side as usize] {
                continue;
            }
            let face = Face::new(position.x, position.y, position.z, block.get_type(), *side);
            mesh.add_face(&face, index);
        }
    }

    debug!(
        "Culled mesh for chunk {:?}: {} faces in {:?}",
        chunk.position,
        mesh.face_count(),
        start.elapsed()
    );

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;
    use cgmath::Point3;

    #[test]
    fn single_block_has_six_faces() {
        let mut chunk = Chunk::empty(&Point3::new(0, 0, 0));
        chunk.set_block(8, 8, 8, BlockType::STONE).unwrap();
        let mesh = culled_sided(&chunk, 0, &BlockSide::all());
        assert_eq!(mesh.face_count(), 6);
        for side in BlockSide::all() {
            assert_eq!(mesh.side(side).face_count(), 1);
        }
    }

    #[test]
    fn requested_sides_only() {
        let mut chunk = Chunk::empty(&Point3::new(0, 0, 0));
        chunk.set_block(8, 8, 8, BlockType::STONE).unwrap();
        let mesh = culled_sided(&chunk, 0, &[BlockSide::TOP]);
        assert_eq!(mesh.face_count(), 1);
        assert!(mesh.side(BlockSide::BOTTOM).is_empty());
    }

    #[test]
    fn solid_chunk_only_meshes_its_shell() {
        let chunk = Chunk::solid(&Point3::new(0, 0, 0), BlockType::DIRT);
        let mesh = culled_sided(&chunk, 0, &BlockSide::all());
        assert_eq!(mesh.face_count(), 6 * 256);
    }

    #[test]
    fn checkerboard_shows_every_face() {
        let chunk = Chunk::checkerboard(&Point3::new(0, 0, 0));
        let mesh = culled_sided(&chunk, 0, &BlockSide::all());
        assert_eq!(mesh.face_count(), 2048 * 6);
    }
}
