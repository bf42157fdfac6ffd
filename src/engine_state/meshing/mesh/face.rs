use cgmath::Point3;

use crate::engine_state::voxels::block::{block_side::BlockSide, block_type::BlockType};

/// Represents a single quad of a chunk mesh.
///
/// A face is defined by four corner points (lower-left, lower-right, upper-left, upper-right)
/// and contains information about the block type and which side of the block it represents.
/// Each side has its own in-plane axes: `u` runs from `ll` to `lr` and `v` from `ll` to `ul`.
///
/// | side          | u axis | v axis |
/// |---------------|--------|--------|
/// | FRONT, BACK   | z      | y      |
/// | LEFT, RIGHT   | x      | y      |
/// | BOTTOM, TOP   | z      | x      |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// Lower-right corner of the face in chunk coordinates
    pub lr: Point3<usize>,
    /// Lower-left corner of the face in chunk coordinates
    pub ll: Point3<usize>,
    /// Upper-right corner of the face in chunk coordinates
    pub ur: Point3<usize>,
    /// Upper-left corner of the face in chunk coordinates
    pub ul: Point3<usize>,
    /// The block type, used for texture mapping
    pub block_type: BlockType,
    /// Which side of the block this face represents
    pub block_side: BlockSide,
}

impl Face {
    /// Creates the unit face of the voxel at `(i, j, k)`.
    pub fn new(i: usize, j: usize, k: usize, block_type: BlockType, block_side: BlockSide) -> Self {
        Self::new_sized(i, j, k, 1, 1, block_type, block_side)
    }

    /// Creates a face whose minimum voxel is `(i, j, k)`, spanning `width`
    /// voxels along the side's u axis and `height` voxels along its v axis.
    ///
    /// # Arguments
    /// * `i`, `j`, `k` - The coordinates of the minimum voxel in chunk space
    /// * `width` - Extent along the u axis, in voxels
    /// * `height` - Extent along the v axis, in voxels
    /// * `block_type` - The type of the block, used for texture mapping
    /// * `block_side` - Which side of the block this face represents
    #[allow(clippy::too_many_arguments)]
    pub fn new_sized(
        i: usize,
        j: usize,
        k: usize,
        width: usize,
        height: usize,
        block_type: BlockType,
        block_side: BlockSide,
    ) -> Self {
        let (w, h) = (width, height);
        let (ll, lr, ul, ur) = match block_side {
            BlockSide::FRONT => (
                Point3::new(i, j, k),
                Point3::new(i, j, k + w),
                Point3::new(i, j + h, k),
                Point3::new(i, j + h, k + w),
            ),

            BlockSide::BACK => (
                Point3::new(i + 1, j, k + w),
                Point3::new(i + 1, j, k),
                Point3::new(i + 1, j + h, k + w),
                Point3::new(i + 1, j + h, k),
            ),

            BlockSide::BOTTOM => (
                Point3::new(i, j, k + w),
                Point3::new(i, j, k),
                Point3::new(i + h, j, k + w),
                Point3::new(i + h, j, k),
            ),

            BlockSide::TOP => (
                Point3::new(i, j + 1, k),
                Point3::new(i, j + 1, k + w),
                Point3::new(i + h, j + 1, k),
                Point3::new(i + h, j + 1, k + w),
            ),

            BlockSide::LEFT => (
                Point3::new(i + w, j, k),
                Point3::new(i, j, k),
                Point3::new(i + w, j + h, k),
                Point3::new(i, j + h, k),
            ),

            BlockSide::RIGHT => (
                Point3::new(i, j, k + 1),
                Point3::new(i + w, j, k + 1),
                Point3::new(i, j + h, k + 1),
                Point3::new(i + w, j + h, k + 1),
            ),
        };

        Face {
            ll,
            lr,
            ul,
            ur,
            block_type,
            block_side,
        }
    }

    /// Extent of the face along its u and v axes, in voxels.
    pub fn dimensions(&self) -> (usize, usize) {
        match self.block_side {
            BlockSide::FRONT => (self.lr.z - self.ll.z, self.ul.y - self.ll.y),
            BlockSide::BACK => (self.ll.z - self.lr.z, self.ul.y - self.ll.y),
            BlockSide::LEFT => (self.ll.x - self.lr.x, self.ul.y - self.ll.y),
            BlockSide::RIGHT => (self.lr.x - self.ll.x, self.ul.y - self.ll.y),
            BlockSide::TOP => (self.lr.z - self.ll.z, self.ul.x - self.ll.x),
            BlockSide::BOTTOM => (self.ll.z - self.lr.z, self.ul.x - self.ll.x),
        }
    }

    /// Number of voxel faces this quad covers.
    pub fn area(&self) -> usize {
        let (width, height) = self.dimensions();
        width * height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_faces_have_unit_dimensions() {
        for side in BlockSide::all() {
            let face = Face::new(2, 3, 4, BlockType::DIRT, side);
            assert_eq!(face.dimensions(), (1, 1), "{side:?}");
        }
    }

    #[test]
    fn sized_faces_report_their_extent() {
        for side in BlockSide::all() {
            let face = Face::new_sized(0, 0, 0, 3, 5, BlockType::STONE, side);
            assert_eq!(face.dimensions(), (3, 5), "{side:?}");
            assert_eq!(face.area(), 15);
        }
    }

    #[test]
    fn faces_lie_on_the_outer_plane_of_their_side() {
        let top = Face::new(1, 1, 1, BlockType::GRASS, BlockSide::TOP);
        assert!([top.ll, top.lr, top.ul, top.ur].iter().all(|p| p.y == 2));

        let front = Face::new(1, 1, 1, BlockType::GRASS, BlockSide::FRONT);
        assert!([front.ll, front.lr, front.ul, front.ur].iter().all(|p| p.x == 1));
    }
}
