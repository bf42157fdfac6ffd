//! # Block Side Module
//!
//! This module defines the six faces of a voxel block, their axis directions,
//! and view-direction based face visibility.

use cgmath::Vector3;

/// Represents the six possible faces of a voxel block.
///
/// The discriminants index per-side arrays (meshes, adjacency flags,
/// texture tables).
///
/// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The face looking towards negative X
    FRONT = 0,

    /// The face looking towards positive X
    BACK = 1,

    /// The face looking towards negative Y
    BOTTOM = 2,

    /// The face looking towards positive Y
    TOP = 3,

    /// The face looking towards negative Z
    LEFT = 4,

    /// The face looking towards positive Z
    RIGHT = 5,
}

impl BlockSide {
    /// Returns all six block faces in discriminant order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::BOTTOM,
            BlockSide::TOP,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ]
    }

    /// The face pointing the other way along the same axis.
    pub fn opposite(self) -> BlockSide {
        match self {
            BlockSide::FRONT => BlockSide::BACK,
            BlockSide::BACK => BlockSide::FRONT,
            BlockSide::BOTTOM => BlockSide::TOP,
            BlockSide::TOP => BlockSide::BOTTOM,
            BlockSide::LEFT => BlockSide::RIGHT,
            BlockSide::RIGHT => BlockSide::LEFT,
        }
    }

    /// Unit step from a block to its neighbour across this face.
    pub fn offset(self) -> Vector3<i32> {
        match self {
            BlockSide::FRONT => Vector3::new(-1, 0, 0),
            BlockSide::BACK => Vector3::new(1, 0, 0),
            BlockSide::BOTTOM => Vector3::new(0, -1, 0),
            BlockSide::TOP => Vector3::new(0, 1, 0),
            BlockSide::LEFT => Vector3::new(0, 0, -1),
            BlockSide::RIGHT => Vector3::new(0, 0, 1),
        }
    }

    /// Outward face normal.
    pub fn normal(self) -> Vector3<f32> {
        self.offset().cast::<f32>().unwrap_or(Vector3::new(0.0, 0.0, 0.0))
    }

    /// Determines which block faces are potentially visible from a given view direction.
    ///
    /// A face is dropped only when the view direction points along its
    /// normal by more than 45 degrees, i.e. the camera is looking at the
    /// back of every such face.
    ///
    /// # Arguments
    /// * `view_vec` - The normalized view direction vector
    ///
    /// # Returns
    /// The potentially visible faces, in `all()` order.
    pub fn get_visible_sides(view_vec: Vector3<f32>) -> Vec<BlockSide> {
        // cos(45 degrees)
        const CUTOFF: f32 = std::f32::consts::FRAC_1_SQRT_2;
        let mut visible_sides = Vec::new();

        if view_vec.x > -CUTOFF {
            visible_sides.push(BlockSide::FRONT);
        }
        if view_vec.x < CUTOFF {
            visible_sides.push(BlockSide::BACK);
        }
        if view_vec.y > -CUTOFF {
            visible_sides.push(BlockSide::BOTTOM);
        }
        if view_vec.y < CUTOFF {
            visible_sides.push(BlockSide::TOP);
        }
        if view_vec.z > -CUTOFF {
            visible_sides.push(BlockSide::LEFT);
        }
        if view_vec.z < CUTOFF {
            visible_sides.push(BlockSide::RIGHT);
        }

        visible_sides
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_offsets_cancel() {
        for side in BlockSide::all() {
            assert_eq!(side.opposite().opposite(), side);
            assert_eq!(side.offset() + side.opposite().offset(), Vector3::new(0, 0, 0));
        }
    }

    #[test]
    fn looking_down_positive_x_hides_positive_x_faces() {
        let sides = BlockSide::get_visible_sides(Vector3::new(1.0, 0.0, 0.0));
        assert!(sides.contains(&BlockSide::FRONT));
        assert!(!sides.contains(&BlockSide::BACK));
        assert_eq!(sides.len(), 5);
    }

    #[test]
    fn diagonal_view_keeps_all_sides() {
        let view = Vector3::new(0.5f32, 0.5, 0.5);
        let len = (0.75f32).sqrt();
        let sides = BlockSide::get_visible_sides(view / len);
        assert_eq!(sides.len(), 6);
    }
}
