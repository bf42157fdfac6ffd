//! # Block Type Module
//!
//! The kinds of blocks a chunk can hold and their optical properties.

use num_derive::FromPrimitive;

use super::BlockTypeSize;

/// Enumerates all possible block types in the voxel world.
///
/// The discriminant is the id stored in chunk data; `FromPrimitive` turns a
/// stored id back into the enum.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
#[repr(u8)]
pub enum BlockType {
    /// Empty space. Never produces geometry and never hides a face.
    AIR,
    DIRT,
    /// Grass has a dedicated top texture.
    GRASS,
    STONE,
    WOOD,
    /// Leaves are see-through.
    LEAVES,
    SAND,
    /// Water is see-through; faces between two water blocks are dropped.
    WATER,
    /// Glass is see-through; faces between two glass blocks are dropped.
    GLASS,
    /// A plain white block, used for debugging.
    WHITE,
}

/// Number of `BlockType` variants.
pub const BLOCK_TYPE_COUNT: usize = 10;

impl BlockType {
    /// Converts a stored id to a `BlockType`, or `None` for unknown ids.
    pub fn from_id(id: BlockTypeSize) -> Option<Self> {
        num::FromPrimitive::from_u8(id)
    }

    pub fn id(self) -> BlockTypeSize {
        self as BlockTypeSize
    }

    pub fn is_air(self) -> bool {
        self == BlockType::AIR
    }

    /// Opaque blocks hide every face that touches them.
    pub fn is_opaque(self) -> bool {
        !matches!(
            self,
            BlockType::AIR | BlockType::WATER | BlockType::GLASS | BlockType::LEAVES
        )
    }

    /// Non-air blocks that let light through.
    pub fn is_transparent(self) -> bool {
        !self.is_air() && !self.is_opaque()
    }

    /// Generates a random opaque, non-air block type.
    ///
    /// This is used for the noise and random generators.
    pub fn random_solid() -> Self {
        const CHOICES: [BlockType; 4] = [
            BlockType::DIRT,
            BlockType::GRASS,
            BlockType::STONE,
            BlockType::WOOD,
        ];
        CHOICES[fastrand::usize(..CHOICES.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_from_id() {
        for id in 0..BLOCK_TYPE_COUNT as u8 {
            assert_eq!(BlockType::from_id(id).map(BlockType::id), Some(id));
        }
        assert_eq!(BlockType::from_id(BLOCK_TYPE_COUNT as u8), None);
    }

    #[test]
    fn block_types_are_one_byte() {
        assert_eq!(std::mem::size_of::<BlockType>(), std::mem::size_of::<BlockTypeSize>());
        assert_eq!(BlockType::WHITE as BlockTypeSize, BLOCK_TYPE_COUNT as u8 - 1);
    }

    #[test]
    fn transparency_classes() {
        assert!(!BlockType::AIR.is_opaque());
        assert!(!BlockType::AIR.is_transparent());
        assert!(BlockType::WATER.is_transparent());
        assert!(BlockType::STONE.is_opaque());
    }

    #[test]
    fn random_solid_is_opaque() {
        for _ in 0..32 {
            assert!(BlockType::random_solid().is_opaque());
        }
    }
}
