//! # Block Module
//!
//! This module provides the core block-related functionality for the voxel engine.
//! It includes block type definitions, block face handling, and the compact
//! block value stored in chunks.

use block_side::BlockSide;
use block_type::{BlockType, BLOCK_TYPE_COUNT};

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types in memory.
pub type BlockTypeSize = u8;

/// Maps each block type to its texture indices for each face.
///
/// The outer array is indexed by `BlockType` as a `usize`.
/// The inner array is in `BlockSide` order:
/// [Front, Back, Bottom, Top, Left, Right]
pub static BLOCK_TYPE_TO_TEXTURE_INDICES: [[usize; 6]; BLOCK_TYPE_COUNT] = [
    [0, 0, 0, 0, 0, 0], // AIR (never meshed)
    [1, 1, 1, 1, 1, 1], // DIRT
    [2, 2, 1, 3, 2, 2], // GRASS (top: 3, bottom: dirt, sides: 2)
    [5, 5, 5, 5, 5, 5], // STONE
    [0, 0, 6, 6, 0, 0], // WOOD (rings on top and bottom)
    [7, 7, 7, 7, 7, 7], // LEAVES
    [8, 8, 8, 8, 8, 8], // SAND
    [9, 9, 9, 9, 9, 9], // WATER
    [10, 10, 10, 10, 10, 10], // GLASS
    [4, 4, 4, 4, 4, 4], // WHITE
];

/// Represents a single voxel block in the world.
///
/// # Memory Layout
/// `#[repr(C)]` with a single `BlockTypeSize`, so a chunk's block array can be
/// viewed as raw bytes.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq, Eq)]
pub struct Block {
    /// The type of this block, encoded as a `BlockTypeSize` for compact storage.
    pub block_type: BlockTypeSize,
}

impl Block {
    pub const AIR: Block = Block {
        block_type: BlockType::AIR as BlockTypeSize,
    };

    pub fn new(block_type: BlockType) -> Self {
        Block {
            block_type: block_type as BlockTypeSize,
        }
    }

    /// Decoded block type. Unknown ids read as air.
    pub fn get_type(&self) -> BlockType {
        BlockType::from_id(self.block_type).unwrap_or(BlockType::AIR)
    }

    pub fn is_air(&self) -> bool {
        self.get_type().is_air()
    }

    pub fn is_opaque(&self) -> bool {
        self.get_type().is_opaque()
    }

    /// Whether this block, sitting next to `other`, hides the face of `other`
    /// that touches it.
    ///
    /// Opaque blocks hide everything. A transparent block only hides faces of
    /// the same type, so the inside of a body of water has no faces while its
    /// surface against air and glass does.
    pub fn occludes_face_of(&self, other: &Block) -> bool {
        let this = self.get_type();
        if this.is_opaque() {
            return true;
        }
        !this.is_air() && this == other.get_type()
    }

    /// Texture index of each face, in `BlockSide` order.
    pub fn texture_indices(&self) -> [usize; 6] {
        BLOCK_TYPE_TO_TEXTURE_INDICES[self.get_type() as usize]
    }

    /// Texture index of a single face.
    pub fn texture_index(&self, side: BlockSide) -> usize {
        self.texture_indices()[side as usize]
    }
}

impl Default for Block {
    fn default() -> Self {
        Block::AIR
    }
}

impl From<BlockType> for Block {
    fn from(block_type: BlockType) -> Self {
        Block::new(block_type)
    }
}
