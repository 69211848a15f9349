//! Fixed-size cubic block storage, the unit of lazy allocation in a volume.
#![forbid(unsafe_code)]

use hashbrown::HashMap;
use mcvolume_blocks::{DEFAULT_BLOCK_ID, PaletteId, VolBlockState};
use mcvolume_geom::IVec3;
use thiserror::Error;

mod tile;

pub use tile::TileData;

pub const MIN_BIT_SIZE: u8 = 1;
pub const MAX_BIT_SIZE: u8 = 8;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
    #[error("chunk bit size {0} outside [{MIN_BIT_SIZE}, {MAX_BIT_SIZE}]")]
    InvalidBitSize(u8),
    #[error("chunk needs {expected} block ids, got {got}")]
    WrongBlockCount { expected: usize, got: usize },
    #[error("local position {0} outside a chunk of side {1}")]
    LocalOutOfRange(IVec3, i32),
}

/// Dense `S³` palette ids (`S = 1 << bit_size`) plus sparse tile data.
///
/// Storage is Y-major, then Z, then X: `x + (z << bits) + (y << 2*bits)`,
/// the same order `Boundary::linearize` uses, so a run of constant `(y, z)`
/// is one contiguous slice.
#[derive(Clone, Debug)]
pub struct Chunk {
    bit_size: u8,
    blocks: Box<[PaletteId]>,
    tile_data: HashMap<IVec3, TileData>,
}

impl Chunk {
    pub fn new(bit_size: u8) -> Result<Self, ChunkError> {
        check_bit_size(bit_size)?;
        Ok(Self {
            bit_size,
            blocks: vec![DEFAULT_BLOCK_ID; block_count(bit_size)].into_boxed_slice(),
            tile_data: HashMap::new(),
        })
    }

    /// Restores a chunk from raw ids and tile data, as read by a serializer.
    pub fn from_raw(
        bit_size: u8,
        blocks: Vec<PaletteId>,
        tile_data: impl IntoIterator<Item = (IVec3, TileData)>,
    ) -> Result<Self, ChunkError> {
        check_bit_size(bit_size)?;
        let expected = block_count(bit_size);
        if blocks.len() != expected {
            return Err(ChunkError::WrongBlockCount {
                expected,
                got: blocks.len(),
            });
        }
        let mut chunk = Self {
            bit_size,
            blocks: blocks.into_boxed_slice(),
            tile_data: HashMap::new(),
        };
        for (local, data) in tile_data {
            if !chunk.contains_local(local) {
                return Err(ChunkError::LocalOutOfRange(local, chunk.side_len()));
            }
            chunk.tile_data.insert(local, data);
        }
        Ok(chunk)
    }

    #[inline]
    pub fn bit_size(&self) -> u8 {
        self.bit_size
    }

    #[inline]
    pub fn side_len(&self) -> i32 {
        1 << self.bit_size
    }

    #[inline]
    pub fn contains_local(&self, local: IVec3) -> bool {
        let s = self.side_len();
        local.all_ge(IVec3::ZERO) && local.x < s && local.y < s && local.z < s
    }

    #[inline]
    pub fn local_to_index(&self, local: IVec3) -> usize {
        debug_assert!(self.contains_local(local), "{local} outside chunk");
        let b = self.bit_size as u32;
        (local.x + (local.z << b) + (local.y << (2 * b))) as usize
    }

    #[inline]
    pub fn index_to_local(&self, idx: usize) -> IVec3 {
        let b = self.bit_size as u32;
        let mask = (1usize << b) - 1;
        IVec3::new(
            (idx & mask) as i32,
            (idx >> (2 * b)) as i32,
            ((idx >> b) & mask) as i32,
        )
    }

    #[inline]
    pub fn get_block(&self, local: IVec3) -> PaletteId {
        self.blocks[self.local_to_index(local)]
    }

    /// Writes the entry's id. Ownership of the entry is checked by the volume.
    #[inline]
    pub fn set_block(&mut self, local: IVec3, entry: &VolBlockState) {
        self.set_id(local, entry.id());
    }

    #[inline]
    pub fn set_id(&mut self, local: IVec3, id: PaletteId) {
        let i = self.local_to_index(local);
        self.blocks[i] = id;
    }

    #[inline]
    pub fn blocks(&self) -> &[PaletteId] {
        &self.blocks
    }

    #[inline]
    pub fn blocks_mut(&mut self) -> &mut [PaletteId] {
        &mut self.blocks
    }

    pub fn tile_data(&self, local: IVec3) -> Option<&TileData> {
        self.tile_data.get(&local)
    }

    /// Stores `data` at `local`, or removes it when `None`. Returns the previous handle.
    pub fn set_tile_data(&mut self, local: IVec3, data: Option<TileData>) -> Option<TileData> {
        debug_assert!(self.contains_local(local), "{local} outside chunk");
        match data {
            Some(d) => self.tile_data.insert(local, d),
            None => self.tile_data.remove(&local),
        }
    }

    pub fn tile_data_iter(&self) -> impl Iterator<Item = (IVec3, &TileData)> + '_ {
        self.tile_data.iter().map(|(p, d)| (*p, d))
    }

    #[inline]
    pub fn has_tile_data(&self) -> bool {
        !self.tile_data.is_empty()
    }

    /// True when every voxel holds the default id.
    pub fn can_be_cleaned_up(&self) -> bool {
        self.blocks.iter().all(|&id| id == DEFAULT_BLOCK_ID)
    }

    /// Component-wise minimum local position over non-default voxels.
    pub fn compute_min_local_pos(&self) -> Option<IVec3> {
        self.non_default_positions()
            .reduce(IVec3::min)
    }

    /// Component-wise maximum local position over non-default voxels.
    pub fn compute_max_local_pos(&self) -> Option<IVec3> {
        self.non_default_positions()
            .reduce(IVec3::max)
    }

    fn non_default_positions(&self) -> impl Iterator<Item = IVec3> + '_ {
        self.blocks
            .iter()
            .enumerate()
            .filter(|&(_, &id)| id != DEFAULT_BLOCK_ID)
            .map(|(i, _)| self.index_to_local(i))
    }
}

#[inline]
fn block_count(bit_size: u8) -> usize {
    1usize << (3 * bit_size as u32)
}

fn check_bit_size(bit_size: u8) -> Result<(), ChunkError> {
    if (MIN_BIT_SIZE..=MAX_BIT_SIZE).contains(&bit_size) {
        Ok(())
    } else {
        Err(ChunkError::InvalidBitSize(bit_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_layout_is_y_major() {
        let c = Chunk::new(2).unwrap();
        assert_eq!(c.local_to_index(IVec3::new(1, 0, 0)), 1);
        assert_eq!(c.local_to_index(IVec3::new(0, 0, 1)), 4);
        assert_eq!(c.local_to_index(IVec3::new(0, 1, 0)), 16);
        assert_eq!(c.index_to_local(16 + 8 + 3), IVec3::new(3, 1, 2));
    }

    #[test]
    fn bounds_of_empty_chunk() {
        let c = Chunk::new(3).unwrap();
        assert!(c.can_be_cleaned_up());
        assert_eq!(c.compute_min_local_pos(), None);
        assert_eq!(c.compute_max_local_pos(), None);
    }
}
