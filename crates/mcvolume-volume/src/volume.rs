use std::sync::atomic::{AtomicU64, Ordering};

use hashbrown::HashMap;
use mcvolume_blocks::{
    BlockPaletteMappings, BlockState, DEFAULT_BLOCK_ID, Palette, PaletteId, PaletteKind,
    VolBlockState, VolumeId,
};
use mcvolume_chunk::{Chunk, TileData};
use mcvolume_geom::{Axis, Boundary, IVec3};

use crate::config::{VolumeConfig, check_chunk_bit_size, check_thread_count};
use crate::error::VolumeError;
use crate::workers::WorkerPool;

/// Largest element count of a flat block-id array or of the chunk slot array.
pub const MAX_GRID_LEN: usize = i32::MAX as usize - 8;

static NEXT_VOLUME_ID: AtomicU64 = AtomicU64::new(0);

fn next_volume_id() -> VolumeId {
    VolumeId::new(NEXT_VOLUME_ID.fetch_add(1, Ordering::Relaxed))
}

/// Everything needed to rebuild a [`Volume`] without re-deriving it.
#[derive(Clone, Debug)]
pub struct VolumeParts {
    pub chunk_bit_size: u8,
    /// Chunk slots, in chunk-grid space.
    pub chunk_grid_bound: Boundary,
    /// The block-space area the volume was asked to cover.
    pub target_bound: Boundary,
    pub palette: BlockPaletteMappings,
    pub palette_kind: PaletteKind,
    /// Allocated chunks keyed by chunk-grid position.
    pub chunks: Vec<(IVec3, Chunk)>,
}

/// Sparse block volume: a grid of lazily allocated chunks over a resizable
/// loaded area, with one palette shared by every chunk.
///
/// Three boxes describe the shape. `target_bound` is what the caller asked
/// for, `loaded_bound` is that area rounded outward to whole chunks, and
/// `chunk_grid_bound` is `loaded_bound` in chunk units. Every per-voxel
/// accessor requires its position to be inside `loaded_bound`.
///
/// Not safe for concurrent mutation; bulk transfers parallelize internally.
#[derive(Debug)]
pub struct Volume {
    id: VolumeId,
    chunk_bit_size: u8,
    pub(crate) chunks: Vec<Option<Box<Chunk>>>,
    pub(crate) palette: Palette,
    chunk_grid_bound: Boundary,
    loaded_bound: Boundary,
    target_bound: Boundary,
    state_cache: HashMap<String, BlockState>,
    bulk_threads: usize,
    pub(crate) workers: WorkerPool,
}

impl Volume {
    /// Volume covering `[min, max)` whose empty space is `default_block`.
    pub fn new(
        min: IVec3,
        max: IVec3,
        default_block: &str,
        chunk_bit_size: u8,
    ) -> Result<Self, VolumeError> {
        let config = VolumeConfig {
            chunk_bit_size,
            default_block: default_block.to_string(),
            ..VolumeConfig::default()
        };
        Self::with_config(min, max, &config)
    }

    pub fn with_config(min: IVec3, max: IVec3, config: &VolumeConfig) -> Result<Self, VolumeError> {
        config.validate()?;
        let default_state = BlockState::parse(&config.default_block)?;
        let id = next_volume_id();
        let mut vol = Self {
            id,
            chunk_bit_size: config.chunk_bit_size,
            chunks: Vec::new(),
            palette: Palette::new(id, default_state, config.palette),
            chunk_grid_bound: Boundary::default(),
            loaded_bound: Boundary::default(),
            target_bound: Boundary::default(),
            state_cache: HashMap::new(),
            bulk_threads: config.bulk_threads,
            workers: WorkerPool::default(),
        };
        vol.set_loaded_area(min, max)?;
        Ok(vol)
    }

    /// Rebuilds a volume from already-serialized data under a fresh identity.
    pub fn from_parts(parts: VolumeParts) -> Result<Self, VolumeError> {
        check_chunk_bit_size(parts.chunk_bit_size)?;
        let grid = parts.chunk_grid_bound;
        let slots = checked_len(grid.volume())?;
        let loaded = loaded_from_grid(&grid, parts.chunk_bit_size)?;
        if !parts.target_bound.fully_inside(&loaded) {
            return Err(VolumeError::InvalidConfiguration(format!(
                "target bound {} is not inside the loaded bound {loaded}",
                parts.target_bound
            )));
        }

        let id = next_volume_id();
        let palette = Palette::from_unlinked_mappings(&parts.palette, id, parts.palette_kind)
            .map_err(VolumeError::InvalidPalette)?;

        let mut chunks: Vec<Option<Box<Chunk>>> = vec![None; slots];
        for (chunk_pos, chunk) in parts.chunks {
            if !grid.contains(chunk_pos) {
                return Err(VolumeError::InvalidConfiguration(format!(
                    "chunk {chunk_pos} is outside the chunk grid {grid}"
                )));
            }
            if chunk.bit_size() != parts.chunk_bit_size {
                return Err(VolumeError::InvalidConfiguration(format!(
                    "chunk {chunk_pos} has bit size {}, volume uses {}",
                    chunk.bit_size(),
                    parts.chunk_bit_size
                )));
            }
            if let Some(&bad) = chunk.blocks().iter().find(|&&b| b as usize >= palette.len()) {
                return Err(VolumeError::IndexOutOfRange {
                    index: bad as usize,
                    len: palette.len(),
                });
            }
            chunks[grid.linearize(chunk_pos)] = Some(Box::new(chunk));
        }

        Ok(Self {
            id,
            chunk_bit_size: parts.chunk_bit_size,
            chunks,
            palette,
            chunk_grid_bound: grid,
            loaded_bound: loaded,
            target_bound: parts.target_bound,
            state_cache: HashMap::new(),
            bulk_threads: 1,
            workers: WorkerPool::default(),
        })
    }

    pub fn into_parts(self) -> VolumeParts {
        let grid = self.chunk_grid_bound;
        let chunks = self
            .chunks
            .into_iter()
            .enumerate()
            .filter_map(|(i, c)| c.map(|c| (grid.delinearize(i), *c)))
            .collect();
        VolumeParts {
            chunk_bit_size: self.chunk_bit_size,
            chunk_grid_bound: grid,
            target_bound: self.target_bound,
            palette: self.palette.to_unlinked_mappings(),
            palette_kind: self.palette.kind(),
            chunks,
        }
    }

    pub fn to_parts(&self) -> VolumeParts {
        VolumeParts {
            chunk_bit_size: self.chunk_bit_size,
            chunk_grid_bound: self.chunk_grid_bound,
            target_bound: self.target_bound,
            palette: self.palette.to_unlinked_mappings(),
            palette_kind: self.palette.kind(),
            chunks: self.chunks().map(|(p, c)| (p, c.clone())).collect(),
        }
    }

    // --- Introspection ---

    #[inline]
    pub fn id(&self) -> VolumeId {
        self.id
    }

    #[inline]
    pub fn chunk_bit_size(&self) -> u8 {
        self.chunk_bit_size
    }

    #[inline]
    pub fn chunk_side_len(&self) -> i32 {
        1 << self.chunk_bit_size
    }

    #[inline]
    pub fn chunk_grid_bound(&self) -> Boundary {
        self.chunk_grid_bound
    }

    #[inline]
    pub fn loaded_bound(&self) -> Boundary {
        self.loaded_bound
    }

    #[inline]
    pub fn target_bound(&self) -> Boundary {
        self.target_bound
    }

    #[inline]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    #[inline]
    pub fn default_block(&self) -> &VolBlockState {
        self.palette.default_entry()
    }

    #[inline]
    pub fn bulk_threads(&self) -> usize {
        self.bulk_threads
    }

    pub fn set_bulk_threads(&mut self, threads: usize) -> Result<(), VolumeError> {
        check_thread_count(threads)?;
        self.bulk_threads = threads;
        Ok(())
    }

    pub fn allocated_chunk_count(&self) -> usize {
        self.chunks.iter().filter(|c| c.is_some()).count()
    }

    /// Allocated chunks with their chunk-grid positions, in Y/Z/X order.
    pub fn chunks(&self) -> impl Iterator<Item = (IVec3, &Chunk)> + '_ {
        let grid = self.chunk_grid_bound;
        self.chunks
            .iter()
            .enumerate()
            .filter_map(move |(i, c)| c.as_deref().map(|c| (grid.delinearize(i), c)))
    }

    pub fn chunk_at(&self, chunk_pos: IVec3) -> Option<&Chunk> {
        if !self.chunk_grid_bound.contains(chunk_pos) {
            return None;
        }
        self.chunks[self.chunk_grid_bound.linearize(chunk_pos)].as_deref()
    }

    // --- Palette ---

    /// Palette entry for `state`, inserting it if needed.
    pub fn ensured_palette_block(&mut self, state: &BlockState) -> Result<VolBlockState, VolumeError> {
        Ok(self.palette.get_or_add(state)?)
    }

    pub fn ensured_palette_block_str(&mut self, state: &str) -> Result<VolBlockState, VolumeError> {
        let state = self.parse_cached(state)?;
        self.ensured_palette_block(&state)
    }

    pub fn palette_block(&self, state: &BlockState) -> Option<&VolBlockState> {
        self.palette.get(state)
    }

    pub fn palette_block_str(&mut self, state: &str) -> Result<Option<&VolBlockState>, VolumeError> {
        let state = self.parse_cached(state)?;
        Ok(self.palette.get(&state))
    }

    fn parse_cached(&mut self, s: &str) -> Result<BlockState, VolumeError> {
        if let Some(state) = self.state_cache.get(s) {
            return Ok(state.clone());
        }
        let state = BlockState::parse(s)?;
        self.state_cache.insert(s.to_string(), state.clone());
        Ok(state)
    }

    // --- Per-voxel access ---

    /// Fastest write path: no palette lookup.
    pub fn set_vol_block_state(&mut self, pos: IVec3, entry: &VolBlockState) -> Result<(), VolumeError> {
        self.check_pos(pos)?;
        self.check_owner(entry)?;
        self.write_id(pos, entry.id())
    }

    /// Like [`Volume::set_vol_block_state`], but positions outside the loaded area are ignored.
    pub fn set_vol_block_state_safe(
        &mut self,
        pos: IVec3,
        entry: &VolBlockState,
    ) -> Result<(), VolumeError> {
        self.check_owner(entry)?;
        if !self.loaded_bound.contains(pos) {
            return Ok(());
        }
        self.write_id(pos, entry.id())
    }

    pub fn set_block_state(&mut self, pos: IVec3, state: &BlockState) -> Result<(), VolumeError> {
        self.check_pos(pos)?;
        let id = self.palette.get_or_add(state)?.id();
        self.write_id(pos, id)
    }

    pub fn set_block_state_safe(&mut self, pos: IVec3, state: &BlockState) -> Result<(), VolumeError> {
        if !self.loaded_bound.contains(pos) {
            return Ok(());
        }
        self.set_block_state(pos, state)
    }

    pub fn set_block_state_str(&mut self, pos: IVec3, state: &str) -> Result<(), VolumeError> {
        self.check_pos(pos)?;
        let state = self.parse_cached(state)?;
        self.set_block_state(pos, &state)
    }

    pub fn get_vol_block_state(&self, pos: IVec3) -> Result<&VolBlockState, VolumeError> {
        self.check_pos(pos)?;
        Ok(self.entry_at(pos))
    }

    pub fn get_block_state(&self, pos: IVec3) -> Result<&BlockState, VolumeError> {
        Ok(self.get_vol_block_state(pos)?.state())
    }

    /// The default block for positions outside the loaded area.
    pub fn get_vol_block_state_safe(&self, pos: IVec3) -> &VolBlockState {
        if self.loaded_bound.contains(pos) {
            self.entry_at(pos)
        } else {
            self.default_block()
        }
    }

    pub fn get_block_state_safe(&self, pos: IVec3) -> &BlockState {
        self.get_vol_block_state_safe(pos).state()
    }

    /// Stores a shared handle; edits made through `data` afterwards stay
    /// visible here. `None` removes. Returns the handle previously stored.
    pub fn set_tile_data(
        &mut self,
        pos: IVec3,
        data: Option<TileData>,
    ) -> Result<Option<TileData>, VolumeError> {
        self.check_pos(pos)?;
        let idx = self.chunk_index(pos);
        let local = self.pos_to_local(pos);
        let bits = self.chunk_bit_size;
        let slot = &mut self.chunks[idx];
        if let Some(chunk) = slot.as_deref_mut() {
            return Ok(chunk.set_tile_data(local, data));
        }
        let Some(data) = data else {
            return Ok(None);
        };
        let mut chunk = Box::new(Chunk::new(bits)?);
        chunk.set_tile_data(local, Some(data));
        *slot = Some(chunk);
        Ok(None)
    }

    pub fn get_tile_data(&self, pos: IVec3) -> Result<Option<&TileData>, VolumeError> {
        self.check_pos(pos)?;
        Ok(self.tile_data_at(pos))
    }

    pub fn get_tile_data_safe(&self, pos: IVec3) -> Option<&TileData> {
        if !self.loaded_bound.contains(pos) {
            return None;
        }
        self.tile_data_at(pos)
    }

    fn entry_at(&self, pos: IVec3) -> &VolBlockState {
        let id = match self.chunks[self.chunk_index(pos)].as_deref() {
            Some(chunk) => chunk.get_block(self.pos_to_local(pos)),
            None => DEFAULT_BLOCK_ID,
        };
        &self.palette[id]
    }

    fn tile_data_at(&self, pos: IVec3) -> Option<&TileData> {
        self.chunks[self.chunk_index(pos)]
            .as_deref()?
            .tile_data(self.pos_to_local(pos))
    }

    fn write_id(&mut self, pos: IVec3, id: PaletteId) -> Result<(), VolumeError> {
        let idx = self.chunk_index(pos);
        let local = self.pos_to_local(pos);
        let bits = self.chunk_bit_size;
        let slot = &mut self.chunks[idx];
        if let Some(chunk) = slot.as_deref_mut() {
            chunk.set_id(local, id);
            return Ok(());
        }
        // Default blocks never allocate.
        if id != DEFAULT_BLOCK_ID {
            let mut chunk = Box::new(Chunk::new(bits)?);
            chunk.set_id(local, id);
            *slot = Some(chunk);
        }
        Ok(())
    }

    // --- Loaded area ---

    /// Translates the whole volume by `shift` chunks without touching chunk storage.
    pub fn shift_chunks(&mut self, shift: IVec3) -> Result<(), VolumeError> {
        let overflow = || {
            VolumeError::InvalidConfiguration(format!(
                "shifting by {shift} chunks leaves the coordinate range"
            ))
        };
        let (grid, target) = (self.chunk_grid_bound, self.target_bound);
        let grid = Boundary::new(
            grid.low().checked_add(shift).ok_or_else(overflow)?,
            grid.high().checked_add(shift).ok_or_else(overflow)?,
        );
        let loaded = loaded_from_grid(&grid, self.chunk_bit_size)?;
        let block_shift = shift.checked_mul(self.chunk_side_len()).ok_or_else(overflow)?;
        let target = Boundary::new(
            target.low().checked_add(block_shift).ok_or_else(overflow)?,
            target.high().checked_add(block_shift).ok_or_else(overflow)?,
        );
        self.chunk_grid_bound = grid;
        self.loaded_bound = loaded;
        self.target_bound = target;
        Ok(())
    }

    pub fn expand_loaded_area(&mut self, margin: IVec3) -> Result<(), VolumeError> {
        let t = self.target_bound;
        match (t.low().checked_sub(margin), t.high().checked_add(margin)) {
            (Some(min), Some(max)) => self.set_loaded_area(min, max),
            _ => Err(VolumeError::InvalidConfiguration(format!(
                "expanding {t} by {margin} leaves the coordinate range"
            ))),
        }
    }

    /// Reshapes the loaded area to cover `[min, max)`.
    ///
    /// Chunks whose grid position survives are moved into the new grid, the
    /// rest are dropped. Costs one pass over the old chunk slots.
    pub fn set_loaded_area(&mut self, min: IVec3, max: IVec3) -> Result<(), VolumeError> {
        let target = Boundary::new(min, max);
        let bits = self.chunk_bit_size as u32;
        // Round the high corner up in i64; near i32::MAX the sum would overflow.
        let round_up = |c: i32| ((i64::from(c) + (1i64 << bits) - 1) >> bits) as i32;
        let high = target.high();
        let grid = Boundary::new(
            self.pos_to_chunk_pos(target.low()),
            IVec3::new(round_up(high.x), round_up(high.y), round_up(high.z)),
        );
        let slots = checked_len(grid.volume())?;
        let loaded = loaded_from_grid(&grid, self.chunk_bit_size)?;

        let old_grid = self.chunk_grid_bound;
        let mut chunks: Vec<Option<Box<Chunk>>> = vec![None; slots];
        let (mut kept, mut dropped) = (0usize, 0usize);
        for (i, slot) in self.chunks.iter_mut().enumerate() {
            let Some(chunk) = slot.take() else {
                continue;
            };
            let chunk_pos = old_grid.delinearize(i);
            if grid.contains(chunk_pos) {
                chunks[grid.linearize(chunk_pos)] = Some(chunk);
                kept += 1;
            } else {
                dropped += 1;
            }
        }

        self.chunks = chunks;
        self.chunk_grid_bound = grid;
        self.loaded_bound = loaded;
        self.target_bound = target;
        log::debug!(
            "volume {:?}: chunk grid {old_grid} -> {grid}, {kept} chunks kept, {dropped} dropped",
            self.id
        );
        Ok(())
    }

    // --- Maintenance ---

    /// Frees chunks holding only default blocks and no tile data. Returns how many were freed.
    pub fn clean_chunks(&mut self) -> usize {
        let mut freed = 0;
        for slot in &mut self.chunks {
            if slot
                .as_deref()
                .is_some_and(|c| c.can_be_cleaned_up() && !c.has_tile_data())
            {
                *slot = None;
                freed += 1;
            }
        }
        log::debug!("volume {:?}: cleaned {freed} empty chunks", self.id);
        freed
    }

    /// Tight box around every non-default block, or the unit box at the
    /// origin when there is none.
    ///
    /// Only chunks on the faces of the allocated chunk box are scanned; the
    /// extremes on each axis can only come from the chunks on that face.
    pub fn compute_build_bounds(&self) -> Boundary {
        let unit = Boundary::new(IVec3::ZERO, IVec3::ONE);
        let Some(build_chunks) = self.build_chunk_bounds() else {
            return unit;
        };

        let mut lo: Option<IVec3> = None;
        let mut hi: Option<IVec3> = None;
        for chunk_pos in build_chunks.iter_yzx() {
            if !build_chunks.on_border(chunk_pos) {
                continue;
            }
            let Some(chunk) = self.chunks[self.chunk_grid_bound.linearize(chunk_pos)].as_deref()
            else {
                continue;
            };
            let origin = self.chunk_pos_to_pos(chunk_pos);
            if build_chunks.on_min_border(chunk_pos) {
                if let Some(p) = chunk.compute_min_local_pos() {
                    let p = origin + p;
                    lo = Some(lo.map_or(p, |l| l.min(p)));
                }
            }
            if build_chunks.on_max_border(chunk_pos) {
                if let Some(p) = chunk.compute_max_local_pos() {
                    let p = origin + p;
                    hi = Some(hi.map_or(p, |h| h.max(p)));
                }
            }
        }

        match (lo, hi) {
            (Some(lo), Some(hi)) => Boundary::new(lo, hi + IVec3::ONE),
            _ => unit,
        }
    }

    /// Chunk-grid box around every chunk holding a non-default block.
    fn build_chunk_bounds(&self) -> Option<Boundary> {
        let mut positions = self
            .chunks()
            .filter(|(_, c)| !c.can_be_cleaned_up())
            .map(|(p, _)| p);
        let first = positions.next()?;
        let (lo, hi) = positions.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some(Boundary::new(lo, hi + IVec3::ONE))
    }

    // --- Addressing ---

    #[inline]
    pub fn pos_to_chunk_pos(&self, pos: IVec3) -> IVec3 {
        pos >> self.chunk_bit_size as u32
    }

    #[inline]
    pub fn chunk_pos_to_pos(&self, chunk_pos: IVec3) -> IVec3 {
        chunk_pos << self.chunk_bit_size as u32
    }

    #[inline]
    pub(crate) fn pos_to_local(&self, pos: IVec3) -> IVec3 {
        pos & (self.chunk_side_len() - 1)
    }

    #[inline]
    fn chunk_index(&self, pos: IVec3) -> usize {
        self.chunk_grid_bound.linearize(self.pos_to_chunk_pos(pos))
    }

    /// Block-space box of the chunk at `chunk_pos`.
    #[inline]
    pub(crate) fn chunk_block_bound(&self, chunk_pos: IVec3) -> Boundary {
        Boundary::from_origin_dims(
            self.chunk_pos_to_pos(chunk_pos),
            IVec3::splat(self.chunk_side_len()),
        )
    }

    /// Chunk-grid box covering a non-empty block-space box.
    pub(crate) fn pos_bounds_to_chunk_bounds(&self, bounds: &Boundary) -> Boundary {
        Boundary::new(
            self.pos_to_chunk_pos(bounds.low()),
            self.pos_to_chunk_pos(bounds.high() - IVec3::ONE) + IVec3::ONE,
        )
    }

    fn check_pos(&self, pos: IVec3) -> Result<(), VolumeError> {
        if self.loaded_bound.contains(pos) {
            Ok(())
        } else {
            Err(VolumeError::OutOfBounds {
                pos,
                loaded: self.loaded_bound,
            })
        }
    }

    pub(crate) fn check_region(&self, region: &Boundary) -> Result<(), VolumeError> {
        if region.fully_inside(&self.loaded_bound) {
            Ok(())
        } else {
            Err(VolumeError::RegionOutOfBounds {
                region: *region,
                loaded: self.loaded_bound,
            })
        }
    }

    fn check_owner(&self, entry: &VolBlockState) -> Result<(), VolumeError> {
        if entry.owner() == self.id {
            Ok(())
        } else {
            Err(VolumeError::UnregisteredBlock {
                owner: entry.owner(),
                volume: self.id,
            })
        }
    }
}

/// Block-space box of a chunk grid. Fails when it does not fit the `i32`
/// coordinate range, or is wider than `i32::MAX` on some axis.
fn loaded_from_grid(grid: &Boundary, bit_size: u8) -> Result<Boundary, VolumeError> {
    let scale = |c: i32| i64::from(c) << bit_size;
    let fits = Axis::ALL.into_iter().all(|a| {
        let (lo, hi) = (scale(grid.low().get(a)), scale(grid.high().get(a)));
        lo >= i64::from(i32::MIN) && hi <= i64::from(i32::MAX) && hi - lo <= i64::from(i32::MAX)
    });
    if !fits {
        return Err(VolumeError::InvalidConfiguration(format!(
            "chunk grid {grid} with chunk bit size {bit_size} leaves the i32 coordinate range"
        )));
    }
    let bits = bit_size as u32;
    Ok(Boundary::new(grid.low() << bits, grid.high() << bits))
}

/// Converts an element count into a length, rejecting anything past [`MAX_GRID_LEN`].
pub(crate) fn checked_len(len: i64) -> Result<usize, VolumeError> {
    if len > MAX_GRID_LEN as i64 {
        return Err(VolumeError::ArrayTooLarge {
            len,
            max: MAX_GRID_LEN,
        });
    }
    Ok(len.max(0) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loaded_area_rounds_out_to_chunks() {
        let v = Volume::new(IVec3::new(-3, 0, 5), IVec3::new(17, 9, 6), "air", 4).unwrap();
        assert_eq!(v.chunk_grid_bound(), Boundary::new(IVec3::new(-1, 0, 0), IVec3::new(2, 1, 1)));
        assert_eq!(v.loaded_bound(), Boundary::new(IVec3::new(-16, 0, 0), IVec3::new(32, 16, 16)));
        assert_eq!(v.target_bound(), Boundary::new(IVec3::new(-3, 0, 5), IVec3::new(17, 9, 6)));
        assert_eq!(v.chunks.len(), 3);
    }

    #[test]
    fn volume_ids_are_unique() {
        let a = Volume::new(IVec3::ZERO, IVec3::ONE, "air", 1).unwrap();
        let b = Volume::new(IVec3::ZERO, IVec3::ONE, "air", 1).unwrap();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.default_block().owner(), a.id());
    }

    #[test]
    fn chunk_bounds_cover_partial_chunks() {
        let v = Volume::new(IVec3::splat(-64), IVec3::splat(64), "air", 5).unwrap();
        let b = Boundary::new(IVec3::new(-33, 0, 1), IVec3::new(1, 32, 2));
        assert_eq!(
            v.pos_bounds_to_chunk_bounds(&b),
            Boundary::new(IVec3::new(-2, 0, 0), IVec3::new(1, 1, 1))
        );
    }

    #[test]
    fn oversized_grid_is_rejected() {
        assert!(matches!(checked_len(i64::from(i32::MAX)), Err(VolumeError::ArrayTooLarge { .. })));
        assert_eq!(checked_len(0).unwrap(), 0);
    }
}
