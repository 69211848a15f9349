use std::collections::BTreeMap;
use std::ops::Index;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::BlockState;

pub type PaletteId = u16;

/// Palette slot of the owning volume's default block.
pub const DEFAULT_BLOCK_ID: PaletteId = 0;

/// Unlinked `id -> state` table, the form palettes take outside a volume
/// (bulk grids, serializers).
pub type BlockPaletteMappings = BTreeMap<PaletteId, BlockState>;

const CAPACITY: usize = PaletteId::MAX as usize + 1;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaletteError {
    #[error("palette id {id} out of range (palette has {len} entries)")]
    IndexOutOfRange { id: usize, len: usize },
    #[error("palette is full ({capacity} entries)")]
    Full { capacity: usize },
    #[error("invalid palette: mappings are empty")]
    EmptyMappings,
    #[error("invalid palette: max id is {max_id} but id {missing} is unmapped")]
    MappingGap { max_id: PaletteId, missing: PaletteId },
    #[error("invalid palette: id {id} repeats the state already mapped by id {first}")]
    DuplicateState { id: PaletteId, first: PaletteId },
}

/// Identity of the volume a palette (and every entry it hands out) belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VolumeId(u64);

impl VolumeId {
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// A palette entry: the state, its id, and the volume the id is valid in.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VolBlockState {
    owner: VolumeId,
    id: PaletteId,
    state: BlockState,
}

impl VolBlockState {
    #[inline]
    pub fn owner(&self) -> VolumeId {
        self.owner
    }

    #[inline]
    pub fn id(&self) -> PaletteId {
        self.id
    }

    #[inline]
    pub fn state(&self) -> &BlockState {
        &self.state
    }

    #[inline]
    pub fn is_default(&self) -> bool {
        self.id == DEFAULT_BLOCK_ID
    }

    /// Compares palette ids only.
    #[inline]
    pub fn same_id(&self, other: &VolBlockState) -> bool {
        self.id == other.id
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteKind {
    /// Hash lookup from state to id.
    #[default]
    Hashed,
    /// Linear scan; fine for volumes with a handful of distinct blocks.
    SmallList,
}

#[derive(Clone, Debug)]
enum Lookup {
    Hashed(HashMap<BlockState, PaletteId>),
    SmallList,
}

/// Deduplicating `BlockState <-> id` table owned by one volume.
///
/// Ids are dense, handed out in insertion order and never recycled. Id 0 is
/// always the default block the palette was created with.
#[derive(Clone, Debug)]
pub struct Palette {
    owner: VolumeId,
    entries: Vec<VolBlockState>,
    lookup: Lookup,
}

impl Palette {
    pub fn new(owner: VolumeId, default_state: BlockState, kind: PaletteKind) -> Self {
        let mut palette = Self {
            owner,
            entries: Vec::new(),
            lookup: Lookup::empty(kind),
        };
        palette.push(default_state);
        palette
    }

    /// Rebuilds a palette from an unlinked table and stamps every entry with `owner`.
    /// The table must be dense from zero and map each state once.
    pub fn from_unlinked_mappings(
        mappings: &BlockPaletteMappings,
        owner: VolumeId,
        kind: PaletteKind,
    ) -> Result<Self, PaletteError> {
        check_dense(mappings)?;
        let mut palette = Self {
            owner,
            entries: Vec::with_capacity(mappings.len()),
            lookup: Lookup::empty(kind),
        };
        for (&id, state) in mappings {
            if let Some(first) = palette.get(state) {
                return Err(PaletteError::DuplicateState {
                    id,
                    first: first.id,
                });
            }
            palette.push(state.clone());
        }
        Ok(palette)
    }

    #[inline]
    pub fn owner(&self) -> VolumeId {
        self.owner
    }

    pub fn kind(&self) -> PaletteKind {
        match self.lookup {
            Lookup::Hashed(_) => PaletteKind::Hashed,
            Lookup::SmallList => PaletteKind::SmallList,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true for a constructed palette; kept for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of ids still available.
    #[inline]
    pub fn remaining_capacity(&self) -> usize {
        CAPACITY - self.entries.len()
    }

    #[inline]
    pub fn default_entry(&self) -> &VolBlockState {
        &self.entries[DEFAULT_BLOCK_ID as usize]
    }

    pub fn get(&self, state: &BlockState) -> Option<&VolBlockState> {
        let id = match &self.lookup {
            Lookup::Hashed(map) => *map.get(state)?,
            Lookup::SmallList => return self.entries.iter().find(|e| &e.state == state),
        };
        Some(&self.entries[id as usize])
    }

    /// Existing entry for `state`, or a new one with the next id.
    pub fn get_or_add(&mut self, state: &BlockState) -> Result<VolBlockState, PaletteError> {
        if let Some(e) = self.get(state) {
            return Ok(e.clone());
        }
        if self.entries.len() >= CAPACITY {
            return Err(PaletteError::Full { capacity: CAPACITY });
        }
        Ok(self.push(state.clone()).clone())
    }

    pub fn from_id(&self, id: PaletteId) -> Result<&VolBlockState, PaletteError> {
        self.entries
            .get(id as usize)
            .ok_or(PaletteError::IndexOutOfRange {
                id: id as usize,
                len: self.entries.len(),
            })
    }

    /// Entries in id order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &VolBlockState> + '_ {
        self.entries.iter()
    }

    pub fn to_unlinked_mappings(&self) -> BlockPaletteMappings {
        self.entries
            .iter()
            .map(|e| (e.id, e.state.clone()))
            .collect()
    }

    /// Restamps every entry for a new owner. Entries handed out before the
    /// relink keep the old stamp and are rejected by the new owner.
    pub fn relink(&mut self, owner: VolumeId) {
        self.owner = owner;
        for e in &mut self.entries {
            e.owner = owner;
        }
    }

    fn push(&mut self, state: BlockState) -> &VolBlockState {
        let id = self.entries.len() as PaletteId;
        if let Lookup::Hashed(map) = &mut self.lookup {
            map.insert(state.clone(), id);
        }
        self.entries.push(VolBlockState {
            owner: self.owner,
            id,
            state,
        });
        &self.entries[id as usize]
    }
}

/// Panics on an unknown id; use [`Palette::from_id`] for untrusted ids.
impl Index<PaletteId> for Palette {
    type Output = VolBlockState;

    #[inline]
    fn index(&self, id: PaletteId) -> &VolBlockState {
        &self.entries[id as usize]
    }
}

impl Lookup {
    fn empty(kind: PaletteKind) -> Self {
        match kind {
            PaletteKind::Hashed => Lookup::Hashed(HashMap::new()),
            PaletteKind::SmallList => Lookup::SmallList,
        }
    }
}

/// Checks that `mappings` is non-empty and has no gaps below its max id.
pub fn check_dense(mappings: &BlockPaletteMappings) -> Result<(), PaletteError> {
    let Some((&max_id, _)) = mappings.last_key_value() else {
        return Err(PaletteError::EmptyMappings);
    };
    if mappings.len() != max_id as usize + 1 {
        let missing = (0..=max_id)
            .zip(mappings.keys())
            .find(|(expect, got)| expect != *got)
            .map(|(expect, _)| expect)
            .unwrap_or(max_id);
        return Err(PaletteError::MappingGap { max_id, missing });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn st(s: &str) -> BlockState {
        BlockState::parse(s).unwrap()
    }

    #[test]
    fn check_dense_finds_first_gap() {
        let m = BlockPaletteMappings::from([(0, st("air")), (1, st("stone")), (3, st("dirt"))]);
        assert_eq!(
            check_dense(&m),
            Err(PaletteError::MappingGap { max_id: 3, missing: 2 })
        );
        assert_eq!(check_dense(&BlockPaletteMappings::new()), Err(PaletteError::EmptyMappings));
    }

    #[test]
    fn small_list_and_hashed_agree() {
        let owner = VolumeId::new(7);
        let mut a = Palette::new(owner, st("air"), PaletteKind::Hashed);
        let mut b = Palette::new(owner, st("air"), PaletteKind::SmallList);
        for s in ["stone", "dirt", "stone", "oak_log[axis=y]", "air"] {
            let ea = a.get_or_add(&st(s)).unwrap();
            let eb = b.get_or_add(&st(s)).unwrap();
            assert_eq!(ea, eb);
        }
        assert_eq!(a.len(), 4);
        assert_eq!(a.to_unlinked_mappings(), b.to_unlinked_mappings());
    }
}
