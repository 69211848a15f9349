//! Block states and the per-volume block palette.
#![forbid(unsafe_code)]

pub mod palette;
pub mod state;

// Re-exports for convenience
pub use palette::{
    BlockPaletteMappings, DEFAULT_BLOCK_ID, Palette, PaletteError, PaletteId, PaletteKind,
    VolBlockState, VolumeId,
};
pub use state::{BlockState, BlockStateError, DEFAULT_NAMESPACE, MutBlockState};
