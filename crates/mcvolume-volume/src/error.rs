use mcvolume_blocks::{BlockStateError, PaletteError, VolumeId};
use mcvolume_chunk::ChunkError;
use mcvolume_geom::{Boundary, IVec3};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VolumeError {
    #[error("position {pos} is outside the loaded area {loaded}")]
    OutOfBounds { pos: IVec3, loaded: Boundary },
    #[error("region {region} is not fully inside the loaded area {loaded}")]
    RegionOutOfBounds { region: Boundary, loaded: Boundary },
    #[error("block belongs to volume {owner:?}, not to volume {volume:?}")]
    UnregisteredBlock { owner: VolumeId, volume: VolumeId },
    #[error("index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("{len} blocks do not fit in one array (max {max})")]
    ArrayTooLarge { len: i64, max: usize },
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("invalid palette: {0}")]
    InvalidPalette(#[source] PaletteError),
    #[error(transparent)]
    Palette(#[from] PaletteError),
    #[error(transparent)]
    BlockState(#[from] BlockStateError),
    #[error(transparent)]
    Chunk(#[from] ChunkError),
    #[error("failed to build bulk worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
