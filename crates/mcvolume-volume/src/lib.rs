//! Sparse chunked block volume: palette-compressed storage, resizable
//! loaded area and multi-threaded bulk transfer between volumes.
#![forbid(unsafe_code)]

mod bulk;
mod config;
mod error;
mod volume;
mod workers;

pub use bulk::BlockGrid;
pub use config::{DEFAULT_BLOCK, DEFAULT_CHUNK_BIT_SIZE, VolumeConfig};
pub use error::VolumeError;
pub use volume::{MAX_GRID_LEN, Volume, VolumeParts};
pub use workers::distribute_range;
