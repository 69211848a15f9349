use std::fs;
use std::path::Path;

use mcvolume_blocks::{BlockState, PaletteKind};
use mcvolume_chunk::{MAX_BIT_SIZE, MIN_BIT_SIZE};
use serde::{Deserialize, Serialize};

use crate::error::VolumeError;

pub const DEFAULT_CHUNK_BIT_SIZE: u8 = 5;
pub const DEFAULT_BLOCK: &str = "minecraft:air";

/// Construction parameters for a [`crate::Volume`].
///
/// ```toml
/// chunk_bit_size = 4
/// default_block = "minecraft:air"
/// palette = "small_list"
/// bulk_threads = 8
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VolumeConfig {
    pub chunk_bit_size: u8,
    pub default_block: String,
    pub palette: PaletteKind,
    /// Thread count used by the `*_default` bulk helpers.
    pub bulk_threads: usize,
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            chunk_bit_size: DEFAULT_CHUNK_BIT_SIZE,
            default_block: DEFAULT_BLOCK.to_string(),
            palette: PaletteKind::Hashed,
            bulk_threads: 1,
        }
    }
}

impl VolumeConfig {
    pub fn from_toml_str(toml_str: &str) -> Result<Self, VolumeError> {
        let cfg: VolumeConfig = toml::from_str(toml_str)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, VolumeError> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    pub fn validate(&self) -> Result<(), VolumeError> {
        check_chunk_bit_size(self.chunk_bit_size)?;
        check_thread_count(self.bulk_threads)?;
        BlockState::parse(&self.default_block)?;
        Ok(())
    }
}

pub(crate) fn check_chunk_bit_size(bits: u8) -> Result<(), VolumeError> {
    if (MIN_BIT_SIZE..=MAX_BIT_SIZE).contains(&bits) {
        Ok(())
    } else {
        Err(VolumeError::InvalidConfiguration(format!(
            "chunk bit size must be between {MIN_BIT_SIZE} and {MAX_BIT_SIZE}, got {bits}"
        )))
    }
}

pub(crate) fn check_thread_count(threads: usize) -> Result<(), VolumeError> {
    if threads == 0 {
        return Err(VolumeError::InvalidConfiguration(
            "thread count must be at least 1".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_take_defaults() {
        let cfg = VolumeConfig::from_toml_str("bulk_threads = 4").unwrap();
        assert_eq!(cfg.bulk_threads, 4);
        assert_eq!(cfg.chunk_bit_size, DEFAULT_CHUNK_BIT_SIZE);
        assert_eq!(cfg.default_block, DEFAULT_BLOCK);
        assert_eq!(cfg.palette, PaletteKind::Hashed);
    }

    #[test]
    fn palette_kind_is_snake_case() {
        let cfg = VolumeConfig::from_toml_str("palette = \"small_list\"").unwrap();
        assert_eq!(cfg.palette, PaletteKind::SmallList);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            VolumeConfig::from_toml_str("chunk_bit_size = 9"),
            Err(VolumeError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            VolumeConfig::from_toml_str("bulk_threads = 0"),
            Err(VolumeError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            VolumeConfig::from_toml_str("default_block = \"stone[axis\""),
            Err(VolumeError::BlockState(_))
        ));
        assert!(matches!(
            VolumeConfig::from_toml_str("chunk_size = 5"),
            Err(VolumeError::Toml(_))
        ));
    }
}
