//! Storage & Catalog Config

use std::path::PathBuf;

use clap::Args;

use crate::persistence::FileSlot;

use super::ConfigError;

/// Where carts are kept between runs.
#[derive(Debug, Clone, Args)]
pub struct StorageConfig {
    /// Directory holding one JSON file per cart slot
    #[arg(long, env = "CART_DATA_DIR", default_value = ".carts")]
    pub data_dir: PathBuf,

    /// Slot name for this session or device
    #[arg(long, env = "CART_SLOT", default_value = "guest")]
    pub slot: String,
}

impl StorageConfig {
    /// The file slot these settings point at.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSlot`] for an empty slot name or one that would escape
    /// the data directory.
    pub fn file_slot(&self) -> Result<FileSlot, ConfigError> {
        let name = self.slot.trim();

        if name.is_empty()
            || name.starts_with('.')
            || name.contains(|c: char| matches!(c, '/' | '\\'))
        {
            return Err(ConfigError::InvalidSlot(self.slot.clone()));
        }

        Ok(FileSlot::new(&self.data_dir, name))
    }
}

/// Product catalog settings.
#[derive(Debug, Clone, Args)]
pub struct CatalogConfig {
    /// YAML product catalog
    #[arg(long, env = "CART_CATALOG", default_value = "fixtures/catalog.yml")]
    pub catalog: PathBuf,
}
