//! Configuration
//!
//! Settings are `clap` argument groups with environment fallbacks. The binary flattens
//! them into its command line and loads a `.env` file first.

use thiserror::Error;

use crate::pricing::PolicyError;

mod observability;
mod pricing;
mod storage;

pub use observability::{LogFormat, LoggingConfig};
pub use pricing::{PricingConfig, parse_currency, parse_percentage};
pub use storage::{CatalogConfig, StorageConfig};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid percentage format
    #[error("invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Slot names become file names and cannot contain path separators.
    #[error("invalid cart slot name: {0:?}")]
    InvalidSlot(String),

    /// The pricing settings do not form a valid policy.
    #[error(transparent)]
    Policy(#[from] PolicyError),
}
