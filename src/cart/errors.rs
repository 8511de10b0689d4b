//! Cart errors.

use thiserror::Error;

/// Rejected cart mutations. The cart is left unchanged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Quantities must be at least one.
    #[error("quantity must be at least 1")]
    ZeroQuantity,

    /// Merging would push the quantity past `u32::MAX`.
    #[error("quantity for item {index} would overflow")]
    QuantityOverflow {
        /// Item whose quantity would overflow.
        index: usize,
    },

    /// The customization nests too deeply to be stored and read back.
    #[error("customization nests {depth} levels deep, at most {max} are allowed")]
    CustomizationTooDeep {
        /// Nesting depth of the rejected customization.
        depth: usize,
        /// Deepest nesting accepted.
        max: usize,
    },

    /// No item at this position.
    #[error("no cart item at index {index}, cart has {len} items")]
    OutOfRange {
        /// Requested position.
        index: usize,
        /// Number of items in the cart.
        len: usize,
    },
}
