//! Persistence
//!
//! A cart keeps its line items in a single durable slot. Adapters only move opaque payloads
//! in and out of that slot; encoding lives in [`codec`].

use std::io;

#[cfg(test)]
use mockall::automock;
use thiserror::Error;

pub mod codec;
mod file;
mod memory;

pub use codec::CodecError;
pub use file::FileSlot;
pub use memory::MemorySlot;

/// Errors raised by a durable slot.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The slot could not be read or written.
    #[error("cart slot {slot} is unavailable")]
    Io {
        /// Slot description, for logs.
        slot: String,
        /// Underlying IO failure.
        #[source]
        source: io::Error,
    },

    /// The cart could not be encoded.
    #[error(transparent)]
    Encode(#[from] CodecError),
}

/// A durable key-value slot holding one serialized cart.
#[cfg_attr(test, automock)]
pub trait PersistenceAdapter {
    /// Read the payload stored in the slot, `None` if the slot has never been written.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] if the slot exists but cannot be read.
    fn load(&self) -> Result<Option<String>, PersistenceError>;

    /// Overwrite the slot with `payload`.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] if the slot cannot be written.
    fn store(&mut self, payload: &str) -> Result<(), PersistenceError>;
}
