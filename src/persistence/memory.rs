//! In-memory slot

use super::{PersistenceAdapter, PersistenceError};

/// A slot that lives as long as the value does.
///
/// Handy for tests and throwaway sessions. Take it back out of a cart with
/// [`Cart::into_adapter`](crate::cart::Cart::into_adapter) to reopen the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    payload: Option<String>,
    writes: usize,
}

impl MemorySlot {
    /// An empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot that already holds `payload`.
    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self {
            payload: Some(payload.into()),
            writes: 0,
        }
    }

    /// Current payload.
    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }

    /// Number of writes since the slot was created.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl PersistenceAdapter for MemorySlot {
    fn load(&self) -> Result<Option<String>, PersistenceError> {
        Ok(self.payload.clone())
    }

    fn store(&mut self, payload: &str) -> Result<(), PersistenceError> {
        self.payload = Some(payload.to_string());
        self.writes += 1;

        Ok(())
    }
}
