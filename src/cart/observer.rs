//! Cart Observer

/// A change that was applied to a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartEvent {
    /// A new row was appended at `index`.
    ItemAdded {
        /// Position of the new row.
        index: usize,
    },

    /// A selection matched an existing row and its quantity grew.
    ItemMerged {
        /// Position of the merged row.
        index: usize,
        /// Quantity after the merge.
        quantity: u32,
    },

    /// The row at `index` was replaced.
    ItemUpdated {
        /// Position of the replaced row.
        index: usize,
    },

    /// The row at `index` was removed; later rows shifted down.
    ItemRemoved {
        /// Former position of the row.
        index: usize,
    },

    /// Every row was removed.
    Cleared,
}

/// Receives notifications after each successful cart mutation.
///
/// Presentation code hooks in here to show "added to cart" style messages. Events are
/// delivered after the change is applied and persisted.
pub trait CartObserver {
    /// Called once per successful mutation.
    fn on_event(&mut self, event: CartEvent);
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl CartObserver for NoopObserver {
    fn on_event(&mut self, _event: CartEvent) {}
}

impl CartObserver for Vec<CartEvent> {
    fn on_event(&mut self, event: CartEvent) {
        self.push(event);
    }
}
