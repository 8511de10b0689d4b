//! Cart
//!
//! [`Cart`] owns the authoritative list of line items for one session. Every successful
//! mutation re-serializes the whole list into the cart's durable slot. When the slot cannot
//! be written the cart keeps working in memory and records the failure.

use std::num::NonZeroU32;

use tracing::{debug, info, warn};

use crate::{
    items::{LineItem, LineKey, MAX_CUSTOMIZATION_DEPTH, Selection},
    persistence::{PersistenceAdapter, PersistenceError, codec},
    pricing::{CartTotals, PricingPolicy, calculate_totals},
    products::Product,
};

pub mod errors;
pub mod observer;

pub use errors::ValidationError;
pub use observer::{CartEvent, CartObserver, NoopObserver};

/// Observable lifecycle state of a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartState {
    /// No line items.
    Empty,

    /// At least one line item.
    NonEmpty,
}

/// What [`Cart::add_item`] did with a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new row was appended.
    Appended {
        /// Position of the new row.
        index: usize,
    },

    /// An existing row with the same identity key absorbed the quantity.
    Merged {
        /// Position of the existing row.
        index: usize,
        /// Quantity after the merge.
        quantity: u32,
    },
}

/// A session's cart.
#[derive(Debug)]
pub struct Cart<A, O = NoopObserver> {
    items: Vec<LineItem>,
    policy: PricingPolicy,
    slot: A,
    observer: O,
    persistence_error: Option<PersistenceError>,
}

impl<A: PersistenceAdapter> Cart<A> {
    /// Open the cart stored in `slot`.
    ///
    /// A missing, unreadable or malformed slot opens as an empty cart.
    pub fn open(slot: A, policy: PricingPolicy) -> Self {
        Self::open_with_observer(slot, policy, NoopObserver)
    }
}

impl<A: PersistenceAdapter, O: CartObserver> Cart<A, O> {
    /// Open the cart stored in `slot`, reporting mutations to `observer`.
    pub fn open_with_observer(slot: A, policy: PricingPolicy, observer: O) -> Self {
        let mut persistence_error = None;

        let items = match slot.load() {
            Ok(Some(payload)) => match codec::decode(&payload) {
                Ok(items) => {
                    info!(items = items.len(), "restored cart");
                    items
                }
                Err(error) => {
                    warn!(%error, "discarding malformed cart");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(error) => {
                warn!(%error, "cart slot unreadable, starting empty");
                persistence_error = Some(error);
                Vec::new()
            }
        };

        Self {
            items,
            policy,
            slot,
            observer,
            persistence_error,
        }
    }

    /// Add `quantity` of `product` with the given variant selection.
    ///
    /// A row with the same product, size, color and customization absorbs the quantity;
    /// otherwise a new row is appended. Stock is not checked here, see
    /// [`Product::check_selection`].
    ///
    /// # Errors
    ///
    /// - [`ValidationError::ZeroQuantity`]: `quantity` is zero.
    /// - [`ValidationError::CustomizationTooDeep`]: the customization nests deeper than
    ///   [`MAX_CUSTOMIZATION_DEPTH`].
    /// - [`ValidationError::QuantityOverflow`]: the merged quantity would not fit in a `u32`.
    #[tracing::instrument(
        level = "debug",
        skip(self, product, selection),
        fields(product_id = %product.id())
    )]
    pub fn add_item(
        &mut self,
        product: Product,
        quantity: u32,
        selection: Selection,
    ) -> Result<AddOutcome, ValidationError> {
        let quantity = NonZeroU32::new(quantity).ok_or(ValidationError::ZeroQuantity)?;
        check_depth(&selection)?;
        let key = LineKey::new(&product, &selection);

        let existing = self
            .items
            .iter_mut()
            .enumerate()
            .find(|(_, item)| item.key() == key);

        let outcome = if let Some((index, item)) = existing {
            let merged = item
                .checked_increase(quantity)
                .ok_or(ValidationError::QuantityOverflow { index })?;

            AddOutcome::Merged {
                index,
                quantity: merged.get(),
            }
        } else {
            self.items.push(LineItem::new(product, quantity, selection));

            AddOutcome::Appended {
                index: self.items.len() - 1,
            }
        };

        debug!(?outcome, "added item");

        self.commit(match outcome {
            AddOutcome::Appended { index } => CartEvent::ItemAdded { index },
            AddOutcome::Merged { index, quantity } => CartEvent::ItemMerged { index, quantity },
        });

        Ok(outcome)
    }

    /// Replace the quantity and selection of the item at `index`. The product snapshot is
    /// kept.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::ZeroQuantity`]: `quantity` is zero.
    /// - [`ValidationError::CustomizationTooDeep`]: the customization nests deeper than
    ///   [`MAX_CUSTOMIZATION_DEPTH`].
    /// - [`ValidationError::OutOfRange`]: there is no item at `index`.
    #[tracing::instrument(level = "debug", skip(self, selection))]
    pub fn update_item(
        &mut self,
        index: usize,
        quantity: u32,
        selection: Selection,
    ) -> Result<(), ValidationError> {
        let quantity = NonZeroU32::new(quantity).ok_or(ValidationError::ZeroQuantity)?;
        check_depth(&selection)?;
        let len = self.items.len();

        self.items
            .get_mut(index)
            .ok_or(ValidationError::OutOfRange { index, len })?
            .replace(quantity, selection);

        self.commit(CartEvent::ItemUpdated { index });

        Ok(())
    }

    /// Remove and return the item at `index`. Later items move down one position, so
    /// indices taken before the call are stale afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::OutOfRange`] if there is no item at `index`.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn remove_item(&mut self, index: usize) -> Result<LineItem, ValidationError> {
        if index >= self.items.len() {
            return Err(ValidationError::OutOfRange {
                index,
                len: self.items.len(),
            });
        }

        let removed = self.items.remove(index);

        self.commit(CartEvent::ItemRemoved { index });

        Ok(removed)
    }

    /// Remove every item and persist the empty cart.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn clear(&mut self) {
        self.items.clear();

        self.commit(CartEvent::Cleared);
    }

    /// Current totals. Pure; calling it repeatedly gives the same answer.
    pub fn totals(&self) -> CartTotals {
        calculate_totals(&self.items, &self.policy)
    }

    /// Line items in display order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Line item at `index`.
    pub fn get(&self, index: usize) -> Option<&LineItem> {
        self.items.get(index)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no rows.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities across all rows.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity())).sum()
    }

    /// Empty or not.
    pub fn state(&self) -> CartState {
        if self.items.is_empty() {
            CartState::Empty
        } else {
            CartState::NonEmpty
        }
    }

    /// Pricing policy totals are calculated with.
    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    /// Observer receiving this cart's events.
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// The most recent persistence failure, cleared by the next successful write.
    pub fn last_persistence_error(&self) -> Option<&PersistenceError> {
        self.persistence_error.as_ref()
    }

    /// Whether the last read or write of the slot succeeded.
    pub fn is_durable(&self) -> bool {
        self.persistence_error.is_none()
    }

    /// End the session and hand back the slot.
    pub fn into_adapter(self) -> A {
        self.slot
    }

    fn commit(&mut self, event: CartEvent) {
        self.persist();
        self.observer.on_event(event);
    }

    fn persist(&mut self) {
        let result = codec::encode(&self.items)
            .map_err(PersistenceError::from)
            .and_then(|payload| self.slot.store(&payload));

        match result {
            Ok(()) => self.persistence_error = None,
            Err(error) => {
                warn!(%error, "cart not persisted; continuing in memory");
                self.persistence_error = Some(error);
            }
        }
    }
}

fn check_depth(selection: &Selection) -> Result<(), ValidationError> {
    let depth = selection.customization_depth();

    if depth > MAX_CUSTOMIZATION_DEPTH {
        return Err(ValidationError::CustomizationTooDeep {
            depth,
            max: MAX_CUSTOMIZATION_DEPTH,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io;

    use rust_decimal::Decimal;
    use rusty_money::{Money, iso::USD};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use crate::persistence::{MemorySlot, MockPersistenceAdapter};

    use super::*;

    fn tee() -> TestResult<Product> {
        Ok(Product::new("tee", "Basic Tee", Decimal::from(60))?
            .with_stock(10)
            .with_sizes(["M", "L"]))
    }

    fn mug() -> TestResult<Product> {
        Ok(Product::new("mug", "Mug", Decimal::from(50))?.with_discount(Decimal::TEN)?)
    }

    fn medium() -> Selection {
        Selection::variant(Some("M"), Some("Sienna"))
    }

    fn unavailable(reason: &str) -> PersistenceError {
        PersistenceError::Io {
            slot: "mock".to_string(),
            source: io::Error::other(reason.to_string()),
        }
    }

    fn nested(depth: usize) -> Value {
        (1..depth).fold(json!([]), |inner, _| Value::Array(vec![inner]))
    }

    fn empty_cart() -> Cart<MemorySlot, Vec<CartEvent>> {
        Cart::open_with_observer(MemorySlot::new(), PricingPolicy::default(), Vec::new())
    }

    #[test]
    fn new_cart_is_empty() {
        let cart = Cart::open(MemorySlot::new(), PricingPolicy::default());

        assert_eq!(cart.state(), CartState::Empty);
        assert!(cart.is_empty());
        assert!(cart.is_durable());
    }

    #[test]
    fn add_moves_cart_to_non_empty_and_persists() -> TestResult {
        let mut cart = empty_cart();

        let outcome = cart.add_item(tee()?, 1, medium())?;

        assert_eq!(outcome, AddOutcome::Appended { index: 0 });
        assert_eq!(cart.state(), CartState::NonEmpty);
        assert_eq!(cart.into_adapter().writes(), 1);

        Ok(())
    }

    #[test]
    fn adding_same_selection_merges_quantities() -> TestResult {
        let mut cart = empty_cart();

        cart.add_item(tee()?, 2, medium())?;
        let outcome = cart.add_item(tee()?, 3, medium())?;

        assert_eq!(outcome, AddOutcome::Merged { index: 0, quantity: 5 });
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(0).map(LineItem::quantity), Some(5));

        Ok(())
    }

    #[test]
    fn different_variants_get_their_own_rows() -> TestResult {
        let mut cart = empty_cart();

        cart.add_item(tee()?, 1, medium())?;
        cart.add_item(tee()?, 1, Selection::variant(Some("L"), Some("Sienna")))?;
        cart.add_item(tee()?, 1, Selection::variant(Some("M"), Some("Black")))?;

        assert_eq!(cart.len(), 3);
        assert_eq!(cart.item_count(), 3);

        Ok(())
    }

    #[test]
    fn customization_is_part_of_identity() -> TestResult {
        let mut cart = empty_cart();
        let printed = medium().with_customization(json!({"text": "hello"}));

        cart.add_item(tee()?, 1, printed.clone())?;
        cart.add_item(tee()?, 1, medium())?;
        let outcome = cart.add_item(tee()?, 1, printed)?;

        assert_eq!(cart.len(), 2);
        assert_eq!(outcome, AddOutcome::Merged { index: 0, quantity: 2 });

        Ok(())
    }

    #[test]
    fn customization_numbers_merge_by_value() -> TestResult {
        let mut cart = empty_cart();

        cart.add_item(tee()?, 1, medium().with_customization(json!({"w": 1})))?;
        let outcome = cart.add_item(tee()?, 2, medium().with_customization(json!({"w": 1.0})))?;

        assert_eq!(outcome, AddOutcome::Merged { index: 0, quantity: 3 });
        assert_eq!(cart.len(), 1);

        Ok(())
    }

    #[test]
    fn overly_nested_customization_is_rejected() -> TestResult {
        let mut cart = empty_cart();
        let too_deep = medium().with_customization(nested(127));

        assert_eq!(
            cart.add_item(tee()?, 1, too_deep.clone()),
            Err(ValidationError::CustomizationTooDeep {
                depth: 127,
                max: MAX_CUSTOMIZATION_DEPTH
            })
        );
        assert!(cart.is_empty());

        cart.add_item(tee()?, 1, medium())?;

        assert_eq!(
            cart.update_item(0, 1, too_deep),
            Err(ValidationError::CustomizationTooDeep {
                depth: 127,
                max: MAX_CUSTOMIZATION_DEPTH
            })
        );
        assert_eq!(cart.get(0).and_then(LineItem::customization), None);
        assert_eq!(cart.into_adapter().writes(), 1);

        Ok(())
    }

    #[test]
    fn deepest_allowed_customization_survives_reopening() -> TestResult {
        let mut cart = Cart::open(MemorySlot::new(), PricingPolicy::default());
        let deepest = medium().with_customization(nested(MAX_CUSTOMIZATION_DEPTH));

        cart.add_item(tee()?, 1, deepest)?;

        let before = cart.items().to_vec();
        let reopened = Cart::open(cart.into_adapter(), PricingPolicy::default());

        assert_eq!(reopened.items(), before.as_slice());
        assert!(reopened.is_durable());

        Ok(())
    }

    #[test]
    fn merge_keeps_first_product_snapshot() -> TestResult {
        let mut cart = empty_cart();
        let repriced = Product::new("tee", "Basic Tee", Decimal::from(75))?;

        cart.add_item(tee()?, 1, medium())?;
        cart.add_item(repriced, 1, medium())?;

        let price = cart.get(0).map(|item| item.product().price());

        assert_eq!(price, Some(Decimal::from(60)));

        Ok(())
    }

    #[test]
    fn zero_quantity_is_rejected_without_change() -> TestResult {
        let mut cart = empty_cart();

        let result = cart.add_item(tee()?, 0, medium());

        assert_eq!(result, Err(ValidationError::ZeroQuantity));
        assert!(cart.is_empty());
        assert!(cart.observer().is_empty());

        let slot = cart.into_adapter();
        assert_eq!(slot.writes(), 0);

        Ok(())
    }

    #[test]
    fn merge_overflow_is_rejected() -> TestResult {
        let mut cart = empty_cart();

        cart.add_item(tee()?, u32::MAX, medium())?;
        let result = cart.add_item(tee()?, 1, medium());

        assert_eq!(result, Err(ValidationError::QuantityOverflow { index: 0 }));
        assert_eq!(cart.get(0).map(LineItem::quantity), Some(u32::MAX));

        Ok(())
    }

    #[test]
    fn update_replaces_selection_and_keeps_product() -> TestResult {
        let mut cart = empty_cart();
        cart.add_item(tee()?, 1, medium())?;

        cart.update_item(0, 4, Selection::variant(Some("L"), None))?;

        let item = cart.get(0).ok_or("missing item")?;

        assert_eq!(item.quantity(), 4);
        assert_eq!(item.size(), Some("L"));
        assert_eq!(item.color(), None);
        assert_eq!(item.product().id().as_str(), "tee");

        Ok(())
    }

    #[test]
    fn update_out_of_range_is_rejected() -> TestResult {
        let mut cart = empty_cart();
        cart.add_item(tee()?, 1, medium())?;

        let result = cart.update_item(1, 2, medium());

        assert_eq!(result, Err(ValidationError::OutOfRange { index: 1, len: 1 }));
        assert_eq!(cart.get(0).map(LineItem::quantity), Some(1));

        Ok(())
    }

    #[test]
    fn update_with_zero_quantity_is_rejected() -> TestResult {
        let mut cart = empty_cart();
        cart.add_item(tee()?, 2, medium())?;

        assert_eq!(
            cart.update_item(0, 0, medium()),
            Err(ValidationError::ZeroQuantity)
        );
        assert_eq!(cart.get(0).map(LineItem::quantity), Some(2));

        Ok(())
    }

    #[test]
    fn remove_reindexes_remaining_items() -> TestResult {
        let mut cart = empty_cart();
        cart.add_item(tee()?, 1, medium())?;
        cart.add_item(mug()?, 1, Selection::default())?;

        let removed = cart.remove_item(0)?;

        assert_eq!(removed.product().id().as_str(), "tee");
        assert_eq!(cart.get(0).map(|item| item.product().id().as_str()), Some("mug"));

        Ok(())
    }

    #[test]
    fn removing_last_item_returns_to_empty() -> TestResult {
        let mut cart = empty_cart();
        cart.add_item(mug()?, 1, Selection::default())?;

        cart.remove_item(0)?;

        let totals = cart.totals();

        assert_eq!(cart.state(), CartState::Empty);
        assert_eq!(totals.subtotal(), Money::from_minor(0, USD));
        assert_eq!(totals.shipping(), Money::from_minor(10_00, USD));
        assert_eq!(totals.total(), Money::from_minor(10_00, USD));

        Ok(())
    }

    #[test]
    fn removing_twice_at_stale_index_is_an_error() -> TestResult {
        let mut cart = empty_cart();
        cart.add_item(tee()?, 1, medium())?;
        cart.add_item(mug()?, 1, Selection::default())?;

        cart.remove_item(1)?;
        let result = cart.remove_item(1);

        assert_eq!(result.err(), Some(ValidationError::OutOfRange { index: 1, len: 1 }));
        assert_eq!(cart.get(0).map(|item| item.product().id().as_str()), Some("tee"));

        Ok(())
    }

    #[test]
    fn clear_empties_and_persists() -> TestResult {
        let mut cart = empty_cart();
        cart.add_item(tee()?, 1, medium())?;

        cart.clear();

        assert_eq!(cart.state(), CartState::Empty);
        assert_eq!(cart.into_adapter().payload(), Some("[]"));

        Ok(())
    }

    #[test]
    fn events_follow_mutations() -> TestResult {
        let mut cart = empty_cart();

        cart.add_item(tee()?, 1, medium())?;
        cart.add_item(tee()?, 1, medium())?;
        cart.update_item(0, 3, medium())?;
        cart.remove_item(0)?;
        cart.clear();

        assert_eq!(
            cart.observer(),
            &vec![
                CartEvent::ItemAdded { index: 0 },
                CartEvent::ItemMerged { index: 0, quantity: 2 },
                CartEvent::ItemUpdated { index: 0 },
                CartEvent::ItemRemoved { index: 0 },
                CartEvent::Cleared,
            ]
        );

        Ok(())
    }

    #[test]
    fn totals_follow_mutations() -> TestResult {
        let mut cart = empty_cart();

        cart.add_item(tee()?, 2, medium())?;

        assert_eq!(cart.totals().total(), Money::from_minor(132_00, USD));

        cart.update_item(0, 1, medium())?;

        assert_eq!(cart.totals().total(), Money::from_minor(76_00, USD));
        assert_eq!(cart.totals(), cart.totals());

        Ok(())
    }

    #[test]
    fn reopening_slot_restores_items() -> TestResult {
        let mut cart = empty_cart();
        cart.add_item(tee()?, 2, medium())?;
        cart.add_item(mug()?, 1, Selection::default().with_customization(json!([1, 2])))?;
        let items = cart.items().to_vec();

        let reopened = Cart::open(cart.into_adapter(), PricingPolicy::default());

        assert_eq!(reopened.items(), items.as_slice());

        Ok(())
    }

    #[test]
    fn malformed_slot_opens_empty() {
        let cart = Cart::open(
            MemorySlot::with_payload("{\"oops\":"),
            PricingPolicy::default(),
        );

        assert!(cart.is_empty());
    }

    #[test]
    fn unreadable_slot_opens_empty_and_not_durable() {
        let mut slot = MockPersistenceAdapter::new();
        slot.expect_load().returning(|| Err(unavailable("locked")));

        let cart = Cart::open(slot, PricingPolicy::default());

        assert!(cart.is_empty());
        assert!(!cart.is_durable());
    }

    #[test]
    fn write_failure_keeps_cart_usable() -> TestResult {
        let mut slot = MockPersistenceAdapter::new();
        slot.expect_load().returning(|| Ok(None));
        slot.expect_store()
            .times(2)
            .returning(|_| Err(unavailable("quota exceeded")));

        let mut cart = Cart::open(slot, PricingPolicy::default());

        cart.add_item(tee()?, 1, medium())?;
        cart.add_item(mug()?, 1, Selection::default())?;

        assert_eq!(cart.len(), 2);
        assert!(!cart.is_durable());
        assert!(matches!(
            cart.last_persistence_error(),
            Some(PersistenceError::Io { .. })
        ));

        Ok(())
    }

    #[test]
    fn successful_write_restores_durability() -> TestResult {
        let mut slot = MockPersistenceAdapter::new();
        let mut calls = 0;
        slot.expect_load().returning(|| Ok(None));
        slot.expect_store().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(unavailable("busy"))
            } else {
                Ok(())
            }
        });

        let mut cart = Cart::open(slot, PricingPolicy::default());

        cart.add_item(tee()?, 1, medium())?;
        assert!(!cart.is_durable());

        cart.add_item(tee()?, 1, medium())?;
        assert!(cart.is_durable());

        Ok(())
    }

    #[test]
    fn each_write_carries_full_item_list() -> TestResult {
        let mut cart = empty_cart();

        cart.add_item(tee()?, 1, medium())?;
        cart.add_item(mug()?, 1, Selection::default())?;

        let slot = cart.into_adapter();
        let stored = codec::decode(slot.payload().ok_or("slot is empty")?)?;

        assert_eq!(slot.writes(), 2);
        assert_eq!(stored.len(), 2);

        Ok(())
    }
}
