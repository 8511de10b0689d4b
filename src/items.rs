//! Items

use std::{cmp::Ordering, num::NonZeroU32};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::products::{Product, ProductId};

/// Deepest customization nesting a cart accepts.
///
/// A stored cart wraps each customization in two more levels, and must stay well inside
/// the parser's recursion limit to be read back.
pub const MAX_CUSTOMIZATION_DEPTH: usize = 64;

/// Variant attributes chosen alongside a product.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Selected size, if any.
    pub size: Option<String>,

    /// Selected color name, if any.
    pub color: Option<String>,

    /// Opaque customization payload (e.g. custom print data).
    pub customization: Option<Value>,
}

impl Selection {
    /// Selection with a size and color and no customization.
    pub fn variant(size: Option<&str>, color: Option<&str>) -> Self {
        Self {
            size: size.map(str::to_string),
            color: color.map(str::to_string),
            customization: None,
        }
    }

    /// Attach a customization payload.
    #[must_use]
    pub fn with_customization(mut self, customization: Value) -> Self {
        self.customization = Some(customization);
        self
    }

    /// Nesting depth of the customization: 0 for none or a scalar, 1 for a flat array or
    /// object.
    pub fn customization_depth(&self) -> usize {
        self.customization.as_ref().map_or(0, nesting_depth)
    }
}

/// The tuple deciding whether two selections share a cart row.
///
/// Customizations compare by deep equality. A `null` customization is the same as none, and
/// numbers compare by value, so `1` and `1.0` are the same.
#[derive(Debug, Clone, Copy)]
pub struct LineKey<'a> {
    /// Product identifier.
    pub product: &'a ProductId,
    /// Selected size.
    pub size: Option<&'a str>,
    /// Selected color.
    pub color: Option<&'a str>,
    /// Customization payload.
    pub customization: Option<&'a Value>,
}

impl<'a> LineKey<'a> {
    /// Key for a product and selection that is not in a cart yet.
    pub fn new(product: &'a Product, selection: &'a Selection) -> Self {
        Self {
            product: product.id(),
            size: selection.size.as_deref(),
            color: selection.color.as_deref(),
            customization: selection.customization.as_ref().filter(|value| !value.is_null()),
        }
    }
}

impl PartialEq for LineKey<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.product == other.product
            && self.size == other.size
            && self.color == other.color
            && match (self.customization, other.customization) {
                (Some(left), Some(right)) => same_json(left, right),
                (None, None) => true,
                _ => false,
            }
    }
}

fn same_json(left: &Value, right: &Value) -> bool {
    let mut pending = vec![(left, right)];

    while let Some((left, right)) = pending.pop() {
        match (left, right) {
            (Value::Number(left), Value::Number(right)) => {
                if !same_number(left, right) {
                    return false;
                }
            }
            (Value::Array(left), Value::Array(right)) => {
                if left.len() != right.len() {
                    return false;
                }

                pending.extend(left.iter().zip(right));
            }
            (Value::Object(left), Value::Object(right)) => {
                if left.len() != right.len() {
                    return false;
                }

                for (key, value) in left {
                    let Some(other) = right.get(key) else {
                        return false;
                    };

                    pending.push((value, other));
                }
            }
            _ => {
                if left != right {
                    return false;
                }
            }
        }
    }

    true
}

fn same_number(left: &Number, right: &Number) -> bool {
    left == right
        || matches!(
            (left.as_f64(), right.as_f64()),
            (Some(left), Some(right)) if left.partial_cmp(&right) == Some(Ordering::Equal)
        )
}

fn nesting_depth(value: &Value) -> usize {
    let mut deepest = 0;
    let mut pending = vec![(value, 1)];

    while let Some((value, depth)) = pending.pop() {
        match value {
            Value::Array(values) => {
                deepest = deepest.max(depth);
                pending.extend(values.iter().map(|value| (value, depth + 1)));
            }
            Value::Object(map) => {
                deepest = deepest.max(depth);
                pending.extend(map.values().map(|value| (value, depth + 1)));
            }
            _ => {}
        }
    }

    deepest
}

/// One product selection, with its quantity, in a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    product: Product,
    quantity: NonZeroU32,
    #[serde(default)]
    size: Option<String>,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    customization: Option<Value>,
}

impl LineItem {
    /// Create a line item from a product snapshot.
    pub fn new(product: Product, quantity: NonZeroU32, selection: Selection) -> Self {
        Self {
            product,
            quantity,
            size: selection.size,
            color: selection.color,
            customization: selection.customization.filter(|value| !value.is_null()),
        }
    }

    /// Identity key of this item.
    pub fn key(&self) -> LineKey<'_> {
        LineKey {
            product: self.product.id(),
            size: self.size.as_deref(),
            color: self.color.as_deref(),
            customization: self.customization.as_ref(),
        }
    }

    /// Product snapshot taken when the item was added.
    pub fn product(&self) -> &Product {
        &self.product
    }

    /// Quantity, always at least one.
    pub fn quantity(&self) -> u32 {
        self.quantity.get()
    }

    /// Selected size.
    pub fn size(&self) -> Option<&str> {
        self.size.as_deref()
    }

    /// Selected color.
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    /// Customization payload.
    pub fn customization(&self) -> Option<&Value> {
        self.customization.as_ref()
    }

    /// Undiscounted price of the whole line.
    pub fn line_price(&self) -> Decimal {
        self.product.price() * Decimal::from(self.quantity.get())
    }

    /// Discounted price of the whole line.
    pub fn discounted_line_price(&self) -> Decimal {
        self.product.discounted_price() * Decimal::from(self.quantity.get())
    }

    /// Increase the quantity, returning `None` when it would overflow.
    pub(crate) fn checked_increase(&mut self, by: NonZeroU32) -> Option<NonZeroU32> {
        self.quantity = self.quantity.checked_add(by.get())?;

        Some(self.quantity)
    }

    /// Replace everything but the product snapshot.
    pub(crate) fn replace(&mut self, quantity: NonZeroU32, selection: Selection) {
        self.quantity = quantity;
        self.size = selection.size;
        self.color = selection.color;
        self.customization = selection.customization.filter(|value| !value.is_null());
    }
}
