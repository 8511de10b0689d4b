//! Pricing
//!
//! Totals are accumulated in full decimal precision and only rounded to two places when
//! they are turned into [`Money`] for presentation. This module is the only place that
//! knows about discount, tax and shipping policy.

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use thiserror::Error;

use crate::items::LineItem;

/// Decimal places totals are presented with.
const PRESENTATION_DP: u32 = 2;

/// Errors raised when building a [`PricingPolicy`].
#[derive(Debug, Error, PartialEq)]
pub enum PolicyError {
    /// Tax rate outside `0..=1`.
    #[error("tax rate must be between 0 and 1, got {0}")]
    TaxRate(Decimal),

    /// Negative free-shipping threshold.
    #[error("free shipping threshold cannot be negative, got {0}")]
    Threshold(Decimal),

    /// Negative flat shipping fee.
    #[error("flat shipping fee cannot be negative, got {0}")]
    ShippingFee(Decimal),
}

/// Tax, shipping and currency settings applied to a cart.
#[derive(Debug, Clone, Copy)]
pub struct PricingPolicy {
    tax_rate: Percentage,
    free_shipping_threshold: Decimal,
    flat_shipping_fee: Decimal,
    currency: &'static Currency,
}

impl PricingPolicy {
    /// Build a policy.
    ///
    /// Shipping is free only when the subtotal is strictly above `free_shipping_threshold`.
    ///
    /// # Errors
    ///
    /// Returns a [`PolicyError`] for a tax rate outside `0..=1` or a negative threshold or fee.
    pub fn new(
        tax_rate: Percentage,
        free_shipping_threshold: Decimal,
        flat_shipping_fee: Decimal,
        currency: &'static Currency,
    ) -> Result<Self, PolicyError> {
        // decimal_percentage keeps its Decimal private; multiplying by one reads it back.
        let rate = tax_rate * Decimal::ONE;

        if rate < Decimal::ZERO || rate > Decimal::ONE {
            return Err(PolicyError::TaxRate(rate));
        }

        if free_shipping_threshold < Decimal::ZERO {
            return Err(PolicyError::Threshold(free_shipping_threshold));
        }

        if flat_shipping_fee < Decimal::ZERO {
            return Err(PolicyError::ShippingFee(flat_shipping_fee));
        }

        Ok(Self {
            tax_rate,
            free_shipping_threshold,
            flat_shipping_fee,
            currency,
        })
    }

    /// Tax rate applied to the discounted subtotal.
    pub fn tax_rate(&self) -> Percentage {
        self.tax_rate
    }

    /// Subtotal above which shipping is free.
    pub fn free_shipping_threshold(&self) -> Decimal {
        self.free_shipping_threshold
    }

    /// Shipping charged at or below the threshold.
    pub fn flat_shipping_fee(&self) -> Decimal {
        self.flat_shipping_fee
    }

    /// Currency totals are expressed in.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    fn shipping_for(&self, subtotal: Decimal) -> Decimal {
        if subtotal > self.free_shipping_threshold {
            Decimal::ZERO
        } else {
            self.flat_shipping_fee
        }
    }
}

impl Default for PricingPolicy {
    /// 10% tax, free shipping over 100, otherwise a flat 10, in USD.
    fn default() -> Self {
        Self {
            tax_rate: Percentage::from(0.1),
            free_shipping_threshold: Decimal::ONE_HUNDRED,
            flat_shipping_fee: Decimal::TEN,
            currency: iso::USD,
        }
    }
}

/// Cart totals, rounded for presentation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartTotals {
    subtotal: Money<'static, Currency>,
    discount: Money<'static, Currency>,
    tax: Money<'static, Currency>,
    shipping: Money<'static, Currency>,
    total: Money<'static, Currency>,
}

impl CartTotals {
    /// Sum of undiscounted line prices.
    pub fn subtotal(&self) -> Money<'static, Currency> {
        self.subtotal
    }

    /// Sum of product discounts.
    pub fn discount(&self) -> Money<'static, Currency> {
        self.discount
    }

    /// Tax on the discounted subtotal.
    pub fn tax(&self) -> Money<'static, Currency> {
        self.tax
    }

    /// Shipping charge.
    pub fn shipping(&self) -> Money<'static, Currency> {
        self.shipping
    }

    /// Amount payable.
    pub fn total(&self) -> Money<'static, Currency> {
        self.total
    }
}

/// Unrounded sums, kept internal so nothing downstream rounds twice.
#[derive(Debug, Default)]
struct Accumulated {
    subtotal: Decimal,
    discount: Decimal,
}

/// Discount on one unit, `price × discount / 100`.
pub fn unit_discount(price: Decimal, discount: Option<Decimal>) -> Decimal {
    discount.map_or(Decimal::ZERO, |percent| {
        price * percent / Decimal::ONE_HUNDRED
    })
}

/// Unit price after discount, `price − price × discount / 100`.
///
/// Catalog display code must go through this so displayed and charged prices agree.
pub fn discounted_unit_price(price: Decimal, discount: Option<Decimal>) -> Decimal {
    price - unit_discount(price, discount)
}

/// Calculates cart totals for a list of line items.
///
/// An empty list still pays the flat shipping fee, as its subtotal of zero does not exceed
/// the free-shipping threshold.
pub fn calculate_totals(items: &[LineItem], policy: &PricingPolicy) -> CartTotals {
    let sums = items.iter().fold(Accumulated::default(), |mut acc, item| {
        let product = item.product();
        let quantity = Decimal::from(item.quantity());

        acc.subtotal += item.line_price();
        acc.discount += unit_discount(product.price(), product.discount()) * quantity;
        acc
    });

    let taxable = sums.subtotal - sums.discount;
    let tax = policy.tax_rate * taxable;
    let shipping = policy.shipping_for(sums.subtotal);
    let total = taxable + tax + shipping;

    CartTotals {
        subtotal: present(sums.subtotal, policy.currency),
        discount: present(sums.discount, policy.currency),
        tax: present(tax, policy.currency),
        shipping: present(shipping, policy.currency),
        total: present(total, policy.currency),
    }
}

/// Round once, to two places, and wrap in the policy currency.
pub(crate) fn present(
    amount: Decimal,
    currency: &'static Currency,
) -> Money<'static, Currency> {
    let rounded =
        amount.round_dp_with_strategy(PRESENTATION_DP, RoundingStrategy::MidpointAwayFromZero);

    Money::from_decimal(rounded, currency)
}
