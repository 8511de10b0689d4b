//! Products
//!
//! A [`Product`] is the snapshot of a catalog record that a line item carries around. It is
//! validated once, when it crosses into the crate, so pricing never has to deal with a
//! negative price or a discount above 100%.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{items::Selection, pricing::discounted_unit_price};

/// Largest unit price accepted for a product.
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Errors raised when a product record fails validation.
#[derive(Debug, Error, PartialEq)]
pub enum ProductError {
    /// The product has no identifier.
    #[error("product id cannot be empty")]
    EmptyId,

    /// The price is below zero.
    #[error("product {0} has a negative price")]
    NegativePrice(ProductId),

    /// The price is above [`MAX_PRICE`].
    #[error("product {0} has a price above the maximum")]
    PriceTooLarge(ProductId),

    /// The discount is not a percentage between 0 and 100.
    #[error("product {id} has discount {discount}, expected a value between 0 and 100")]
    DiscountOutOfRange {
        /// Offending product.
        id: ProductId,
        /// Discount as supplied.
        discount: Decimal,
    },
}

/// Reasons a selection cannot be added for a product.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    /// Nothing left to sell.
    #[error("this product is out of stock")]
    OutOfStock,

    /// More requested than is available.
    #[error("only {available} available, {requested} requested")]
    ExceedsStock {
        /// Quantity asked for.
        requested: u32,
        /// Quantity in stock.
        available: u32,
    },

    /// Quantity must be at least one.
    #[error("quantity must be at least 1")]
    ZeroQuantity,

    /// The product comes in sizes and none was chosen.
    #[error("please select a size")]
    SizeRequired,

    /// The product comes in colors and none was chosen.
    #[error("please select a color")]
    ColorRequired,

    /// The chosen size is not offered.
    #[error("size {0} is not available")]
    UnknownSize(String),

    /// The chosen color is not offered.
    #[error("color {0} is not available")]
    UnknownColor(String),
}

/// Product identifier as issued by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Wrap a catalog identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A color option offered for a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductColor {
    /// Display name, also the value stored on a line item.
    pub name: String,

    /// Optional swatch code (e.g. `#a0522d`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ProductColor {
    /// Color with a name and no swatch.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: None,
        }
    }
}

/// Product snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ProductRecord", into = "ProductRecord")]
pub struct Product {
    id: ProductId,
    name: String,
    price: Decimal,
    discount: Option<Decimal>,
    stock: u32,
    sizes: SmallVec<[String; 4]>,
    colors: SmallVec<[ProductColor; 4]>,
    extra: Map<String, Value>,
}

impl Product {
    /// Create a product with a name and unit price.
    ///
    /// # Errors
    ///
    /// Returns a [`ProductError`] if the id is empty or the price is out of range.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price: Decimal,
    ) -> Result<Self, ProductError> {
        let id = id.into();

        if id.as_str().is_empty() {
            return Err(ProductError::EmptyId);
        }

        if price < Decimal::ZERO {
            return Err(ProductError::NegativePrice(id));
        }

        if price > MAX_PRICE {
            return Err(ProductError::PriceTooLarge(id));
        }

        Ok(Self {
            id,
            name: name.into(),
            price,
            discount: None,
            stock: 0,
            sizes: SmallVec::new(),
            colors: SmallVec::new(),
            extra: Map::new(),
        })
    }

    /// Set the discount, in percent points.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::DiscountOutOfRange`] unless `0 <= discount <= 100`.
    pub fn with_discount(mut self, discount: Decimal) -> Result<Self, ProductError> {
        if discount < Decimal::ZERO || discount > Decimal::ONE_HUNDRED {
            return Err(ProductError::DiscountOutOfRange {
                id: self.id,
                discount,
            });
        }

        self.discount = Some(discount);

        Ok(self)
    }

    /// Set the quantity in stock.
    #[must_use]
    pub fn with_stock(mut self, stock: u32) -> Self {
        self.stock = stock;
        self
    }

    /// Set the sizes on offer.
    #[must_use]
    pub fn with_sizes<S: Into<String>>(mut self, sizes: impl IntoIterator<Item = S>) -> Self {
        self.sizes = sizes.into_iter().map(Into::into).collect();
        self
    }

    /// Set the colors on offer.
    #[must_use]
    pub fn with_colors(mut self, colors: impl IntoIterator<Item = ProductColor>) -> Self {
        self.colors = colors.into_iter().collect();
        self
    }

    /// Catalog identifier.
    pub fn id(&self) -> &ProductId {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Undiscounted unit price.
    pub fn price(&self) -> Decimal {
        self.price
    }

    /// Discount in percent points, if any.
    pub fn discount(&self) -> Option<Decimal> {
        self.discount
    }

    /// Unit price after the product discount.
    pub fn discounted_price(&self) -> Decimal {
        discounted_unit_price(self.price, self.discount)
    }

    /// Whether the product carries a non-zero discount.
    pub fn is_discounted(&self) -> bool {
        self.discount.is_some_and(|discount| !discount.is_zero())
    }

    /// Quantity in stock.
    pub fn stock(&self) -> u32 {
        self.stock
    }

    /// Sizes on offer.
    pub fn sizes(&self) -> &[String] {
        &self.sizes
    }

    /// Colors on offer.
    pub fn colors(&self) -> &[ProductColor] {
        &self.colors
    }

    /// Fields fetched alongside the product that the cart does not interpret.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Fill in the first size and the first color on offer where `selection` names none,
    /// the choice a product page starts from.
    pub fn preselect(&self, mut selection: Selection) -> Selection {
        if selection.size.is_none() {
            selection.size = self.sizes.first().cloned();
        }

        if selection.color.is_none() {
            selection.color = self.colors.first().map(|color| color.name.clone());
        }

        selection
    }

    /// Check a prospective selection against stock and the variants on offer.
    ///
    /// Stock limits are the caller's concern, the cart itself never enforces them, so this
    /// is meant to run before [`Cart::add_item`](crate::cart::Cart::add_item).
    ///
    /// # Errors
    ///
    /// Returns the first [`SelectionError`] that applies.
    pub fn check_selection(
        &self,
        quantity: u32,
        selection: &Selection,
    ) -> Result<(), SelectionError> {
        if self.stock == 0 {
            return Err(SelectionError::OutOfStock);
        }

        if quantity == 0 {
            return Err(SelectionError::ZeroQuantity);
        }

        if quantity > self.stock {
            return Err(SelectionError::ExceedsStock {
                requested: quantity,
                available: self.stock,
            });
        }

        match selection.size.as_deref() {
            None if !self.sizes.is_empty() => return Err(SelectionError::SizeRequired),
            Some(size) if !self.sizes.iter().any(|offered| offered == size) => {
                return Err(SelectionError::UnknownSize(size.to_string()));
            }
            _ => {}
        }

        match selection.color.as_deref() {
            None if !self.colors.is_empty() => Err(SelectionError::ColorRequired),
            Some(color) if !self.colors.iter().any(|offered| offered.name == color) => {
                Err(SelectionError::UnknownColor(color.to_string()))
            }
            _ => Ok(()),
        }
    }
}

/// Wire shape of a product, as fetched from the catalog or read back from a slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Catalog identifier. Catalog files key records by id and may leave this out.
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Unit price.
    pub price: Decimal,

    /// Discount in percent points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Decimal>,

    /// Quantity in stock.
    #[serde(default)]
    pub stock: u32,

    /// Sizes on offer.
    #[serde(default)]
    pub sizes: SmallVec<[String; 4]>,

    /// Colors on offer.
    #[serde(default)]
    pub colors: SmallVec<[ProductColor; 4]>,

    /// Any other fetched fields, kept as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TryFrom<ProductRecord> for Product {
    type Error = ProductError;

    fn try_from(record: ProductRecord) -> Result<Self, Self::Error> {
        let mut product = Product::new(record.id, record.name, record.price)?
            .with_stock(record.stock)
            .with_colors(record.colors);

        if let Some(discount) = record.discount {
            product = product.with_discount(discount)?;
        }

        product.sizes = record.sizes;
        product.extra = record.extra;

        Ok(product)
    }
}

impl From<Product> for ProductRecord {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.0,
            name: product.name,
            price: product.price,
            discount: product.discount,
            stock: product.stock,
            sizes: product.sizes,
            colors: product.colors,
            extra: product.extra,
        }
    }
}

impl From<String> for ProductId {
    fn from(value: String) -> Self {
        Self(value)
    }
}
