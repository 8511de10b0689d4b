//! Storefront Cart
//!
//! Shopping cart state and pricing for a storefront: line items keyed by product and
//! variant, totals with product discounts, tax and a flat shipping fee, and a durable slot
//! that keeps the cart across restarts.

pub mod cart;
pub mod catalog;
pub mod config;
pub mod items;
pub mod logging;
pub mod persistence;
pub mod pricing;
pub mod products;
pub mod summary;
