//! Pricing Config

use clap::Args;
use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::iso::{self, Currency};

use crate::pricing::PricingPolicy;

use super::ConfigError;

/// Tax, shipping and currency settings.
#[derive(Debug, Clone, Args)]
pub struct PricingConfig {
    /// Tax rate on the discounted subtotal, as "10%" or "0.1"
    #[arg(long, env = "CART_TAX_RATE", default_value = "10%")]
    pub tax_rate: String,

    /// Subtotal above which shipping is free
    #[arg(long, env = "CART_FREE_SHIPPING_THRESHOLD", default_value = "100")]
    pub free_shipping_threshold: Decimal,

    /// Shipping charged at or below the free-shipping threshold
    #[arg(long, env = "CART_FLAT_SHIPPING_FEE", default_value = "10")]
    pub flat_shipping_fee: Decimal,

    /// ISO currency code totals are shown in
    #[arg(long, env = "CART_CURRENCY", default_value = "USD")]
    pub currency: String,
}

impl PricingConfig {
    /// Build the pricing policy described by these settings.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the tax rate or currency cannot be parsed, or if the
    /// values do not form a valid [`PricingPolicy`].
    pub fn policy(&self) -> Result<PricingPolicy, ConfigError> {
        Ok(PricingPolicy::new(
            parse_percentage(&self.tax_rate)?,
            self.free_shipping_threshold,
            self.flat_shipping_fee,
            parse_currency(&self.currency)?,
        )?)
    }
}

/// Parse percentage string (e.g., "10%" or "0.1") into a `Percentage`
///
/// # Errors
///
/// Returns [`ConfigError::InvalidPercentage`] if the string cannot be parsed.
pub fn parse_percentage(s: &str) -> Result<Percentage, ConfigError> {
    let trimmed = s.trim();

    if let Some(percent_str) = trimmed.strip_suffix('%') {
        let value = percent_str
            .trim()
            .parse::<f64>()
            .map_err(|_err| ConfigError::InvalidPercentage(s.to_string()))?;

        Ok(Percentage::from(value / 100.0))
    } else {
        let value = trimmed
            .parse::<f64>()
            .map_err(|_err| ConfigError::InvalidPercentage(s.to_string()))?;

        Ok(Percentage::from(value))
    }
}

/// Look up a supported ISO currency by code, case-insensitively.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownCurrency`] for anything else.
pub fn parse_currency(code: &str) -> Result<&'static Currency, ConfigError> {
    match code.trim().to_ascii_uppercase().as_str() {
        "USD" => Ok(iso::USD),
        "EUR" => Ok(iso::EUR),
        "GBP" => Ok(iso::GBP),
        "CAD" => Ok(iso::CAD),
        "AUD" => Ok(iso::AUD),
        _ => Err(ConfigError::UnknownCurrency(code.to_string())),
    }
}
