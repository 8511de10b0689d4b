//! Cart Summary

use std::io;

use rusty_money::iso::Currency;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{Alignment, Style, Theme, object::Columns},
};
use thiserror::Error;

use crate::{
    items::LineItem,
    pricing::{CartTotals, PricingPolicy, calculate_totals, present},
};

/// Errors that can occur when writing a summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// IO error writing the summary.
    #[error("failed to write cart summary")]
    IO(#[from] io::Error),
}

/// Printable view of a cart: one row per line item, then the totals.
#[derive(Debug)]
pub struct CartSummary<'a> {
    items: &'a [LineItem],
    totals: CartTotals,
    currency: &'static Currency,
}

impl<'a> CartSummary<'a> {
    /// Summarise `items` under `policy`.
    pub fn new(items: &'a [LineItem], policy: &PricingPolicy) -> Self {
        Self {
            items,
            totals: calculate_totals(items, policy),
            currency: policy.currency(),
        }
    }

    /// Write the item table and totals.
    ///
    /// # Errors
    ///
    /// Returns an error if the summary cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), SummaryError> {
        if self.items.is_empty() {
            writeln!(out, "\nYour cart is empty.\n")?;
        } else {
            self.write_table(&mut out)?;
        }

        self.write_totals(&mut out)
    }

    fn write_table(&self, out: &mut impl io::Write) -> Result<(), SummaryError> {
        let mut builder = Builder::default();

        builder.push_record(["#", "Item", "Size", "Color", "Price", "Sale Price", "Qty", "Total"]);

        for (idx, item) in self.items.iter().enumerate() {
            let product = item.product();

            let sale_price = if product.is_discounted() {
                present(product.discounted_price(), self.currency).to_string()
            } else {
                String::new()
            };

            builder.push_record([
                (idx + 1).to_string(),
                product.name().to_string(),
                item.size().unwrap_or_default().to_string(),
                item.color().unwrap_or_default().to_string(),
                present(product.price(), self.currency).to_string(),
                sale_price,
                item.quantity().to_string(),
                present(item.discounted_line_price(), self.currency).to_string(),
            ]);
        }

        let mut table = builder.build();
        let mut theme = Theme::from(Style::modern_rounded());
        let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

        theme.remove_horizontal_lines();
        theme.insert_horizontal_line(1, separator);

        table.with(theme);
        table.modify(Columns::new(4..8), Alignment::right());

        writeln!(out, "\n{table}")?;

        Ok(())
    }

    fn write_totals(&self, out: &mut impl io::Write) -> Result<(), SummaryError> {
        let discount = format!("-{}", self.totals.discount());

        let lines = [
            ("Subtotal:", self.totals.subtotal().to_string()),
            ("Discount:", discount),
            ("Tax:", self.totals.tax().to_string()),
            ("Shipping:", self.totals.shipping().to_string()),
            ("Total:", self.totals.total().to_string()),
        ];

        let label_width = lines.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
        let value_width = lines.iter().map(|(_, value)| value.len()).max().unwrap_or(0);

        for (label, value) in lines {
            writeln!(out, " {label:>label_width$}  {value:>value_width$}")?;
        }

        writeln!(out)?;

        Ok(())
    }
}
