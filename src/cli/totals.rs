use std::io::{self, Write};

use super::SessionCart;

pub(crate) fn run(cart: &SessionCart) -> Result<(), String> {
    let totals = cart.totals();
    let mut out = io::stdout().lock();

    writeln!(out, "items: {}", cart.item_count())
        .and_then(|()| writeln!(out, "subtotal: {}", totals.subtotal()))
        .and_then(|()| writeln!(out, "discount: {}", totals.discount()))
        .and_then(|()| writeln!(out, "tax: {}", totals.tax()))
        .and_then(|()| writeln!(out, "shipping: {}", totals.shipping()))
        .and_then(|()| writeln!(out, "total: {}", totals.total()))
        .map_err(|error| format!("failed to print totals: {error}"))
}
