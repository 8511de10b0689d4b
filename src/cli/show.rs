use std::io;

use storefront_cart::summary::CartSummary;

use super::SessionCart;

pub(crate) fn run(cart: &SessionCart) -> Result<(), String> {
    CartSummary::new(cart.items(), cart.policy())
        .write_to(io::stdout().lock())
        .map_err(|error| format!("failed to print cart: {error}"))
}
