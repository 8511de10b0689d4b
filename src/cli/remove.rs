use clap::Args;

use super::{SessionCart, cart_index};

#[derive(Debug, Args)]
pub(crate) struct RemoveArgs {
    /// Item position, as listed by `show`
    position: usize,
}

pub(crate) fn run(cart: &mut SessionCart, args: &RemoveArgs) -> Result<(), String> {
    let index = cart_index(args.position)?;

    cart.remove_item(index)
        .map(|_removed| ())
        .map_err(|error| format!("failed to remove item: {error}"))
}
