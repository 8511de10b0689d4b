use clap::Args;

use super::{SelectionArgs, SessionCart, cart_index};

#[derive(Debug, Args)]
pub(crate) struct UpdateArgs {
    /// Item position, as listed by `show`
    position: usize,

    /// New quantity
    #[arg(short, long)]
    quantity: u32,

    #[command(flatten)]
    selection: SelectionArgs,
}

pub(crate) fn run(cart: &mut SessionCart, args: UpdateArgs) -> Result<(), String> {
    let index = cart_index(args.position)?;

    cart.update_item(index, args.quantity, args.selection.into_selection())
        .map_err(|error| format!("failed to update item: {error}"))
}
