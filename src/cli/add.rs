use clap::Args;
use storefront_cart::{
    catalog::{Catalog, YamlCatalog},
    config::CatalogConfig,
    products::ProductId,
};

use super::{SelectionArgs, SessionCart};

#[derive(Debug, Args)]
pub(crate) struct AddArgs {
    /// Catalog id of the product
    pub(super) product_id: String,

    /// Number of units to add
    #[arg(short, long, default_value_t = 1)]
    pub(super) quantity: u32,

    #[command(flatten)]
    pub(super) selection: SelectionArgs,
}

pub(crate) fn run(
    cart: &mut SessionCart,
    config: &CatalogConfig,
    args: AddArgs,
) -> Result<(), String> {
    let catalog = YamlCatalog::from_path(&config.catalog)
        .map_err(|error| format!("failed to load catalog: {error}"))?;

    let product = catalog
        .product(&ProductId::new(args.product_id))
        .map_err(|error| format!("failed to look up product: {error}"))?;

    let selection = product.preselect(args.selection.into_selection());

    product
        .check_selection(args.quantity, &selection)
        .map_err(|error| format!("cannot add {}: {error}", product.name()))?;

    cart.add_item(product, args.quantity, selection)
        .map_err(|error| format!("failed to add item: {error}"))?;

    Ok(())
}
