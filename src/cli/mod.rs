use std::io::{self, Write};

use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use storefront_cart::{
    cart::{Cart, CartEvent, CartObserver},
    config::{CatalogConfig, LoggingConfig, PricingConfig, StorageConfig},
    items::Selection,
    logging,
    persistence::FileSlot,
};

mod add;
mod clear;
mod remove;
mod show;
mod totals;
mod update;

type SessionCart = Cart<FileSlot, Notifier>;

#[derive(Debug, Parser)]
#[command(name = "storefront-cart", about = "Storefront shopping cart", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pricing: PricingConfig,

    #[command(flatten)]
    storage: StorageConfig,

    #[command(flatten)]
    catalog: CatalogConfig,

    #[command(flatten)]
    logging: LoggingConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Add a catalog product to the cart
    Add(add::AddArgs),
    /// Replace the quantity and variant of a cart item
    Update(update::UpdateArgs),
    /// Remove a cart item
    Remove(remove::RemoveArgs),
    /// Remove every cart item
    Clear,
    /// Show the cart items and totals
    Show,
    /// Show the cart totals
    Totals,
}

impl Cli {
    pub(crate) fn run(self) -> Result<(), String> {
        logging::init(&self.logging)
            .map_err(|error| format!("failed to initialise logging: {error}"))?;

        let policy = self
            .pricing
            .policy()
            .map_err(|error| format!("invalid pricing settings: {error}"))?;

        let slot = self
            .storage
            .file_slot()
            .map_err(|error| format!("invalid storage settings: {error}"))?;

        let mut cart = Cart::open_with_observer(slot, policy, Notifier);

        if let Some(error) = cart.last_persistence_error() {
            report(&format!("warning: {error}; starting with an empty cart"))?;
        }

        match self.command {
            Commands::Add(args) => add::run(&mut cart, &self.catalog, args)?,
            Commands::Update(args) => update::run(&mut cart, args)?,
            Commands::Remove(args) => remove::run(&mut cart, &args)?,
            Commands::Clear => clear::run(&mut cart),
            Commands::Show => show::run(&cart)?,
            Commands::Totals => totals::run(&cart)?,
        }

        if let Some(error) = cart.last_persistence_error() {
            report(&format!("warning: cart was not saved: {error}"))?;
        }

        Ok(())
    }
}

/// Variant options shared by `add` and `update`.
#[derive(Debug, Args)]
struct SelectionArgs {
    /// Size to select
    #[arg(long)]
    size: Option<String>,

    /// Color name to select
    #[arg(long)]
    color: Option<String>,

    /// Customization payload as JSON
    #[arg(long, value_parser = parse_customization)]
    customization: Option<Value>,
}

impl SelectionArgs {
    fn into_selection(self) -> Selection {
        Selection {
            size: self.size,
            color: self.color,
            customization: self.customization,
        }
    }
}

fn parse_customization(raw: &str) -> Result<Value, String> {
    serde_json::from_str(raw).map_err(|error| format!("invalid customization JSON: {error}"))
}

/// Converts a 1-based position as shown by `show` into a cart index.
fn cart_index(position: usize) -> Result<usize, String> {
    position
        .checked_sub(1)
        .ok_or_else(|| "item positions start at 1".to_string())
}

/// Prints a confirmation for each cart change.
#[derive(Debug, Default)]
pub(crate) struct Notifier;

impl Notifier {
    fn message(event: CartEvent) -> &'static str {
        match event {
            CartEvent::ItemAdded { .. } => "Item added to cart!",
            CartEvent::ItemMerged { .. } | CartEvent::ItemUpdated { .. } => "Cart updated!",
            CartEvent::ItemRemoved { .. } => "Item removed from cart!",
            CartEvent::Cleared => "Cart cleared!",
        }
    }
}

impl CartObserver for Notifier {
    fn on_event(&mut self, event: CartEvent) {
        _ = writeln!(io::stdout().lock(), "{}", Self::message(event));
    }
}

fn report(message: &str) -> Result<(), String> {
    writeln!(io::stderr().lock(), "{message}")
        .map_err(|error| format!("failed to write to stderr: {error}"))
}
