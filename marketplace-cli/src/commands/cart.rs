//! Shopping cart commands for customers.

use clap::{Args, Subcommand};
use marketplace_core::{Capability, CartSynchronizer, ItemId};

use super::{runtime, Context, OutputFormat};

#[derive(Args)]
pub struct CartCommand {
    #[command(subcommand)]
    pub command: CartSubcommand,
}

#[derive(Subcommand)]
pub enum CartSubcommand {
    /// Show the cart and its total
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Add an item to the cart
    Add {
        /// Item ID
        item: ItemId,

        /// Quantity to add
        #[arg(long, short, default_value_t = 1)]
        qty: u32,
    },

    /// Set the quantity of a cart line
    Set {
        /// Item ID
        item: ItemId,

        /// New quantity
        #[arg(allow_hyphen_values = true)]
        qty: String,
    },

    /// Remove a line from the cart
    Remove {
        /// Item ID
        item: ItemId,
    },
}

impl CartCommand {
    pub fn run(&self, context: &Context) -> Result<(), Box<dyn std::error::Error>> {
        context.authorize(Capability::RequiresCustomer)?;

        let cart = CartSynchronizer::new(context.remote.clone(), context.session.clone());
        let rt = runtime()?;

        match &self.command {
            CartSubcommand::Show { format } => {
                rt.block_on(cart.refresh())?;
                match format {
                    OutputFormat::Json => {
                        let output = serde_json::json!({
                            "lines": cart.lines(),
                            "total": cart.total().to_string(),
                        });
                        println!("{}", serde_json::to_string_pretty(&output)?);
                    }
                    OutputFormat::Table => print_cart(&cart),
                }
            }
            CartSubcommand::Add { item, qty } => {
                rt.block_on(cart.add(*item, *qty))?;
                println!("Added {} x item {} to cart.\n", qty, item);
                print_cart(&cart);
            }
            CartSubcommand::Set { item, qty } => {
                rt.block_on(cart.set_quantity(*item, qty))?;
                println!("Updated item {}.\n", item);
                print_cart(&cart);
            }
            CartSubcommand::Remove { item } => {
                rt.block_on(cart.remove_line(*item))?;
                println!("Removed item {} from cart.\n", item);
                print_cart(&cart);
            }
        }
        Ok(())
    }
}

fn print_cart(cart: &CartSynchronizer) {
    let lines = cart.lines();
    println!("Shopping Cart");
    println!("{}", "=".repeat(44));
    if lines.is_empty() {
        println!("Your cart is empty.");
        return;
    }
    for line in &lines {
        println!("{}", line);
    }
    println!("{}", "-".repeat(44));
    println!("Total: ${}", cart.total());
}
