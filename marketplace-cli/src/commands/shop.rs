//! Shop management commands for sellers.

use clap::{Args, Subcommand};
use marketplace_core::{Capability, Deletion, InventorySynchronizer, ShopId};

use super::{runtime, Context, OutputFormat, PromptConfirm};

#[derive(Args)]
pub struct ShopCommand {
    #[command(subcommand)]
    pub command: ShopSubcommand,
}

#[derive(Subcommand)]
pub enum ShopSubcommand {
    /// List your shops
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Open a new shop
    Create {
        /// Shop name
        name: String,

        /// Shop description
        #[arg(long, short)]
        description: String,
    },

    /// Delete a shop and all of its items
    Delete {
        /// Shop ID
        id: ShopId,

        /// Skip confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

impl ShopCommand {
    pub fn run(&self, context: &Context) -> Result<(), Box<dyn std::error::Error>> {
        context.authorize(Capability::RequiresSeller)?;

        let inventory = InventorySynchronizer::new(context.remote.clone(), context.session.clone());
        let rt = runtime()?;

        match &self.command {
            ShopSubcommand::List { format } => {
                rt.block_on(inventory.load_all())?;
                let shops = inventory.shops();
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&shops)?);
                    }
                    OutputFormat::Table => {
                        if shops.is_empty() {
                            println!("No shops yet. Create one with 'market shop create <name>'.");
                            return Ok(());
                        }
                        for shop in &shops {
                            println!("{}  ({} items)", shop, inventory.items(shop.id).len());
                        }
                    }
                }
                Ok(())
            }

            ShopSubcommand::Create { name, description } => {
                check_shop_fields(name, description)?;
                let shop = rt.block_on(inventory.create_shop(name.trim(), description.trim()))?;
                println!("Created shop:");
                println!("{}", shop);
                Ok(())
            }

            ShopSubcommand::Delete { id, yes } => {
                rt.block_on(inventory.load_all())?;
                let name = inventory
                    .shop(*id)
                    .map(|s| s.name)
                    .ok_or_else(|| format!("Shop not found: {}", id))?;
                let item_count = inventory.items(*id).len();

                let confirm = PromptConfirm { assume_yes: *yes };
                match rt.block_on(inventory.delete_shop(*id, &confirm))? {
                    Deletion::Deleted => {
                        println!("Deleted shop '{}' and {} item(s).", name, item_count)
                    }
                    Deletion::Declined => println!("Deletion cancelled."),
                }
                Ok(())
            }
        }
    }
}

/// Both shop fields are required.
fn check_shop_fields(name: &str, description: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Shop name cannot be empty");
    }
    if description.trim().is_empty() {
        return Err("Shop description cannot be empty");
    }
    Ok(())
}
