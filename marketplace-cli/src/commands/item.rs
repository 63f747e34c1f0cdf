//! Inventory commands for sellers.
//!
//! Every command loads the seller's shops and items first; writes go
//! through the inventory synchronizer so the listing printed afterwards
//! reflects what the server confirmed.

use clap::{Args, Subcommand};
use marketplace_core::{Capability, Deletion, InventorySynchronizer, ItemDraft, ItemId, ShopId};

use super::{runtime, Context, OutputFormat, PromptConfirm};

#[derive(Args)]
pub struct ItemCommand {
    #[command(subcommand)]
    pub command: ItemSubcommand,
}

#[derive(Subcommand)]
pub enum ItemSubcommand {
    /// List items, grouped by shop
    List {
        /// Only this shop
        #[arg(long, short)]
        shop: Option<ShopId>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Add an item to a shop
    Add {
        /// Item name
        name: String,

        /// Shop ID (defaults to your first shop)
        #[arg(long, short)]
        shop: Option<ShopId>,

        /// Item description
        #[arg(long, short, default_value = "")]
        description: String,

        /// Price
        #[arg(long, short, allow_hyphen_values = true)]
        price: String,

        /// Units in stock
        #[arg(long, allow_hyphen_values = true, default_value = "0")]
        stock: String,
    },

    /// Change an item's fields
    Update {
        /// Item ID
        id: ItemId,

        /// New name
        #[arg(long, short)]
        name: Option<String>,

        /// New description
        #[arg(long, short)]
        description: Option<String>,

        /// New price
        #[arg(long, short, allow_hyphen_values = true)]
        price: Option<String>,

        /// New stock
        #[arg(long, allow_hyphen_values = true)]
        stock: Option<String>,
    },

    /// Delete an item
    Delete {
        /// Item ID
        id: ItemId,

        /// Skip confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

impl ItemCommand {
    pub fn run(&self, context: &Context) -> Result<(), Box<dyn std::error::Error>> {
        context.authorize(Capability::RequiresSeller)?;

        let inventory = InventorySynchronizer::new(context.remote.clone(), context.session.clone());
        let rt = runtime()?;
        rt.block_on(inventory.load_all())?;

        match &self.command {
            ItemSubcommand::List { shop, format } => {
                let shops = match shop {
                    Some(id) => vec![inventory
                        .shop(*id)
                        .ok_or_else(|| format!("Shop not found: {}", id))?],
                    None => inventory.shops(),
                };

                match format {
                    OutputFormat::Json => {
                        let output: Vec<_> = shops
                            .iter()
                            .map(|s| {
                                serde_json::json!({
                                    "shop": s,
                                    "items": inventory.items(s.id),
                                })
                            })
                            .collect();
                        println!("{}", serde_json::to_string_pretty(&output)?);
                    }
                    OutputFormat::Table => {
                        if shops.is_empty() {
                            println!("No shops yet.");
                            return Ok(());
                        }
                        for shop in &shops {
                            println!("{}", shop);
                            println!("{}", "=".repeat(44));
                            let items = inventory.items(shop.id);
                            if items.is_empty() {
                                println!("No items in this shop yet.");
                            }
                            for item in &items {
                                println!("{}", item);
                            }
                            println!();
                        }
                    }
                }
                Ok(())
            }

            ItemSubcommand::Add {
                name,
                shop,
                description,
                price,
                stock,
            } => {
                if name.trim().is_empty() {
                    return Err("Item name cannot be empty".into());
                }
                if let Some(id) = shop {
                    inventory.select_shop(*id);
                }
                let shop_id = shop
                    .or_else(|| inventory.selected_shop())
                    .ok_or("You have no shops yet. Create one with 'market shop create <name>'.")?;

                let draft = ItemDraft::parse(name, description, price, stock)?;
                let item = rt.block_on(inventory.add_item(shop_id, &draft))?;
                println!("Added item:");
                println!("{}", item);
                Ok(())
            }

            ItemSubcommand::Update {
                id,
                name,
                description,
                price,
                stock,
            } => {
                let current = inventory
                    .item(*id)
                    .ok_or_else(|| format!("Item not found: {}", id))?;
                inventory.select_item(*id);

                let draft = ItemDraft::parse(
                    name.as_deref().unwrap_or(&current.name),
                    description.as_deref().unwrap_or(&current.description),
                    price.as_deref().unwrap_or(&current.price.to_string()),
                    stock.as_deref().unwrap_or(&current.stock.to_string()),
                )?;
                if draft == ItemDraft::from(&current) {
                    println!("Nothing to update.");
                    return Ok(());
                }

                let item = rt.block_on(inventory.update_item(*id, &draft))?;
                println!("Updated item:");
                println!("{}", item);
                Ok(())
            }

            ItemSubcommand::Delete { id, yes } => {
                let (shop_id, name) = inventory
                    .item(*id)
                    .map(|i| (i.shop_id, i.name))
                    .ok_or_else(|| format!("Item not found: {}", id))?;

                let confirm = PromptConfirm { assume_yes: *yes };
                match rt.block_on(inventory.delete_item(*id, shop_id, &confirm))? {
                    Deletion::Deleted => println!("Deleted item: {}", name),
                    Deletion::Declined => println!("Deletion cancelled."),
                }
                Ok(())
            }
        }
    }
}
