use clap::Args;
use marketplace_core::{Capability, Catalog};

use super::{runtime, Context, OutputFormat};

/// Browse every item for sale
#[derive(Args)]
pub struct ItemsCommand {
    /// Only list items with stock left
    #[arg(long)]
    in_stock: bool,

    /// Output format
    #[arg(long, short, value_enum, default_value = "table")]
    format: OutputFormat,
}

impl ItemsCommand {
    pub fn run(&self, context: &Context) -> Result<(), Box<dyn std::error::Error>> {
        context.authorize(Capability::Public)?;

        let catalog = Catalog::new(context.remote.clone());
        let mut items = runtime()?.block_on(catalog.browse())?;
        if self.in_stock {
            items.retain(|i| i.in_stock());
        }

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&items)?);
            }
            OutputFormat::Table => {
                if items.is_empty() {
                    println!("No items available.");
                    return Ok(());
                }
                for item in &items {
                    println!("{}", item);
                }
                println!("\n{} item(s)", items.len());
            }
        }
        Ok(())
    }
}
