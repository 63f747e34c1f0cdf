mod cart_line;
mod item;
mod role;
mod session;
mod shop;

pub use cart_line::{cart_total, CartLine};
pub use item::{CatalogItem, Item, ItemDraft, ItemId, ItemRecord};
pub use role::Role;
pub use session::Session;
pub use shop::{Shop, ShopId};

use serde::{Deserialize, Deserializer};

/// The server sends `null` for blank text columns.
fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
