use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ShopId;

/// Server-assigned item identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ItemId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(ItemId)
            .map_err(|_| format!("Invalid item id '{}'", s))
    }
}

/// Item payload as the server returns it from shop-scoped endpoints.
///
/// The server does not echo the owning shop, so this is turned into an
/// [`Item`] by whoever knows which shop it was fetched from.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ItemRecord {
    pub id: ItemId,
    pub name: String,
    #[serde(default, deserialize_with = "super::nullable_string")]
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock: u32,
}

/// An item in a seller's inventory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub shop_id: ShopId,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock: u32,
}

impl Item {
    pub fn from_record(record: ItemRecord, shop_id: ShopId) -> Self {
        Self {
            id: record.id,
            shop_id,
            name: record.name,
            description: record.description,
            price: record.price,
            stock: record.stock,
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {:<24} ${:>8}  stock: {}",
            self.id,
            self.name,
            self.price.round_dp(2),
            self.stock
        )
    }
}

/// Fields sent when creating or updating an item.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ItemDraft {
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock: u32,
}

impl ItemDraft {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: Decimal,
        stock: u32,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            price,
            stock,
        }
    }

    /// Builds a draft from raw form input, coercing price and stock to numbers.
    pub fn parse(name: &str, description: &str, price: &str, stock: &str) -> Result<Self, String> {
        let price = Decimal::from_str(price.trim())
            .map_err(|_| format!("Invalid price '{}'", price))?;
        if price.is_sign_negative() && !price.is_zero() {
            return Err(format!("Price cannot be negative: {}", price));
        }
        let stock = stock
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("Invalid stock '{}': expected a whole number >= 0", stock))?;

        Ok(Self::new(name.trim(), description.trim(), price, stock))
    }
}

impl From<&Item> for ItemDraft {
    fn from(item: &Item) -> Self {
        Self::new(
            item.name.clone(),
            item.description.clone(),
            item.price,
            item.stock,
        )
    }
}

/// An item as listed in the public catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    pub id: ItemId,
    pub name: String,
    #[serde(default, deserialize_with = "super::nullable_string")]
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock: u32,
    #[serde(default, deserialize_with = "super::nullable_string")]
    pub shop_name: String,
}

impl CatalogItem {
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

impl fmt::Display for CatalogItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {:<24} ${:>8}  {:<16} available: {}",
            self.id,
            self.name,
            self.price.round_dp(2),
            self.shop_name,
            self.stock
        )
    }
}
