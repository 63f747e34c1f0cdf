//! The boundary to the marketplace backend.
//!
//! Everything above this module sees the backend as an opaque asynchronous
//! CRUD service: [`RemoteClient`] returns entity payloads or a
//! [`RemoteError`]. [`HttpRemoteClient`] is the production implementation.
//!
//! Authenticated calls take the bearer token as an argument. Callers obtain
//! it from the [`SessionStore`](crate::SessionStore) and fail locally when
//! there is none, so no request is ever sent without one.

mod error;
#[cfg(test)]
pub(crate) mod fake;
mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::{
    CartLine, CatalogItem, ItemDraft, ItemId, ItemRecord, Role, Session, Shop, ShopId,
};

pub use error::RemoteError;
pub use http::{HttpRemoteClient, DEFAULT_API_URL};

/// A registered account as echoed back by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub email: String,
    pub role: Role,
}

/// CRUD operations of the marketplace API.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    // Accounts

    /// `POST /register`
    async fn register(&self, email: &str, password: &str, role: Role)
        -> Result<Account, RemoteError>;

    /// `POST /login`. Returns the session to persist.
    async fn login(&self, email: &str, password: &str) -> Result<Session, RemoteError>;

    // Catalog and cart

    /// `GET /items` (no token required)
    async fn list_items(&self) -> Result<Vec<CatalogItem>, RemoteError>;

    /// `GET /cart`
    async fn get_cart(&self, token: &str) -> Result<Vec<CartLine>, RemoteError>;

    /// `POST /cart/items`
    async fn add_cart_line(
        &self,
        token: &str,
        item_id: ItemId,
        quantity: u32,
    ) -> Result<(), RemoteError>;

    /// `PUT /cart/items/{id}`
    async fn update_cart_line(
        &self,
        token: &str,
        item_id: ItemId,
        quantity: u32,
    ) -> Result<(), RemoteError>;

    /// `DELETE /cart/items/{id}`
    async fn delete_cart_line(&self, token: &str, item_id: ItemId) -> Result<(), RemoteError>;

    // Shops and inventory

    /// `GET /shops`
    async fn list_shops(&self, token: &str) -> Result<Vec<Shop>, RemoteError>;

    /// `POST /shops`
    async fn create_shop(
        &self,
        token: &str,
        name: &str,
        description: &str,
    ) -> Result<Shop, RemoteError>;

    /// `DELETE /shops/{id}`. The server deletes the shop's items with it.
    async fn delete_shop(&self, token: &str, shop_id: ShopId) -> Result<(), RemoteError>;

    /// `GET /shops/{id}/items`
    async fn list_shop_items(
        &self,
        token: &str,
        shop_id: ShopId,
    ) -> Result<Vec<ItemRecord>, RemoteError>;

    /// `POST /shops/{id}/items`
    async fn create_item(
        &self,
        token: &str,
        shop_id: ShopId,
        draft: &ItemDraft,
    ) -> Result<ItemRecord, RemoteError>;

    /// `PUT /items/{id}`
    async fn update_item(
        &self,
        token: &str,
        item_id: ItemId,
        draft: &ItemDraft,
    ) -> Result<ItemRecord, RemoteError>;

    /// `DELETE /items/{id}`
    async fn delete_item(&self, token: &str, item_id: ItemId) -> Result<(), RemoteError>;
}
