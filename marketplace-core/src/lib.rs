//! Marketplace Core Library
//!
//! Session handling, access decisions and client-side synchronization of
//! carts and shop inventories against the marketplace API.

pub mod access;
pub mod auth;
pub mod catalog;
pub mod models;
pub mod remote;
pub mod session;
pub mod sync;

pub use access::{AccessGuard, Capability, Decision};
pub use auth::{AuthError, Authenticator};
pub use catalog::Catalog;
pub use models::{
    cart_total, CartLine, CatalogItem, Item, ItemDraft, ItemId, ItemRecord, Role, Session, Shop,
    ShopId,
};
pub use remote::{Account, HttpRemoteClient, RemoteClient, RemoteError, DEFAULT_API_URL};
pub use session::{SessionError, SessionStore};
pub use sync::{
    CartSynchronizer, Confirm, Deletion, ErrorKind, Failure, InventorySynchronizer, Operation,
    Phase,
};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
