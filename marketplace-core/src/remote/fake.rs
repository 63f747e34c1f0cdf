//! In-memory [`RemoteClient`] that behaves like the backend and records calls.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tempfile::TempDir;
use tokio::sync::Notify;

use super::{Account, RemoteClient, RemoteError};
use crate::models::{
    CartLine, CatalogItem, ItemDraft, ItemId, ItemRecord, Role, Session, Shop, ShopId,
};
use crate::session::SessionStore;

pub(crate) const TOKEN: &str = "test-token";

/// A session store in a temp dir, signed in with [`TOKEN`].
pub(crate) fn signed_in(role: Role) -> (Arc<SessionStore>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let store = SessionStore::new(temp_dir.path().join("session.json"));
    store
        .set(&Session::new(TOKEN, "someone@example.com", role))
        .unwrap();
    (Arc::new(store), temp_dir)
}

pub(crate) fn signed_out() -> (Arc<SessionStore>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let store = SessionStore::new(temp_dir.path().join("session.json"));
    (Arc::new(store), temp_dir)
}

#[derive(Default)]
struct Backend {
    shops: Vec<Shop>,
    items: HashMap<ShopId, Vec<ItemRecord>>,
    cart: Vec<CartLine>,
    next_id: u64,
    calls: Vec<String>,
    failing: HashSet<&'static str>,
}

impl Backend {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn find_item(&self, item_id: ItemId) -> Option<&ItemRecord> {
        self.items.values().flatten().find(|i| i.id == item_id)
    }
}

/// Parks a call after the backend applied it, until released.
#[derive(Default)]
pub(crate) struct Hold {
    pub(crate) reached: Notify,
    pub(crate) release: Notify,
}

pub(crate) struct FakeRemote {
    backend: Mutex<Backend>,
    holds: Mutex<HashMap<&'static str, Arc<Hold>>>,
}

impl FakeRemote {
    pub(crate) fn new() -> Self {
        Self {
            backend: Mutex::new(Backend {
                next_id: 100,
                ..Backend::default()
            }),
            holds: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn with_shop(self, id: u64, name: &str) -> Self {
        self.backend.lock().shops.push(Shop {
            id: ShopId(id),
            name: name.to_string(),
            description: String::new(),
        });
        self.backend.lock().items.entry(ShopId(id)).or_default();
        self
    }

    pub(crate) fn with_item(self, shop: u64, id: u64, name: &str, price: Decimal, stock: u32) -> Self {
        self.backend
            .lock()
            .items
            .entry(ShopId(shop))
            .or_default()
            .push(ItemRecord {
                id: ItemId(id),
                name: name.to_string(),
                description: String::new(),
                price,
                stock,
            });
        self
    }

    pub(crate) fn with_cart_line(self, item: u64, name: &str, price: Decimal, quantity: u32) -> Self {
        self.backend
            .lock()
            .cart
            .push(CartLine::new(ItemId(item), name, price, quantity));
        self
    }

    /// Makes every call to `method` fail with a 500 until cleared.
    pub(crate) fn fail(&self, method: &'static str) {
        self.backend.lock().failing.insert(method);
    }

    pub(crate) fn heal(&self, method: &'static str) {
        self.backend.lock().failing.remove(method);
    }

    /// Parks the next `method` call once its change is in the backend.
    pub(crate) fn hold(&self, method: &'static str) -> Arc<Hold> {
        let hold = Arc::new(Hold::default());
        self.holds.lock().insert(method, hold.clone());
        hold
    }

    async fn pause(&self, method: &'static str) {
        let hold = self.holds.lock().remove(method);
        if let Some(hold) = hold {
            hold.reached.notify_one();
            hold.release.notified().await;
        }
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.backend.lock().calls.clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.backend.lock().calls.len()
    }

    pub(crate) fn set_cart(&self, lines: Vec<CartLine>) {
        self.backend.lock().cart = lines;
    }

    /// Records the call and checks the token and failure switches.
    fn enter(&self, method: &'static str, token: Option<&str>) -> Result<(), RemoteError> {
        let mut backend = self.backend.lock();
        backend.calls.push(method.to_string());
        if backend.failing.contains(method) {
            return Err(RemoteError::Server {
                status: 500,
                message: Some(format!("{} exploded", method)),
            });
        }
        match token {
            Some(TOKEN) | None => Ok(()),
            Some(_) => Err(RemoteError::Unauthorized(Some("Bad token".into()))),
        }
    }
}

#[async_trait]
impl RemoteClient for FakeRemote {
    async fn register(
        &self,
        email: &str,
        _password: &str,
        role: Role,
    ) -> Result<Account, RemoteError> {
        self.enter("register", None)?;
        if email == "taken@example.com" {
            return Err(RemoteError::Server {
                status: 400,
                message: Some("Email already registered".into()),
            });
        }
        Ok(Account {
            email: email.to_string(),
            role,
        })
    }

    async fn login(&self, email: &str, password: &str) -> Result<Session, RemoteError> {
        self.enter("login", None)?;
        if password != "secret" {
            return Err(RemoteError::Unauthorized(Some("Invalid credentials".into())));
        }
        let role = if email.starts_with("seller") {
            Role::Seller
        } else {
            Role::Customer
        };
        Ok(Session::new(TOKEN, email, role))
    }

    async fn list_items(&self) -> Result<Vec<CatalogItem>, RemoteError> {
        self.enter("list_items", None)?;
        let backend = self.backend.lock();
        let mut out = Vec::new();
        for shop in &backend.shops {
            for item in backend.items.get(&shop.id).into_iter().flatten() {
                out.push(CatalogItem {
                    id: item.id,
                    name: item.name.clone(),
                    description: item.description.clone(),
                    price: item.price,
                    stock: item.stock,
                    shop_name: shop.name.clone(),
                });
            }
        }
        Ok(out)
    }

    async fn get_cart(&self, token: &str) -> Result<Vec<CartLine>, RemoteError> {
        self.enter("get_cart", Some(token))?;
        Ok(self.backend.lock().cart.clone())
    }

    async fn add_cart_line(
        &self,
        token: &str,
        item_id: ItemId,
        quantity: u32,
    ) -> Result<(), RemoteError> {
        self.enter("add_cart_line", Some(token))?;
        let mut guard = self.backend.lock();
        let backend = &mut *guard;
        let item = backend
            .find_item(item_id)
            .cloned()
            .ok_or(RemoteError::NotFound(Some("Item not found".into())))?;
        match backend.cart.iter_mut().find(|l| l.item_id == item_id) {
            Some(line) => line.quantity += quantity,
            None => backend
                .cart
                .push(CartLine::new(item_id, item.name, item.price, quantity)),
        }
        Ok(())
    }

    async fn update_cart_line(
        &self,
        token: &str,
        item_id: ItemId,
        quantity: u32,
    ) -> Result<(), RemoteError> {
        self.enter("update_cart_line", Some(token))?;
        let mut guard = self.backend.lock();
        let backend = &mut *guard;
        let stock = backend.find_item(item_id).map(|i| i.stock);
        let line = backend
            .cart
            .iter_mut()
            .find(|l| l.item_id == item_id)
            .ok_or(RemoteError::Server {
                status: 400,
                message: Some("Item not in cart".into()),
            })?;
        // The backend clamps to available stock.
        line.quantity = stock.map_or(quantity, |s| quantity.min(s));
        Ok(())
    }

    async fn delete_cart_line(&self, token: &str, item_id: ItemId) -> Result<(), RemoteError> {
        self.enter("delete_cart_line", Some(token))?;
        self.backend.lock().cart.retain(|l| l.item_id != item_id);
        Ok(())
    }

    async fn list_shops(&self, token: &str) -> Result<Vec<Shop>, RemoteError> {
        self.enter("list_shops", Some(token))?;
        Ok(self.backend.lock().shops.clone())
    }

    async fn create_shop(
        &self,
        token: &str,
        name: &str,
        description: &str,
    ) -> Result<Shop, RemoteError> {
        self.enter("create_shop", Some(token))?;
        let mut backend = self.backend.lock();
        let shop = Shop {
            id: ShopId(backend.next_id()),
            name: name.to_string(),
            description: description.to_string(),
        };
        backend.shops.push(shop.clone());
        backend.items.insert(shop.id, Vec::new());
        Ok(shop)
    }

    async fn delete_shop(&self, token: &str, shop_id: ShopId) -> Result<(), RemoteError> {
        self.enter("delete_shop", Some(token))?;
        let mut backend = self.backend.lock();
        backend.shops.retain(|s| s.id != shop_id);
        backend.items.remove(&shop_id);
        Ok(())
    }

    async fn list_shop_items(
        &self,
        token: &str,
        shop_id: ShopId,
    ) -> Result<Vec<ItemRecord>, RemoteError> {
        self.enter("list_shop_items", Some(token))?;
        self.backend
            .lock()
            .items
            .get(&shop_id)
            .cloned()
            .ok_or(RemoteError::NotFound(Some("Shop not found or unauthorized".into())))
    }

    async fn create_item(
        &self,
        token: &str,
        shop_id: ShopId,
        draft: &ItemDraft,
    ) -> Result<ItemRecord, RemoteError> {
        self.enter("create_item", Some(token))?;
        let record = {
            let mut backend = self.backend.lock();
            let record = ItemRecord {
                id: ItemId(backend.next_id()),
                name: draft.name.clone(),
                description: draft.description.clone(),
                price: draft.price,
                stock: draft.stock,
            };
            backend
                .items
                .entry(shop_id)
                .or_default()
                .push(record.clone());
            record
        };
        self.pause("create_item").await;
        Ok(record)
    }

    async fn update_item(
        &self,
        token: &str,
        item_id: ItemId,
        draft: &ItemDraft,
    ) -> Result<ItemRecord, RemoteError> {
        self.enter("update_item", Some(token))?;
        let mut backend = self.backend.lock();
        let record = backend
            .items
            .values_mut()
            .flatten()
            .find(|i| i.id == item_id)
            .ok_or(RemoteError::NotFound(Some("Item not found".into())))?;
        record.name = draft.name.clone();
        record.description = draft.description.clone();
        record.price = draft.price;
        record.stock = draft.stock;
        Ok(record.clone())
    }

    async fn delete_item(&self, token: &str, item_id: ItemId) -> Result<(), RemoteError> {
        self.enter("delete_item", Some(token))?;
        for items in self.backend.lock().items.values_mut() {
            items.retain(|i| i.id != item_id);
        }
        Ok(())
    }
}
