use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;

use super::{Failure, InFlight, Operation, Phase};
use crate::models::{Item, ItemDraft, ItemId, Shop, ShopId};
use crate::remote::RemoteClient;
use crate::session::SessionStore;

const DELETE_SHOP_PROMPT: &str = "Are you sure you want to delete this shop? This action cannot be undone and will delete all items in your shop.";
const DELETE_ITEM_PROMPT: &str = "Are you sure you want to delete this item?";

/// Asks the user to confirm a destructive action.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Outcome of a confirmed delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    Deleted,
    /// The user said no; nothing was sent.
    Declined,
}

struct InventoryState {
    shops: IndexMap<ShopId, Shop>,
    items_by_shop: HashMap<ShopId, Vec<Item>>,
    selected_shop: Option<ShopId>,
    selected_item: Option<ItemId>,
    phase: Phase,
    last_failure: Option<Failure>,
}

impl InventoryState {
    /// Linear scan over every shop's items.
    fn owning_shop(&self, item_id: ItemId) -> Option<ShopId> {
        self.items_by_shop
            .iter()
            .find(|(_, items)| items.iter().any(|i| i.id == item_id))
            .map(|(shop_id, _)| *shop_id)
    }
}

/// A seller's shops and the items of each shop.
///
/// Shops keep server order. Every item lives under exactly one shop: items
/// are only ever inserted under the shop they were created in, stamped with
/// that shop's id.
///
/// Creates and updates fold the entity the server returns; deletes drop the
/// local entry once the server confirmed. If a shop disappears while an item
/// write for it is in flight, the late result is discarded.
pub struct InventorySynchronizer {
    remote: Arc<dyn RemoteClient>,
    session: Arc<SessionStore>,
    state: Mutex<InventoryState>,
    deleting_shops: InFlight<ShopId>,
    deleting_items: InFlight<ItemId>,
}

impl InventorySynchronizer {
    pub fn new(remote: Arc<dyn RemoteClient>, session: Arc<SessionStore>) -> Self {
        Self {
            remote,
            session,
            state: Mutex::new(InventoryState {
                shops: IndexMap::new(),
                items_by_shop: HashMap::new(),
                selected_shop: None,
                selected_item: None,
                phase: Phase::Idle,
                last_failure: None,
            }),
            deleting_shops: InFlight::new(),
            deleting_items: InFlight::new(),
        }
    }

    /// Fetches all shops, then each shop's items one after another.
    ///
    /// Either everything is replaced or nothing is: the first failing
    /// request aborts the load and the previous state stays.
    pub async fn load_all(&self) -> Result<(), Failure> {
        let operation = Operation::LoadInventory;
        let token = self.begin(operation)?;

        let shops = self
            .remote
            .list_shops(&token)
            .await
            .map_err(|e| self.fail(Failure::from_remote(operation, &e)))?;

        let mut items_by_shop = HashMap::with_capacity(shops.len());
        for shop in &shops {
            let records = self
                .remote
                .list_shop_items(&token, shop.id)
                .await
                .map_err(|e| self.fail(Failure::from_remote(operation, &e)))?;
            let items = records
                .into_iter()
                .map(|r| Item::from_record(r, shop.id))
                .collect::<Vec<_>>();
            items_by_shop.insert(shop.id, items);
        }

        let mut state = self.state.lock();
        state.shops = shops.into_iter().map(|s| (s.id, s)).collect();
        state.items_by_shop = items_by_shop;
        let selected = state
            .selected_shop
            .filter(|id| state.shops.contains_key(id))
            .or_else(|| state.shops.keys().next().copied());
        state.selected_shop = selected;
        if let Some(item_id) = state.selected_item {
            if state.owning_shop(item_id).is_none() {
                state.selected_item = None;
            }
        }
        state.phase = Phase::Ready;
        state.last_failure = None;
        tracing::debug!(
            shops = state.shops.len(),
            items = state.items_by_shop.values().map(Vec::len).sum::<usize>(),
            "inventory loaded"
        );
        Ok(())
    }

    /// Creates a shop and starts it with an empty item list.
    pub async fn create_shop(&self, name: &str, description: &str) -> Result<Shop, Failure> {
        let operation = Operation::CreateShop;
        let token = self.begin(operation)?;
        let shop = self
            .remote
            .create_shop(&token, name, description)
            .await
            .map_err(|e| self.fail(Failure::from_remote(operation, &e)))?;

        let mut state = self.state.lock();
        state.shops.insert(shop.id, shop.clone());
        state.items_by_shop.entry(shop.id).or_default();
        if state.selected_shop.is_none() {
            state.selected_shop = Some(shop.id);
        }
        state.phase = Phase::Ready;
        tracing::info!(shop = %shop.id, name = %shop.name, "shop created");
        Ok(shop)
    }

    /// Deletes a shop and, with it, all of its items.
    pub async fn delete_shop(
        &self,
        shop_id: ShopId,
        confirm: &impl Confirm,
    ) -> Result<Deletion, Failure> {
        let operation = Operation::DeleteShop;
        if !self.state.lock().shops.contains_key(&shop_id) {
            return Err(self.fail(Failure::not_found(
                operation,
                format!("Shop {} not found", shop_id),
            )));
        }
        let _deleting = self.deleting_shops.begin(shop_id).ok_or_else(|| {
            Failure::validation(operation, format!("Shop {} is already being deleted", shop_id))
        })?;
        if !confirm.confirm(DELETE_SHOP_PROMPT) {
            return Ok(Deletion::Declined);
        }

        let token = self.begin(operation)?;
        self.remote
            .delete_shop(&token, shop_id)
            .await
            .map_err(|e| self.fail(Failure::from_remote(operation, &e)))?;

        let mut state = self.state.lock();
        state.shops.shift_remove(&shop_id);
        let removed = state.items_by_shop.remove(&shop_id).unwrap_or_default();
        if state.selected_shop == Some(shop_id) {
            state.selected_shop = state.shops.keys().next().copied();
        }
        if let Some(item_id) = state.selected_item {
            if removed.iter().any(|i| i.id == item_id) {
                state.selected_item = None;
            }
        }
        state.phase = Phase::Ready;
        tracing::info!(shop = %shop_id, items = removed.len(), "shop deleted");
        Ok(Deletion::Deleted)
    }

    /// Adds an item to a known shop.
    pub async fn add_item(&self, shop_id: ShopId, draft: &ItemDraft) -> Result<Item, Failure> {
        let operation = Operation::CreateItem;
        if !self.state.lock().shops.contains_key(&shop_id) {
            return Err(Failure::validation(operation, "Please select a shop first"));
        }
        let token = self.begin(operation)?;
        let record = self
            .remote
            .create_item(&token, shop_id, draft)
            .await
            .map_err(|e| self.fail(Failure::from_remote(operation, &e)))?;
        let item = Item::from_record(record, shop_id);

        let mut state = self.state.lock();
        state.phase = Phase::Ready;
        match state.items_by_shop.get_mut(&shop_id) {
            // A reload that finished while the create was in flight may
            // already hold the new item.
            Some(items) => match items.iter().position(|i| i.id == item.id) {
                Some(index) => items[index] = item.clone(),
                None => items.push(item.clone()),
            },
            None => tracing::debug!(shop = %shop_id, "shop gone, dropping created item"),
        }
        tracing::info!(shop = %shop_id, item = %item.id, "item added");
        Ok(item)
    }

    /// Replaces an item's fields.
    ///
    /// The owning shop is found by scanning every shop's items, so the cost
    /// grows with the total number of items held.
    pub async fn update_item(&self, item_id: ItemId, draft: &ItemDraft) -> Result<Item, Failure> {
        let operation = Operation::UpdateItem;
        let shop_id = match self.owning_shop(item_id) {
            Some(shop_id) => shop_id,
            None => {
                return Err(self.fail(Failure::not_found(
                    operation,
                    format!("Item {} not found", item_id),
                )))
            }
        };
        let token = self.begin(operation)?;
        let record = self
            .remote
            .update_item(&token, item_id, draft)
            .await
            .map_err(|e| self.fail(Failure::from_remote(operation, &e)))?;
        let item = Item::from_record(record, shop_id);

        let mut state = self.state.lock();
        state.phase = Phase::Ready;
        if let Some(slot) = state
            .items_by_shop
            .get_mut(&shop_id)
            .and_then(|items| items.iter_mut().find(|i| i.id == item_id))
        {
            *slot = item.clone();
        }
        if state.selected_item == Some(item_id) {
            state.selected_item = None;
        }
        tracing::info!(shop = %shop_id, item = %item_id, "item updated");
        Ok(item)
    }

    /// Deletes an item from `shop_id`.
    pub async fn delete_item(
        &self,
        item_id: ItemId,
        shop_id: ShopId,
        confirm: &impl Confirm,
    ) -> Result<Deletion, Failure> {
        let operation = Operation::DeleteItem;
        let _deleting = self.deleting_items.begin(item_id).ok_or_else(|| {
            Failure::validation(operation, format!("Item {} is already being deleted", item_id))
        })?;
        if !confirm.confirm(DELETE_ITEM_PROMPT) {
            return Ok(Deletion::Declined);
        }

        let token = self.begin(operation)?;
        self.remote
            .delete_item(&token, item_id)
            .await
            .map_err(|e| self.fail(Failure::from_remote(operation, &e)))?;

        let mut state = self.state.lock();
        if let Some(items) = state.items_by_shop.get_mut(&shop_id) {
            items.retain(|i| i.id != item_id);
        }
        if state.selected_item == Some(item_id) {
            state.selected_item = None;
        }
        state.phase = Phase::Ready;
        tracing::info!(shop = %shop_id, item = %item_id, "item deleted");
        Ok(Deletion::Deleted)
    }

    /// Shops in server order.
    pub fn shops(&self) -> Vec<Shop> {
        self.state.lock().shops.values().cloned().collect()
    }

    pub fn shop(&self, shop_id: ShopId) -> Option<Shop> {
        self.state.lock().shops.get(&shop_id).cloned()
    }

    /// Items of a shop. Empty for unknown shops.
    pub fn items(&self, shop_id: ShopId) -> Vec<Item> {
        self.state
            .lock()
            .items_by_shop
            .get(&shop_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn item(&self, item_id: ItemId) -> Option<Item> {
        let state = self.state.lock();
        state
            .items_by_shop
            .values()
            .flatten()
            .find(|i| i.id == item_id)
            .cloned()
    }

    pub fn owning_shop(&self, item_id: ItemId) -> Option<ShopId> {
        self.state.lock().owning_shop(item_id)
    }

    /// Selects a known shop. Returns false and keeps the selection otherwise.
    pub fn select_shop(&self, shop_id: ShopId) -> bool {
        let mut state = self.state.lock();
        if !state.shops.contains_key(&shop_id) {
            return false;
        }
        state.selected_shop = Some(shop_id);
        true
    }

    /// Selects a held item for editing.
    pub fn select_item(&self, item_id: ItemId) -> bool {
        let mut state = self.state.lock();
        if state.owning_shop(item_id).is_none() {
            return false;
        }
        state.selected_item = Some(item_id);
        true
    }

    pub fn selected_shop(&self) -> Option<ShopId> {
        self.state.lock().selected_shop
    }

    pub fn selected_item(&self) -> Option<ItemId> {
        self.state.lock().selected_item
    }

    pub fn phase(&self) -> Phase {
        self.state.lock().phase
    }

    pub fn last_failure(&self) -> Option<Failure> {
        self.state.lock().last_failure.clone()
    }

    fn begin(&self, operation: Operation) -> Result<String, Failure> {
        let token = self
            .session
            .token()
            .ok_or_else(|| self.fail(Failure::signed_out(operation)))?;
        self.state.lock().phase = Phase::Loading;
        Ok(token)
    }

    fn fail(&self, failure: Failure) -> Failure {
        tracing::debug!(operation = ?failure.operation, kind = %failure.kind, "{}", failure);
        let mut state = self.state.lock();
        state.phase = Phase::Error;
        state.last_failure = Some(failure.clone());
        failure
    }
}
