use std::sync::Arc;

use parking_lot::Mutex;
use rust_decimal::Decimal;

use super::{Failure, InFlight, Operation, Phase};
use crate::models::{cart_total, CartLine, ItemId};
use crate::remote::RemoteClient;
use crate::session::SessionStore;

struct CartState {
    lines: Vec<CartLine>,
    phase: Phase,
    last_failure: Option<Failure>,
}

/// Local view of the signed-in customer's cart.
///
/// Every write is followed by a full refetch, so `lines()` only ever holds
/// what the server last returned.
///
/// Two overlapping quantity edits on the same line are not serialized; the
/// refresh that lands last decides the final state. Only `remove_line`
/// guards against a duplicate in-flight call for the same item.
pub struct CartSynchronizer {
    remote: Arc<dyn RemoteClient>,
    session: Arc<SessionStore>,
    state: Mutex<CartState>,
    removing: InFlight<ItemId>,
}

impl CartSynchronizer {
    pub fn new(remote: Arc<dyn RemoteClient>, session: Arc<SessionStore>) -> Self {
        Self {
            remote,
            session,
            state: Mutex::new(CartState {
                lines: Vec::new(),
                phase: Phase::Idle,
                last_failure: None,
            }),
            removing: InFlight::new(),
        }
    }

    /// Fetches the whole cart and replaces the local lines.
    ///
    /// On failure the previous lines are kept.
    pub async fn refresh(&self) -> Result<(), Failure> {
        let token = self.begin(Operation::FetchCart)?;
        match self.remote.get_cart(&token).await {
            Ok(lines) => {
                tracing::debug!(lines = lines.len(), "cart refreshed");
                let mut state = self.state.lock();
                state.lines = lines;
                state.phase = Phase::Ready;
                state.last_failure = None;
                Ok(())
            }
            Err(e) => Err(self.fail(Failure::from_remote(Operation::FetchCart, &e))),
        }
    }

    /// Sets the quantity of a line from raw user input, then refreshes.
    ///
    /// The input must be a whole number `>= 0`; anything else is rejected
    /// before any request. Zero is sent as an update, not a removal.
    pub async fn set_quantity(&self, item_id: ItemId, raw: &str) -> Result<(), Failure> {
        let quantity = parse_quantity(raw)?;
        let token = self.begin(Operation::UpdateCart)?;
        if let Err(e) = self
            .remote
            .update_cart_line(&token, item_id, quantity)
            .await
        {
            return Err(self.fail(Failure::from_remote(Operation::UpdateCart, &e)));
        }
        tracing::info!(item = %item_id, quantity, "cart quantity updated");
        self.refresh().await
    }

    /// Removes a line, then refreshes.
    ///
    /// Rejected locally while a removal of the same item is outstanding.
    pub async fn remove_line(&self, item_id: ItemId) -> Result<(), Failure> {
        let _removing = self.removing.begin(item_id).ok_or_else(|| {
            Failure::validation(
                Operation::RemoveCartLine,
                format!("Item {} is already being removed", item_id),
            )
        })?;
        let token = self.begin(Operation::RemoveCartLine)?;
        if let Err(e) = self.remote.delete_cart_line(&token, item_id).await {
            return Err(self.fail(Failure::from_remote(Operation::RemoveCartLine, &e)));
        }
        tracing::info!(item = %item_id, "cart line removed");
        self.refresh().await
    }

    /// Adds `quantity` of an item to the cart, then refreshes.
    pub async fn add(&self, item_id: ItemId, quantity: u32) -> Result<(), Failure> {
        if quantity == 0 {
            return Err(Failure::validation(
                Operation::AddToCart,
                "Quantity must be at least 1",
            ));
        }
        let token = self.begin(Operation::AddToCart)?;
        if let Err(e) = self.remote.add_cart_line(&token, item_id, quantity).await {
            return Err(self.fail(Failure::from_remote(Operation::AddToCart, &e)));
        }
        tracing::info!(item = %item_id, quantity, "added to cart");
        self.refresh().await
    }

    pub fn lines(&self) -> Vec<CartLine> {
        self.state.lock().lines.clone()
    }

    /// Sum of price × quantity over the current lines, to the cent.
    pub fn total(&self) -> Decimal {
        cart_total(&self.state.lock().lines)
    }

    pub fn phase(&self) -> Phase {
        self.state.lock().phase
    }

    pub fn last_failure(&self) -> Option<Failure> {
        self.state.lock().last_failure.clone()
    }

    pub fn is_removing(&self, item_id: ItemId) -> bool {
        self.removing.contains(item_id)
    }

    /// Enters `Loading` and returns the bearer token.
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

fn parse_quantity(raw: &str) -> Result<u32, Failure> {
    let value: i64 = raw.trim().parse().map_err(|_| {
        Failure::validation(
            Operation::UpdateCart,
            format!("Invalid quantity '{}'", raw.trim()),
        )
    })?;
    if value < 0 {
        return Err(Failure::validation(
            Operation::UpdateCart,
            "Quantity cannot be negative",
        ));
    }
    u32::try_from(value)
        .map_err(|_| Failure::validation(Operation::UpdateCart, "Quantity is too large"))
}
