//! Client-side synchronization of mutable collections.
//!
//! Each synchronizer owns an in-memory projection of one server collection
//! and keeps it consistent through CRUD calls on a
//! [`RemoteClient`](crate::remote::RemoteClient):
//!
//! - [`CartSynchronizer`]: a customer's cart lines.
//! - [`InventorySynchronizer`]: a seller's shops and each shop's items.
//!
//! ## Write policy
//!
//! Writes are pessimistic. Local state only moves after the server confirmed
//! the change, either by refetching the collection (cart) or by folding the
//! canonical entity the server returned (inventory).
//!
//! ## Concurrency
//!
//! Operations take `&self` and may overlap. Local state sits behind a lock
//! that is never held across an `.await`. Overlapping writes to the same
//! entity are not serialized: the response that lands last wins. Deletes
//! carry a per-entity in-flight guard so the same entity can't be deleted
//! twice at once.
//!
//! There is no cancellation protocol. Dropping an operation's future
//! abandons the local fold, but a request already sent may still complete
//! on the server; the next refresh or load reconciles.

mod cart;
mod error;
mod inventory;

use std::collections::HashSet;
use std::hash::Hash;

use parking_lot::Mutex;

pub use cart::CartSynchronizer;
pub use error::{ErrorKind, Failure, Operation};
pub use inventory::{Confirm, Deletion, InventorySynchronizer};

/// Lifecycle of a synchronizer's collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing fetched yet.
    Idle,
    /// An operation is talking to the server.
    Loading,
    /// The collection matches the last server response.
    Ready,
    /// The last operation failed; the collection keeps its last good value.
    Error,
}

/// Set of entity keys with an outstanding mutation.
#[derive(Debug)]
pub(crate) struct InFlight<K> {
    keys: Mutex<HashSet<K>>,
}

impl<K: Eq + Hash + Copy> InFlight<K> {
    pub(crate) fn new() -> Self {
        Self {
            keys: Mutex::new(HashSet::new()),
        }
    }

    /// Marks `key` busy. Returns `None` if it already is.
    pub(crate) fn begin(&self, key: K) -> Option<InFlightGuard<'_, K>> {
        if self.keys.lock().insert(key) {
            Some(InFlightGuard { owner: self, key })
        } else {
            None
        }
    }

    pub(crate) fn contains(&self, key: K) -> bool {
        self.keys.lock().contains(&key)
    }
}

/// Releases the key when dropped, including when the future is dropped.
pub(crate) struct InFlightGuard<'a, K: Eq + Hash + Copy> {
    owner: &'a InFlight<K>,
    key: K,
}

impl<K: Eq + Hash + Copy> Drop for InFlightGuard<'_, K> {
    fn drop(&mut self) {
        self.owner.keys.lock().remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_flight_rejects_duplicate_until_released() {
        let in_flight = InFlight::new();

        let guard = in_flight.begin(7u64).unwrap();
        assert!(in_flight.contains(7));
        assert!(in_flight.begin(7).is_none());
        assert!(in_flight.begin(8).is_some());

        drop(guard);
        assert!(!in_flight.contains(7));
        assert!(in_flight.begin(7).is_some());
    }
}
