use std::sync::Arc;

use crate::models::CatalogItem;
use crate::remote::RemoteClient;
use crate::sync::{Failure, Operation};

/// Public listing of every item for sale.
pub struct Catalog {
    remote: Arc<dyn RemoteClient>,
}

impl Catalog {
    pub fn new(remote: Arc<dyn RemoteClient>) -> Self {
        Self { remote }
    }

    /// Lists all items with their shop names. Needs no session.
    pub async fn browse(&self) -> Result<Vec<CatalogItem>, Failure> {
        let items = self
            .remote
            .list_items()
            .await
            .map_err(|e| Failure::from_remote(Operation::Browse, &e))?;
        tracing::debug!(items = items.len(), "catalog fetched");
        Ok(items)
    }
}
