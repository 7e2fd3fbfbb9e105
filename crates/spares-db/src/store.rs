//! # Store Trait Implementations
//!
//! Plugs [`Database`] into the sale engine.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  spares_core::execute_sale(&db, ...)                                   │
//! │       │                                                                 │
//! │       ├── InventoryStore::get_part          → PartRepository::get_by_id │
//! │       ├── InventoryStore::decrement_quantity                            │
//! │       │        → PartRepository::decrement_if_available                 │
//! │       ├── SalesLedger::append_record        → SalesRepository::append   │
//! │       └── ShopDirectory::get_shop_by_email  → ShopRepository            │
//! │                                                                         │
//! │  DbError → StoreError::{Unavailable, Rejected}                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use spares_core::{
    Decrement, InventoryStore, NewSaleRecord, Part, SalesLedger, ShopDirectory, ShopOwner,
    StoreError,
};

use crate::pool::Database;

#[async_trait]
impl InventoryStore for Database {
    async fn get_part(&self, id: &str) -> Result<Option<Part>, StoreError> {
        Ok(self.parts().get_by_id(id).await?)
    }

    async fn decrement_quantity(&self, id: &str, amount: i64) -> Result<Decrement, StoreError> {
        Ok(match self.parts().decrement_if_available(id, amount).await? {
            Some(part) => Decrement::Applied(part),
            None => Decrement::Conflict,
        })
    }
}

#[async_trait]
impl SalesLedger for Database {
    async fn append_record(&self, record: &NewSaleRecord) -> Result<String, StoreError> {
        Ok(self.sales().append(record).await?)
    }
}

#[async_trait]
impl ShopDirectory for Database {
    async fn get_shop_by_email(&self, email: &str) -> Result<Option<ShopOwner>, StoreError> {
        Ok(self.shops().get_by_email(email).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
