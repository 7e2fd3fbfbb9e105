//! # Store Traits
//!
//! The storage seams the sale executor is written against.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   sale::execute_sale ──► InventoryStore   get_part / decrement_quantity │
//! │          │                                                              │
//! │          ├────────────► SalesLedger      append_record (append-only)    │
//! │          │                                                              │
//! │   sale::checkout ─────► ShopDirectory    get_shop_by_email (read-only)  │
//! │                                                                         │
//! │   spares-db implements all three on `Database`.                         │
//! │   Tests implement them on an in-memory map.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::{NewSaleRecord, Part, ShopOwner};

/// Result of a conditional stock decrement.
#[derive(Debug, Clone, PartialEq)]
pub enum Decrement {
    /// Stock was reduced; carries the part as it now stands.
    Applied(Part),
    /// The part is gone or holds fewer units than requested. Nothing changed.
    Conflict,
}

/// Parts and their stock.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Fetches a part by id.
    async fn get_part(&self, id: &str) -> Result<Option<Part>, StoreError>;

    /// Removes `amount` units if, and only if, at least `amount` are in
    /// stock. Must be atomic with respect to other decrements.
    async fn decrement_quantity(&self, id: &str, amount: i64) -> Result<Decrement, StoreError>;
}

/// The append-only sales history.
#[async_trait]
pub trait SalesLedger: Send + Sync {
    /// Stores a record and returns its id.
    async fn append_record(&self, record: &NewSaleRecord) -> Result<String, StoreError>;
}

/// Registered shops.
#[async_trait]
pub trait ShopDirectory: Send + Sync {
    async fn get_shop_by_email(&self, email: &str) -> Result<Option<ShopOwner>, StoreError>;
}
