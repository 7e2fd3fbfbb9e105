//! # spares-db: Database Layer for Spares POS
//!
//! SQLite persistence for shops, parts, the sales ledger and admins, plus
//! the store-trait implementations the sale engine runs against.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Spares POS Data Flow                             │
//! │                                                                         │
//! │  POST /api/checkout                                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  spares_core::checkout(&db, requester, request)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     spares-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐   │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │   │   │
//! │  │   │               │    │ PartRepo      │    │              │   │   │
//! │  │   │ SqlitePool    │◄───│ ShopRepo      │    │ 001_initial_ │   │   │
//! │  │   │ store traits  │    │ SalesRepo     │    │   schema.sql │   │   │
//! │  │   │ (store.rs)    │    │ AdminRepo     │    │              │   │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘   │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  │                     ./data/spares.db                            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//! - [`store`] - `InventoryStore` / `SalesLedger` / `ShopDirectory` for `Database`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use spares_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./data/spares.db")).await?;
//! let parts = db.parts().list_by_owner("shop@example.com").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::admin::{Admin, AdminRepository};
pub use repository::generate_id;
pub use repository::part::{PartListing, PartRepository};
pub use repository::sales::{generate_invoice_number, SalesRepository};
pub use repository::shop::{ShopProfileUpdate, ShopRepository};
