//! # Repository Module
//!
//! Database repository implementations for Spares POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │  db.parts().list_by_owner("shop@example.com")                  │
//! │       ▼                                                                 │
//! │  PartRepository                                                        │
//! │  ├── list_by_owner / get_by_id / insert / update / delete              │
//! │  └── decrement_if_available  (UPDATE ... WHERE quantity_owned >= ?)    │
//! │       │                                                                 │
//! │       │  SQL → PartRow (FromRow) → TryFrom → spares_core::Part         │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Row structs mirror the tables column for column. Money lives in TEXT
//! columns and GST slabs in INTEGER columns, so conversion into domain
//! types is fallible and reported as [`DbError::InvalidData`].
//!
//! ## Available Repositories
//!
//! - [`PartRepository`](part::PartRepository) - Inventory CRUD and stock decrement
//! - [`ShopRepository`](shop::ShopRepository) - Shop owner accounts
//! - [`SalesRepository`](sales::SalesRepository) - Append-only sales ledger
//! - [`AdminRepository`](admin::AdminRepository) - Back-office accounts

pub mod admin;
pub mod part;
pub mod sales;
pub mod shop;

use spares_core::{GstRate, Money};
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// Generates a new row ID.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

fn money_column(column: &str, raw: &str) -> DbResult<Money> {
    Money::parse(raw).map_err(|e| DbError::InvalidData(format!("{column} = '{raw}': {e}")))
}

fn gst_column(raw: i64) -> DbResult<GstRate> {
    GstRate::from_percent(raw)
        .ok_or_else(|| DbError::InvalidData(format!("gst_rate = {raw} is not a GST slab")))
}

// =============================================================================
// Test Fixtures
// =============================================================================

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::Utc;
    use spares_core::{GstRate, Money, Part, PartDraft, ShopOwner};

    use crate::pool::{Database, DbConfig};

    pub async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub fn shop(email: &str, gst_number: Option<&str>) -> ShopOwner {
        let now = Utc::now();
        ShopOwner {
            id: super::generate_id(),
            email: email.to_string(),
            owner_name: "Ravi Kumar".into(),
            shop_name: "Ravi Auto Spares".into(),
            shop_location: "MG Road, Pune".into(),
            phone: "9876543210".into(),
            gst_number: gst_number.map(str::to_string),
            password_hash: "not-a-real-hash".into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn part(owner: &str, name: &str, price: i64, qty: i64, rate: GstRate) -> Part {
        Part::from_draft(
            super::generate_id(),
            owner,
            PartDraft {
                part_number: format!("PN-{name}"),
                name: name.to_string(),
                description: format!("{name} for testing"),
                price: Money::from_rupees(price),
                original_price: Money::from_rupees(price + 20),
                quantity_owned: qty,
                gst_rate: rate,
                hsn_code: Some("8708".into()),
                image: None,
            },
            Utc::now(),
        )
    }

    /// A database holding one shop with the given parts.
    pub async fn seeded(email: &str, parts: &[Part]) -> Database {
        let db = test_db().await;
        db.shops().insert(&shop(email, None)).await.unwrap();
        for p in parts {
            db.parts().insert(p).await.unwrap();
        }
        db
    }
}
