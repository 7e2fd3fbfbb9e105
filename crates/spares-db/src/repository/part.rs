//! # Part Repository
//!
//! Database operations for the parts inventory.
//!
//! ## Stock Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Conditional Decrement (one statement)                  │
//! │                                                                         │
//! │  UPDATE parts                                                          │
//! │     SET quantity_owned = quantity_owned - :n                           │
//! │   WHERE id = :id AND quantity_owned >= :n                              │
//! │  RETURNING *                                                           │
//! │                                                                         │
//! │  Checkout A (n=4) ─┐                                                   │
//! │                    ├──► stock 5: first writer wins, stock 1            │
//! │  Checkout B (n=3) ─┘     second matches no row → Conflict              │
//! │                                                                         │
//! │  Stock can never go below zero, whatever the interleaving.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{gst_column, money_column};
use spares_core::{GstRate, Part};

const PART_COLUMNS: &str = "id, owner_email, part_number, name, description, price, \
     original_price, quantity_owned, gst_rate, hsn_code, image, created_at, updated_at";

/// A `parts` row as stored.
#[derive(Debug, FromRow)]
struct PartRow {
    id: String,
    owner_email: String,
    part_number: String,
    name: String,
    description: String,
    price: String,
    original_price: String,
    quantity_owned: i64,
    gst_rate: i64,
    hsn_code: Option<String>,
    image: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PartRow> for Part {
    type Error = DbError;

    fn try_from(row: PartRow) -> DbResult<Part> {
        Ok(Part {
            price: money_column("price", &row.price)?,
            original_price: money_column("original_price", &row.original_price)?,
            gst_rate: gst_column(row.gst_rate)?,
            id: row.id,
            owner_email: row.owner_email,
            part_number: row.part_number,
            name: row.name,
            description: row.description,
            quantity_owned: row.quantity_owned,
            hsn_code: row.hsn_code,
            image: row.image,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_parts(rows: Vec<PartRow>) -> DbResult<Vec<Part>> {
    rows.into_iter().map(Part::try_from).collect()
}

/// A part with the public details of the shop that stocks it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartListing {
    #[serde(flatten)]
    pub part: Part,
    pub shop_name: String,
    pub shop_location: String,
    pub phone: String,
}

#[derive(Debug, FromRow)]
struct PartListingRow {
    #[sqlx(flatten)]
    part: PartRow,
    shop_name: String,
    shop_location: String,
    phone: String,
}

/// Repository for part database operations.
#[derive(Debug, Clone)]
pub struct PartRepository {
    pool: SqlitePool,
}

impl PartRepository {
    /// Creates a new PartRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PartRepository { pool }
    }

    /// Every part of every shop, newest first.
    pub async fn list_all(&self) -> DbResult<Vec<Part>> {
        let rows = sqlx::query_as::<_, PartRow>(&format!(
            "SELECT {PART_COLUMNS} FROM parts ORDER BY created_at DESC, rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        into_parts(rows)
    }

    /// One shop's parts, newest first.
    pub async fn list_by_owner(&self, owner_email: &str) -> DbResult<Vec<Part>> {
        let rows = sqlx::query_as::<_, PartRow>(&format!(
            "SELECT {PART_COLUMNS} FROM parts WHERE owner_email = ?1 \
             ORDER BY created_at DESC, rowid DESC"
        ))
        .bind(owner_email)
        .fetch_all(&self.pool)
        .await?;

        debug!(owner = %owner_email, count = rows.len(), "Listed parts");
        into_parts(rows)
    }

    /// Parts filed under an HSN code, across all shops.
    pub async fn list_by_hsn(&self, hsn_code: &str) -> DbResult<Vec<Part>> {
        let rows = sqlx::query_as::<_, PartRow>(&format!(
            "SELECT {PART_COLUMNS} FROM parts WHERE hsn_code = ?1 ORDER BY name"
        ))
        .bind(hsn_code)
        .fetch_all(&self.pool)
        .await?;

        into_parts(rows)
    }

    /// Gets a part by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Part))` - Part found
    /// * `Ok(None)` - Part not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Part>> {
        let row = sqlx::query_as::<_, PartRow>(&format!(
            "SELECT {PART_COLUMNS} FROM parts WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Part::try_from).transpose()
    }

    /// Inserts a new part.
    ///
    /// ## Returns
    /// * `Err(DbError::ForeignKeyViolation)` - No shop has `owner_email`
    pub async fn insert(&self, part: &Part) -> DbResult<Part> {
        debug!(id = %part.id, owner = %part.owner_email, "Inserting part");

        sqlx::query(&format!(
            "INSERT INTO parts ({PART_COLUMNS}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
        ))
        .bind(&part.id)
        .bind(&part.owner_email)
        .bind(&part.part_number)
        .bind(&part.name)
        .bind(&part.description)
        .bind(part.price.to_storage_string())
        .bind(part.original_price.to_storage_string())
        .bind(part.quantity_owned)
        .bind(i64::from(part.gst_rate.percent()))
        .bind(&part.hsn_code)
        .bind(&part.image)
        .bind(part.created_at)
        .bind(part.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(part.clone())
    }

    /// Writes an edited part back. Only the owner's row is touched.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No such part for this owner
    pub async fn update(&self, part: &Part) -> DbResult<()> {
        debug!(id = %part.id, "Updating part");

        let result = sqlx::query(
            r#"
            UPDATE parts SET
                part_number = ?3,
                name = ?4,
                description = ?5,
                price = ?6,
                original_price = ?7,
                quantity_owned = ?8,
                gst_rate = ?9,
                hsn_code = ?10,
                image = ?11,
                updated_at = ?12
            WHERE id = ?1 AND owner_email = ?2
            "#,
        )
        .bind(&part.id)
        .bind(&part.owner_email)
        .bind(&part.part_number)
        .bind(&part.name)
        .bind(&part.description)
        .bind(part.price.to_storage_string())
        .bind(part.original_price.to_storage_string())
        .bind(part.quantity_owned)
        .bind(i64::from(part.gst_rate.percent()))
        .bind(&part.hsn_code)
        .bind(&part.image)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Part", &part.id));
        }

        Ok(())
    }

    /// Sets a part's GST slab and HSN code.
    pub async fn update_gst(
        &self,
        id: &str,
        owner_email: &str,
        gst_rate: GstRate,
        hsn_code: Option<&str>,
    ) -> DbResult<()> {
        debug!(id = %id, rate = %gst_rate, "Updating part GST");

        let result = sqlx::query(
            r#"
            UPDATE parts
            SET gst_rate = ?3, hsn_code = ?4, updated_at = ?5
            WHERE id = ?1 AND owner_email = ?2
            "#,
        )
        .bind(id)
        .bind(owner_email)
        .bind(i64::from(gst_rate.percent()))
        .bind(hsn_code)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Part", id));
        }

        Ok(())
    }

    /// Removes a part owned by `owner_email`.
    pub async fn delete(&self, id: &str, owner_email: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting part");

        let result = sqlx::query("DELETE FROM parts WHERE id = ?1 AND owner_email = ?2")
            .bind(id)
            .bind(owner_email)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Part", id));
        }

        Ok(())
    }

    /// Removes `amount` units if at least that many are in stock.
    ///
    /// ## Returns
    /// * `Ok(Some(Part))` - Decremented; the part as it now stands
    /// * `Ok(None)` - Missing part or not enough stock; nothing changed
    pub async fn decrement_if_available(&self, id: &str, amount: i64) -> DbResult<Option<Part>> {
        debug!(id = %id, amount = %amount, "Decrementing stock");

        let row = sqlx::query_as::<_, PartRow>(&format!(
            "UPDATE parts \
             SET quantity_owned = quantity_owned - ?2, updated_at = ?3 \
             WHERE id = ?1 AND quantity_owned >= ?2 \
             RETURNING {PART_COLUMNS}"
        ))
        .bind(id)
        .bind(amount)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Part::try_from).transpose()
    }

    /// All parts joined with their shop's public details, newest first.
    pub async fn list_with_shop(&self) -> DbResult<Vec<PartListing>> {
        let rows = sqlx::query_as::<_, PartListingRow>(
            r#"
            SELECT
                p.id, p.owner_email, p.part_number, p.name, p.description,
                p.price, p.original_price, p.quantity_owned, p.gst_rate,
                p.hsn_code, p.image, p.created_at, p.updated_at,
                s.shop_name, s.shop_location, s.phone
            FROM parts p
            INNER JOIN shop_owners s ON s.email = p.owner_email
            ORDER BY p.created_at DESC, p.rowid DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(PartListing {
                    part: Part::try_from(row.part)?,
                    shop_name: row.shop_name,
                    shop_location: row.shop_location,
                    phone: row.phone,
                })
            })
            .collect()
    }

    /// The `limit` most recently added parts.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<Part>> {
        let rows = sqlx::query_as::<_, PartRow>(&format!(
            "SELECT {PART_COLUMNS} FROM parts ORDER BY created_at DESC, rowid DESC LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        into_parts(rows)
    }

    /// Counts all parts.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM parts")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::{part, seeded, shop, test_db};
    use spares_core::Money;

    const SHOP: &str = "shop@example.com";

    #[tokio::test]
    async fn test_insert_and_get_round_trips_money_exactly() {
        let mut brake = part(SHOP, "Brake Pad", 100, 10, GstRate::Eighteen);
        brake.price = Money::parse("1234.56").unwrap();
        let db = seeded(SHOP, &[brake.clone()]).await;

        let stored = db.parts().get_by_id(&brake.id).await.unwrap().unwrap();
        assert_eq!(stored.price, Money::from_paise(123456));
        assert_eq!(stored.gst_rate, GstRate::Eighteen);
        assert_eq!(stored.hsn_code.as_deref(), Some("8708"));
        assert!(db.parts().get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_requires_existing_shop() {
        let db = test_db().await;
        let orphan = part("nobody@example.com", "Clutch", 500, 1, GstRate::Twelve);

        let err = db.parts().insert(&orphan).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_decrement_is_conditional() {
        let brake = part(SHOP, "Brake Pad", 100, 5, GstRate::Eighteen);
        let db = seeded(SHOP, &[brake.clone()]).await;
        let repo = db.parts();

        let after = repo.decrement_if_available(&brake.id, 4).await.unwrap().unwrap();
        assert_eq!(after.quantity_owned, 1);

        assert!(repo.decrement_if_available(&brake.id, 3).await.unwrap().is_none());
        assert!(repo.decrement_if_available("missing", 1).await.unwrap().is_none());

        let stored = repo.get_by_id(&brake.id).await.unwrap().unwrap();
        assert_eq!(stored.quantity_owned, 1);
    }

    #[tokio::test]
    async fn test_update_and_delete_are_owner_scoped() {
        let brake = part(SHOP, "Brake Pad", 100, 5, GstRate::Eighteen);
        let db = seeded(SHOP, &[brake.clone()]).await;
        let repo = db.parts();

        let mut stolen = brake.clone();
        stolen.owner_email = "thief@example.com".into();
        stolen.name = "Renamed".into();
        assert!(matches!(repo.update(&stolen).await, Err(DbError::NotFound { .. })));
        assert!(matches!(
            repo.delete(&brake.id, "thief@example.com").await,
            Err(DbError::NotFound { .. })
        ));

        let mut edited = brake.clone();
        edited.name = "Brake Pad (Front)".into();
        repo.update(&edited).await.unwrap();
        assert_eq!(
            repo.get_by_id(&brake.id).await.unwrap().unwrap().name,
            "Brake Pad (Front)"
        );

        repo.delete(&brake.id, SHOP).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_gst_and_hsn_lookup() {
        let brake = part(SHOP, "Brake Pad", 100, 5, GstRate::Eighteen);
        let db = seeded(SHOP, &[brake.clone()]).await;
        let repo = db.parts();

        repo.update_gst(&brake.id, SHOP, GstRate::TwentyEight, Some("87083000"))
            .await
            .unwrap();

        let by_hsn = repo.list_by_hsn("87083000").await.unwrap();
        assert_eq!(by_hsn.len(), 1);
        assert_eq!(by_hsn[0].gst_rate, GstRate::TwentyEight);
        assert!(repo.list_by_hsn("8708").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_listing_joins_shop_and_orders_newest_first() {
        let db = test_db().await;
        db.shops().insert(&shop(SHOP, None)).await.unwrap();

        let older = part(SHOP, "Older", 10, 1, GstRate::Five);
        let mut newer = part(SHOP, "Newer", 10, 1, GstRate::Five);
        newer.created_at = older.created_at + chrono::Duration::seconds(5);
        db.parts().insert(&older).await.unwrap();
        db.parts().insert(&newer).await.unwrap();

        let listed = db.parts().list_with_shop().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].part.name, "Newer");
        assert_eq!(listed[0].shop_name, "Ravi Auto Spares");

        let recent = db.parts().recent(1).await.unwrap();
        assert_eq!(recent[0].name, "Newer");
    }

    #[tokio::test]
    async fn test_negative_stock_rejected_by_schema() {
        let mut broken = part(SHOP, "Broken", 10, 1, GstRate::Five);
        broken.quantity_owned = -1;
        let db = seeded(SHOP, &[]).await;

        let err = db.parts().insert(&broken).await.unwrap_err();
        assert!(matches!(err, DbError::ConstraintViolation(_)));
    }
}
