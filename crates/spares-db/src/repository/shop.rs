//! # Shop Repository
//!
//! Shop owner accounts. The email is the shop's identity across the
//! system: parts reference it, sales records copy it.
//!
//! ```text
//!   email change ──► parts.owner_email follows (ON UPDATE CASCADE)
//!                    sales_history.shop_email keeps the old value
//!   shop delete  ──► parts removed (ON DELETE CASCADE)
//!                    sales_history untouched
//! ```

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use spares_core::ShopOwner;

const SHOP_COLUMNS: &str = "id, email, owner_name, shop_name, shop_location, phone, \
     gst_number, password_hash, created_at, updated_at";

#[derive(Debug, FromRow)]
struct ShopRow {
    id: String,
    email: String,
    owner_name: String,
    shop_name: String,
    shop_location: String,
    phone: String,
    gst_number: Option<String>,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ShopRow> for ShopOwner {
    fn from(row: ShopRow) -> Self {
        ShopOwner {
            id: row.id,
            email: row.email,
            owner_name: row.owner_name,
            shop_name: row.shop_name,
            shop_location: row.shop_location,
            phone: row.phone,
            gst_number: row.gst_number,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn into_shops(rows: Vec<ShopRow>) -> Vec<ShopOwner> {
    rows.into_iter().map(ShopOwner::from).collect()
}

/// Validated profile fields an owner may change.
#[derive(Debug, Clone, PartialEq)]
pub struct ShopProfileUpdate {
    pub email: String,
    pub owner_name: String,
    pub shop_name: String,
    pub shop_location: String,
    pub phone: String,
    pub gst_number: Option<String>,
}

/// Repository for shop owner accounts.
#[derive(Debug, Clone)]
pub struct ShopRepository {
    pool: SqlitePool,
}

impl ShopRepository {
    /// Creates a new ShopRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ShopRepository { pool }
    }

    /// Registers a shop.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - Email already registered
    pub async fn insert(&self, shop: &ShopOwner) -> DbResult<()> {
        debug!(email = %shop.email, "Inserting shop owner");

        sqlx::query(&format!(
            "INSERT INTO shop_owners ({SHOP_COLUMNS}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
        ))
        .bind(&shop.id)
        .bind(&shop.email)
        .bind(&shop.owner_name)
        .bind(&shop.shop_name)
        .bind(&shop.shop_location)
        .bind(&shop.phone)
        .bind(&shop.gst_number)
        .bind(&shop.password_hash)
        .bind(shop.created_at)
        .bind(shop.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_email(e, &shop.email))?;

        Ok(())
    }

    /// Gets a shop by its email.
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<ShopOwner>> {
        let row = sqlx::query_as::<_, ShopRow>(&format!(
            "SELECT {SHOP_COLUMNS} FROM shop_owners WHERE email = ?1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ShopOwner::from))
    }

    /// Checks whether an email is registered.
    pub async fn email_exists(&self, email: &str) -> DbResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM shop_owners WHERE email = ?1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    /// Rewrites the profile of the shop at `current_email` and returns it
    /// as stored.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No shop at `current_email`
    /// * `Err(DbError::UniqueViolation)` - `update.email` belongs to another shop
    pub async fn update_profile(
        &self,
        current_email: &str,
        update: &ShopProfileUpdate,
    ) -> DbResult<ShopOwner> {
        debug!(email = %current_email, new_email = %update.email, "Updating shop profile");

        let result = sqlx::query(
            r#"
            UPDATE shop_owners SET
                email = ?2,
                owner_name = ?3,
                shop_name = ?4,
                shop_location = ?5,
                phone = ?6,
                gst_number = ?7,
                updated_at = ?8
            WHERE email = ?1
            "#,
        )
        .bind(current_email)
        .bind(&update.email)
        .bind(&update.owner_name)
        .bind(&update.shop_name)
        .bind(&update.shop_location)
        .bind(&update.phone)
        .bind(&update.gst_number)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_email(e, &update.email))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Shop", current_email));
        }

        self.get_by_email(&update.email)
            .await?
            .ok_or_else(|| DbError::not_found("Shop", &update.email))
    }

    /// Replaces the stored password hash.
    pub async fn update_password(&self, email: &str, password_hash: &str) -> DbResult<()> {
        debug!(email = %email, "Updating shop password");

        let result = sqlx::query(
            "UPDATE shop_owners SET password_hash = ?2, updated_at = ?3 WHERE email = ?1",
        )
        .bind(email)
        .bind(password_hash)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Shop", email));
        }

        Ok(())
    }

    /// Sets the shop's GSTIN.
    pub async fn update_gst(&self, email: &str, gst_number: &str) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE shop_owners SET gst_number = ?2, updated_at = ?3 WHERE email = ?1",
        )
        .bind(email)
        .bind(gst_number)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Shop", email));
        }

        Ok(())
    }

    /// All shops, newest first.
    pub async fn list_all(&self) -> DbResult<Vec<ShopOwner>> {
        let rows = sqlx::query_as::<_, ShopRow>(&format!(
            "SELECT {SHOP_COLUMNS} FROM shop_owners ORDER BY created_at DESC, rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(into_shops(rows))
    }

    /// The `limit` most recently registered shops.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<ShopOwner>> {
        let rows = sqlx::query_as::<_, ShopRow>(&format!(
            "SELECT {SHOP_COLUMNS} FROM shop_owners \
             ORDER BY created_at DESC, rowid DESC LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(into_shops(rows))
    }

    /// Shops with a non-blank GSTIN, by name.
    pub async fn list_with_gst(&self) -> DbResult<Vec<ShopOwner>> {
        let rows = sqlx::query_as::<_, ShopRow>(&format!(
            "SELECT {SHOP_COLUMNS} FROM shop_owners \
             WHERE gst_number IS NOT NULL AND TRIM(gst_number) <> '' \
             ORDER BY shop_name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(into_shops(rows))
    }

    /// Shops with no GSTIN on file, by name.
    pub async fn list_without_gst(&self) -> DbResult<Vec<ShopOwner>> {
        let rows = sqlx::query_as::<_, ShopRow>(&format!(
            "SELECT {SHOP_COLUMNS} FROM shop_owners \
             WHERE gst_number IS NULL OR TRIM(gst_number) = '' \
             ORDER BY shop_name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(into_shops(rows))
    }

    /// Deletes a shop and, through the cascade, its parts. Sales history
    /// is kept. Returns how many parts went with it.
    pub async fn delete(&self, email: &str) -> DbResult<u64> {
        let mut tx = self.pool.begin().await?;

        let parts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM parts WHERE owner_email = ?1")
            .bind(email)
            .fetch_one(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM shop_owners WHERE email = ?1")
            .bind(email)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Shop", email));
        }

        tx.commit().await?;

        info!(email = %email, parts_removed = parts, "Shop deleted");
        Ok(parts as u64)
    }

    /// Counts all shops.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shop_owners")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Counts shops with a non-blank GSTIN.
    pub async fn count_gst_registered(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM shop_owners \
             WHERE gst_number IS NOT NULL AND TRIM(gst_number) <> ''",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

/// Names the offending email in UNIQUE failures.
fn duplicate_email(err: sqlx::Error, email: &str) -> DbError {
    match DbError::from(err) {
        DbError::UniqueViolation { .. } => DbError::duplicate("email", email),
        other => other,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
