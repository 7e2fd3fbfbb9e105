//! # Admin Repository
//!
//! Back-office accounts. Admins are created at startup from configuration
//! or by the seed binary; there is no sign-up path.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::info;

use crate::error::DbResult;
use crate::repository::generate_id;

/// A stored admin account.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Admin {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Repository for admin accounts.
#[derive(Debug, Clone)]
pub struct AdminRepository {
    pool: SqlitePool,
}

impl AdminRepository {
    /// Creates a new AdminRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AdminRepository { pool }
    }

    /// Creates the admin, or resets its password when it already exists.
    pub async fn upsert(&self, email: &str, password_hash: &str) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO admins (id, email, password_hash, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(email) DO UPDATE SET password_hash = excluded.password_hash
            "#,
        )
        .bind(generate_id())
        .bind(email)
        .bind(password_hash)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        info!(email = %email, "Admin account ensured");
        Ok(())
    }

    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<Admin>> {
        let admin = sqlx::query_as::<_, Admin>(
            "SELECT id, email, password_hash, created_at FROM admins WHERE email = ?1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(admin)
    }

    pub async fn exists(&self, email: &str) -> DbResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM admins WHERE email = ?1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::repository::fixtures::test_db;

    #[tokio::test]
    async fn test_upsert_resets_password() {
        let db = test_db().await;
        let repo = db.admins();

        repo.upsert("admin@example.com", "first").await.unwrap();
        repo.upsert("admin@example.com", "second").await.unwrap();

        let admin = repo.get_by_email("admin@example.com").await.unwrap().unwrap();
        assert_eq!(admin.password_hash, "second");
        assert!(repo.exists("admin@example.com").await.unwrap());
        assert!(!repo.exists("someone@example.com").await.unwrap());
    }
}
