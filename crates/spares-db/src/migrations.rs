//! # Schema Migrations
//!
//! SQL files under `migrations/sqlite/` at the workspace root are compiled
//! into the binary and applied in filename order on open. sqlx records each
//! one with its checksum in `_sqlx_migrations`, so an edited file that was
//! already applied fails the next start.
//!
//! | File                     | Creates                                        |
//! |--------------------------|------------------------------------------------|
//! | `001_initial_schema.sql` | `shop_owners`, `parts`, `sales_history`, `admins`, append-only triggers |
//!
//! Schema changes go in a new `NNN_description.sql`.

use sqlx::migrate::Migrator;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies whatever has not been applied yet.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    MIGRATOR.run(pool).await?;
    info!(embedded = MIGRATOR.migrations.len(), "Schema up to date");
    Ok(())
}

/// `(embedded, applied)` counts. A database that was never migrated has
/// no bookkeeping table and reports zero applied.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let embedded = MIGRATOR.migrations.len();

    let table_exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations')",
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        return Ok((embedded, 0));
    }

    let applied: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await?;

    Ok((embedded, usize::try_from(applied).unwrap_or_default()))
}
