//! # Connection Pool
//!
//! One [`Database`] per process. It owns the SQLite pool and hands out
//! repositories, each holding a clone of that pool.
//!
//! ```text
//!   ServerConfig ──► DbConfig ──► Database::new
//!                                   │  journal_mode=WAL
//!                                   │  synchronous=NORMAL
//!                                   │  foreign_keys=ON   (part cascades)
//!                                   │  busy_timeout      (writers queue)
//!                                   │  migrations, unless disabled
//!                                   ▼
//!                      parts()  shops()  sales()  admins()
//! ```
//!
//! SQLite admits one writer at a time. A second writer waits up to
//! `busy_timeout` for the lock instead of failing with `SQLITE_BUSY`, so two
//! checkouts racing for the same part both reach the conditional decrement.

use std::path::PathBuf;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::admin::AdminRepository;
use crate::repository::part::PartRepository;
use crate::repository::sales::SalesRepository;
use crate::repository::shop::ShopRepository;

const MEMORY: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// How to open the database.
///
/// ```rust,ignore
/// let config = DbConfig::new("./data/spares.db").max_connections(8);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file, created on first open. `:memory:` for a private
    /// in-memory database.
    pub path: PathBuf,

    /// Pool ceiling. Default 5.
    pub max_connections: u32,

    /// Connections kept open while idle. Default 1.
    pub min_connections: u32,

    /// How long a caller waits for a free connection. Default 10s.
    pub acquire_timeout: Duration,

    /// How long a writer waits for the SQLite lock. Default 5s.
    pub busy_timeout: Duration,

    /// Apply embedded migrations on open. Default true.
    pub migrate: bool,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            path: path.into(),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(10),
            busy_timeout: Duration::from_secs(5),
            migrate: true,
        }
    }

    /// A fresh in-memory database. Each connection of an in-memory pool
    /// would see its own empty database, so the pool is pinned to one.
    pub fn in_memory() -> Self {
        DbConfig {
            max_connections: 1,
            ..DbConfig::new(MEMORY)
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Skip migrations on open (tooling that inspects an old file).
    pub fn run_migrations(mut self, migrate: bool) -> Self {
        self.migrate = migrate;
        self
    }

    fn is_memory(&self) -> bool {
        self.path.as_os_str() == MEMORY
    }

    fn connect_options(&self) -> SqliteConnectOptions {
        let options = if self.is_memory() {
            SqliteConnectOptions::new().in_memory(true)
        } else {
            SqliteConnectOptions::new()
                .filename(&self.path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
        };

        options
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(self.busy_timeout)
    }
}

// =============================================================================
// Database
// =============================================================================

/// Shared database handle.
///
/// Cloning shares the pool. The server keeps one in its state:
///
/// ```rust,ignore
/// async fn my_parts(State(state): State<AppState>, requester: ShopRequester) -> ApiResult<Json<Vec<Part>>> {
///     Ok(Json(state.db.parts().list_by_owner(requester.email()).await?))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and, unless disabled, brings the schema up to date.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.path.display(),
            max_connections = config.max_connections,
            "Opening database"
        );

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections.min(config.max_connections))
            .acquire_timeout(config.acquire_timeout)
            .connect_with(config.connect_options())
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        let db = Database { pool };

        if config.migrate {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// `(embedded, applied)` migration counts.
    pub async fn migration_status(&self) -> DbResult<(usize, usize)> {
        migrations::migration_status(&self.pool).await
    }

    /// The raw pool, for queries no repository covers.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn parts(&self) -> PartRepository {
        PartRepository::new(self.pool.clone())
    }

    pub fn shops(&self) -> ShopRepository {
        ShopRepository::new(self.pool.clone())
    }

    pub fn sales(&self) -> SalesRepository {
        SalesRepository::new(self.pool.clone())
    }

    pub fn admins(&self) -> AdminRepository {
        AdminRepository::new(self.pool.clone())
    }

    /// Waits for checked-out connections and closes the pool. Every later
    /// call fails with a connection error.
    pub async fn close(&self) {
        info!("Closing database");
        self.pool.close().await;
    }

    /// True when a trivial query round-trips.
    pub async fn health_check(&self) -> bool {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
