use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::sync::Arc;
use tracing::info;

/// DbConnection manages the SQLite pool and schema
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Create a new database connection
    pub async fn new(url: &str) -> Result<Self> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            info!("Creating database at {}", url);
            Sqlite::create_database(url).await?
        }

        let pool = SqlitePool::connect(url).await?;
        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Open a private in-memory database, used by tests.
    ///
    /// Every SQLite in-memory connection is its own database, so the pool is
    /// pinned to a single connection that is never recycled.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS bills (
                id TEXT PRIMARY KEY,
                household_id TEXT NOT NULL,
                description TEXT NOT NULL,
                payer_id TEXT NOT NULL,
                total_cents INTEGER NOT NULL CHECK (total_cents >= 0),
                split_method TEXT NOT NULL,
                split_details TEXT NOT NULL,
                created_by TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Listing is always per household, newest first
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_bills_household_id
            ON bills(household_id, created_at DESC);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS bill_shares (
                bill_id TEXT NOT NULL,
                member_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                amount_cents INTEGER NOT NULL CHECK (amount_cents >= 0),
                is_paid BOOLEAN NOT NULL DEFAULT FALSE,
                paid_at TEXT,
                PRIMARY KEY (bill_id, member_id),
                FOREIGN KEY (bill_id) REFERENCES bills (id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_bill_shares_unpaid
            ON bill_shares(is_paid, member_id);
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}
