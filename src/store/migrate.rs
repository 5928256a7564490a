//! One-shot schema migration
//!
//! Rebuilds the products table to add the uniqueness constraint on `url` for
//! databases created before it existed. Pre-existing duplicates collapse to
//! the earliest timestamp per (product_name, url, price) triple. Idempotent
//! on an already-migrated database.

use super::ProductStore;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Outcome of a schema migration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationReport {
    /// Rows present after the rebuild
    pub rows_kept: u64,
    /// (product_name, url) pairs that still occur more than once
    pub remaining_duplicates: Vec<DuplicateEntry>,
}

/// A duplicate (product_name, url) pair left after migration
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DuplicateEntry {
    pub product_name: String,
    pub url: String,
    pub count: i64,
}

impl ProductStore {
    /// Rebuild the products table with the `url` uniqueness constraint,
    /// deduplicating legacy rows
    pub async fn migrate_schema(&self) -> Result<MigrationReport> {
        info!("Migrating products table");

        // The DDL sequence must run on a single connection: spread across the
        // pool, the connection executing the rename may not see the drop.
        let mut conn = self.pool.acquire().await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS products_new (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                product_name TEXT NOT NULL,
                url TEXT NOT NULL UNIQUE,
                price REAL NOT NULL,
                delivery_time TEXT,
                timestamp TEXT NOT NULL,
                UNIQUE(product_name, url, price)
            )
            "#,
        )
        .execute(&mut *conn)
        .await?;

        // Keep the earliest write per triple; OR IGNORE drops the rest.
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO products_new (product_name, url, price, delivery_time, timestamp)
            SELECT product_name, url, price, delivery_time, MIN(timestamp)
            FROM products
            GROUP BY product_name, url, price
            "#,
        )
        .execute(&mut *conn)
        .await?;

        sqlx::query("DROP TABLE IF EXISTS products")
            .execute(&mut *conn)
            .await?;
        sqlx::query("ALTER TABLE products_new RENAME TO products")
            .execute(&mut *conn)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_products_url ON products(url)")
            .execute(&mut *conn)
            .await?;

        let rows_kept: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&mut *conn)
            .await?;

        drop(conn);

        let remaining_duplicates = self.check_duplicates().await?;
        if remaining_duplicates.is_empty() {
            info!("Migration complete, {} rows kept", rows_kept);
        } else {
            warn!(
                "Migration complete, but {} duplicate entries remain",
                remaining_duplicates.len()
            );
        }

        Ok(MigrationReport {
            rows_kept: rows_kept as u64,
            remaining_duplicates,
        })
    }

    /// Report (product_name, url) pairs that occur more than once
    pub async fn check_duplicates(&self) -> Result<Vec<DuplicateEntry>> {
        let duplicates = sqlx::query_as::<_, DuplicateEntry>(
            r#"
            SELECT product_name, url, COUNT(*) as count
            FROM products
            GROUP BY product_name, url
            HAVING COUNT(*) > 1
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(duplicates)
    }
}
