//! Product storage using SQLite
//!
//! Owns the `products` table: schema creation, upsert keyed by the unique
//! `url` column, newest-first listing, bulk clear, and the one-shot schema
//! migration for databases created before the uniqueness constraint existed.

mod migrate;
mod schema;

pub use migrate::*;
pub use schema::*;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::extract::{ExtractedFields, PROP_PRICE, PROP_TITLE, PROP_URL};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use std::path::Path;
use tracing::{debug, info};

/// A stored product row
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub product_name: String,
    pub url: String,
    pub price: f64,
    pub delivery_time: Option<String>,
    pub timestamp: String,
}

/// Product database handle
#[derive(Clone)]
pub struct ProductStore {
    pub(crate) pool: SqlitePool,
}

impl ProductStore {
    /// Connect to the product database described by the config
    pub async fn connect(config: &Config) -> Result<Self> {
        Self::new(&config.paths.db_file).await
    }

    /// Open the database at a path, creating file and schema when needed
    pub async fn new(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        debug!("Connecting to SQLite database at {:?}", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self { pool };

        if !store.is_initialized().await? {
            store.init_schema().await?;
        }

        Ok(store)
    }

    /// Initialize the database schema (idempotent)
    pub async fn init_schema(&self) -> Result<()> {
        info!("Initializing database schema");
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    /// Check if the products table exists
    pub async fn is_initialized(&self) -> Result<bool> {
        let result: Option<(i32,)> =
            sqlx::query_as("SELECT 1 FROM sqlite_master WHERE type='table' AND name='products'")
                .fetch_optional(&self.pool)
                .await?;
        Ok(result.is_some())
    }

    /// Insert a product, or update the existing row sharing the same URL
    ///
    /// Validates the three required fields independently of the pipeline's
    /// completeness check; the store defends its own invariants. On conflict
    /// the existing row keeps its `id` while name, price, delivery time and
    /// timestamp are overwritten.
    pub async fn upsert(&self, fields: &ExtractedFields) -> Result<()> {
        let name = fields.require(PROP_TITLE)?;
        let url = fields.require(PROP_URL)?;
        let price = parse_price(fields.require(PROP_PRICE)?)?;

        sqlx::query(
            r#"
            INSERT INTO products (product_name, url, price, delivery_time, timestamp)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(url) DO UPDATE SET
                product_name = excluded.product_name,
                price = excluded.price,
                delivery_time = excluded.delivery_time,
                timestamp = excluded.timestamp
            "#,
        )
        .bind(name)
        .bind(url)
        .bind(price)
        .bind(&fields.delivery_time)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!("Upserted product: {}", name);
        Ok(())
    }

    /// List every product, most recently written first
    pub async fn list_all(&self) -> Result<Vec<Product>> {
        let products =
            sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY timestamp DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(products)
    }

    /// Get a product by URL
    pub async fn get_by_url(&self, url: &str) -> Result<Option<Product>> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE url = ?")
            .bind(url)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    /// Number of stored products
    pub async fn count(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }

    /// Delete every product row (test isolation and explicit resets only)
    pub async fn clear_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM products")
            .execute(&self.pool)
            .await?;
        info!("Cleared {} products", result.rows_affected());
        Ok(result.rows_affected())
    }
}

/// Parse a price string into a non-negative amount
///
/// Negative and non-finite values are rejected; the upstream site never
/// legitimately publishes them.
fn parse_price(raw: &str) -> Result<f64> {
    let price: f64 = raw
        .trim()
        .parse()
        .map_err(|_| Error::Validation(format!("Invalid price format: {:?}", raw)))?;

    if !price.is_finite() || price < 0.0 {
        return Err(Error::Validation(format!(
            "Price must be a non-negative number, got {}",
            raw
        )));
    }

    Ok(price)
}
