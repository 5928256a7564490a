//! SQLite schema definition

/// SQL schema for the product database
pub const SCHEMA_SQL: &str = r#"
-- Products: one row per product page URL
CREATE TABLE IF NOT EXISTS products (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    product_name TEXT NOT NULL,
    url TEXT NOT NULL UNIQUE,
    price REAL NOT NULL,
    delivery_time TEXT,
    timestamp TEXT NOT NULL
);

-- Index for upsert lookups
CREATE INDEX IF NOT EXISTS idx_products_url ON products(url);
"#;
