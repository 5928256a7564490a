//! Maintenance commands: clear and schema migration

use crate::error::Result;
use crate::store::{MigrationReport, ProductStore};
use tracing::info;

/// Delete every stored product (reset flows only)
pub async fn cmd_clear(store: &ProductStore) -> Result<u64> {
    let cleared = store.clear_all().await?;
    info!("Cleared {} products", cleared);
    Ok(cleared)
}

/// Rebuild the products table with the uniqueness constraint, deduplicating
/// legacy rows
pub async fn cmd_migrate(store: &ProductStore) -> Result<MigrationReport> {
    store.migrate_schema().await
}

pub fn print_migration_report(report: &MigrationReport) {
    println!("Migration complete: {} rows kept", report.rows_kept);

    if report.remaining_duplicates.is_empty() {
        println!("No duplicates remain");
    } else {
        println!(
            "{} duplicate entries remain:",
            report.remaining_duplicates.len()
        );
        for dup in &report.remaining_duplicates {
            println!("  {} × {} ({})", dup.count, dup.product_name, dup.url);
        }
    }
}
