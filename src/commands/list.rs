//! List command implementation

use crate::display::{to_display, DisplayRecord};
use crate::error::Result;
use crate::store::ProductStore;

/// Get all stored products as display records, newest first
pub async fn cmd_list(store: &ProductStore) -> Result<Vec<DisplayRecord>> {
    let products = store.list_all().await?;
    Ok(to_display(&products))
}

pub fn print_products(records: &[DisplayRecord]) {
    if records.is_empty() {
        println!("No products stored yet. Run 'pricewatch scrape' first.");
        return;
    }

    println!(
        "{:<40} {:<12} {:<18} {}",
        "Product name", "Price", "Delivery time", "URL"
    );
    for record in records {
        println!(
            "{:<40} {:<12} {:<18} {}",
            record.product_name, record.price, record.delivery_time, record.url
        );
    }
}
