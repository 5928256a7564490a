//! Presentation adapter: stored rows to display-ready records
//!
//! Pure and total: a well-formed stored row always maps to a record. Column
//! names match what the dashboard table shows; rendering the URL as a
//! clickable link is the UI's job.

use crate::store::Product;
use serde::{Deserialize, Serialize};

/// Placeholder shown when a product has no delivery estimate
const UNKNOWN_DELIVERY: &str = "unknown";

/// A display-ready projection of a stored product row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayRecord {
    #[serde(rename = "Product name")]
    pub product_name: String,

    #[serde(rename = "URL")]
    pub url: String,

    #[serde(rename = "Price")]
    pub price: String,

    #[serde(rename = "Delivery time")]
    pub delivery_time: String,
}

impl From<&Product> for DisplayRecord {
    fn from(product: &Product) -> Self {
        Self {
            product_name: product.product_name.clone(),
            url: product.url.clone(),
            price: format_price(product.price),
            delivery_time: product
                .delivery_time
                .clone()
                .unwrap_or_else(|| UNKNOWN_DELIVERY.to_string()),
        }
    }
}

/// Map stored rows to display records, preserving order
pub fn to_display(products: &[Product]) -> Vec<DisplayRecord> {
    products.iter().map(DisplayRecord::from).collect()
}

/// Format a price as a euro string with two-decimal fixed point
pub fn format_price(price: f64) -> String {
    format!("€ {:.2}", price)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: f64, delivery: Option<&str>) -> Product {
        Product {
            id: 1,
            product_name: "Test Product".to_string(),
            url: "http://test.com".to_string(),
            price,
            delivery_time: delivery.map(str::to_string),
            timestamp: "2024-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(99.99), "€ 99.99");
        assert_eq!(format_price(5.0), "€ 5.00");
        assert_eq!(format_price(0.0), "€ 0.00");
        assert_eq!(format_price(1234.5), "€ 1234.50");
    }

    #[test]
    fn test_display_record_fields() {
        let record = DisplayRecord::from(&product(99.99, Some("1-2 days")));

        assert_eq!(record.product_name, "Test Product");
        assert_eq!(record.url, "http://test.com");
        assert_eq!(record.price, "€ 99.99");
        assert_eq!(record.delivery_time, "1-2 days");
    }

    #[test]
    fn test_missing_delivery_shown_as_unknown() {
        let record = DisplayRecord::from(&product(5.0, None));
        assert_eq!(record.delivery_time, "unknown");
    }

    #[test]
    fn test_json_uses_display_labels() {
        let json = serde_json::to_value(DisplayRecord::from(&product(99.99, Some("1-2 days"))))
            .unwrap();

        assert_eq!(json["Product name"], "Test Product");
        assert_eq!(json["URL"], "http://test.com");
        assert_eq!(json["Price"], "€ 99.99");
        assert_eq!(json["Delivery time"], "1-2 days");
    }
}
