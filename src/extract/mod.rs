//! Product metadata extraction from page markup
//!
//! Pulls a caller-supplied set of `<meta property="...">` values plus the
//! fixed delivery-time span out of a fetched product page. Missing elements
//! are represented as absent values, never as errors; the pipeline's
//! completeness check decides what to do about them.

use crate::error::{Error, Result};
use scraper::{Html, Selector};
use std::collections::HashMap;

/// Meta property holding the product name
pub const PROP_TITLE: &str = "og:title";

/// Meta property holding the canonical product URL
pub const PROP_URL: &str = "og:url";

/// Meta property holding the price amount
pub const PROP_PRICE: &str = "product:price:amount";

/// CSS class of the delivery-time span
const DELIVERY_CLASS: &str = "product-delivery-time";

/// Noise substring the shop embeds in the delivery-time span (an icon label)
const DELIVERY_NOISE: &str = "timer";

/// Fields extracted from a single product page
///
/// Transient: produced per URL, consumed once by the pipeline.
#[derive(Debug, Clone, Default)]
pub struct ExtractedFields {
    properties: HashMap<String, Option<String>>,
    pub delivery_time: Option<String>,
}

impl ExtractedFields {
    /// Get an extracted property value, if present
    pub fn get(&self, property: &str) -> Option<&str> {
        self.properties
            .get(property)
            .and_then(|v| v.as_deref())
    }

    /// Get a required property value, failing with a validation error when
    /// the property was not extracted or is empty
    pub fn require(&self, property: &str) -> Result<&str> {
        match self.get(property) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(Error::Validation(format!(
                "Missing required field: {}",
                property
            ))),
        }
    }

    /// Set a property value (used when building fields by hand)
    pub fn set(&mut self, property: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(property.into(), Some(value.into()));
    }

    /// Property names whose value is absent or empty
    ///
    /// An extracted-but-empty string counts as missing, matching the
    /// completeness semantics the store validates against.
    pub fn missing(&self, required: &[String]) -> Vec<String> {
        required
            .iter()
            .filter(|p| self.get(p).map_or(true, str::is_empty))
            .cloned()
            .collect()
    }
}

/// Extract the requested meta properties and the delivery-time span from
/// raw page markup
pub fn extract_fields(content: &str, properties: &[String]) -> ExtractedFields {
    let document = Html::parse_document(content);
    let mut fields = ExtractedFields::default();

    for property in properties {
        let value = Selector::parse(&format!(r#"meta[property="{}"]"#, property))
            .ok()
            .and_then(|selector| {
                document
                    .select(&selector)
                    .next()
                    .map(|elem| elem.value().attr("content").unwrap_or("").to_string())
            });
        fields.properties.insert(property.clone(), value);
    }

    fields.delivery_time = Selector::parse(&format!("span.{}", DELIVERY_CLASS))
        .ok()
        .and_then(|selector| {
            document.select(&selector).next().map(|elem| {
                elem.text()
                    .collect::<String>()
                    .trim()
                    .replace(DELIVERY_NOISE, "")
                    .trim()
                    .to_string()
            })
        });

    fields
}
