//! Persisted record types
//!
//! Field names on the wire match the product service's canonical schema so
//! that records written by older front ends still load.

use serde::{Deserialize, Serialize};

/// Name recorded in the history when the service returned no product name
pub const UNKNOWN_PRODUCT: &str = "Unknown Product";

/// Product data as returned by the product service, keyed by barcode
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductRecord {
    pub barcode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(rename = "brands", skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(rename = "eco-score", skip_serializing_if = "Option::is_none")]
    pub eco_score: Option<f64>,
    #[serde(rename = "eco-grade", skip_serializing_if = "Option::is_none")]
    pub eco_grade: Option<String>,
    pub carbon_emission_kg: f64,
    pub recyclable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packaging: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_sustainability_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutriscore: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ProductRecord {
    pub fn new(barcode: &str) -> Self {
        Self {
            barcode: barcode.to_string(),
            ..Default::default()
        }
    }

    /// Name to show and to record in the history
    pub fn display_name(&self) -> &str {
        self.product_name.as_deref().unwrap_or(UNKNOWN_PRODUCT)
    }
}

/// One successful scan; append-only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanEvent {
    /// Epoch milliseconds
    pub timestamp: i64,
    pub barcode: String,
    pub product_name: String,
    #[serde(rename = "overall_sustainability_score", default)]
    pub sustainability_score: Option<f64>,
}

impl ScanEvent {
    pub fn new(
        timestamp: i64,
        barcode: &str,
        product_name: &str,
        sustainability_score: Option<f64>,
    ) -> Self {
        Self {
            timestamp,
            barcode: barcode.to_string(),
            product_name: product_name.to_string(),
            sustainability_score,
        }
    }

    /// History entry for a product fetched at `timestamp`
    pub fn from_product(product: &ProductRecord, timestamp: i64) -> Self {
        Self::new(
            timestamp,
            &product.barcode,
            product.display_name(),
            product.overall_sustainability_score,
        )
    }
}
