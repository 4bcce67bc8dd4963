//! Product service payloads

use serde::{Deserialize, Serialize};

/// An eco-friendly alternative proposed for a scanned product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub name: String,
    pub brand: String,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct BarcodeRequest<'a> {
    pub barcode: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct SuggestRequest<'a> {
    pub product_name: &'a str,
}
