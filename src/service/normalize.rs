//! Response normalization
//!
//! The product service is not strict about field names: the same value can
//! arrive under several keys depending on which upstream source answered.
//! Each canonical field has an ordered alias list; the first alias holding a
//! usable value wins.

use crate::service::error::{ServiceError, ServiceResult};
use crate::service::types::Suggestion;
use crate::store::api::ProductRecord;
use serde_json::{Map, Value};

const ERROR_FIELDS: &[&str] = &["error", "Error"];
const BARCODE_FIELDS: &[&str] = &["barcode", "code", "barcode_value"];
const NAME_FIELDS: &[&str] = &["product_name"];
const BRAND_FIELDS: &[&str] = &["brands", "brand"];
const IMAGE_FIELDS: &[&str] = &["image_url", "image_front_small_url", "image_front_url"];
const ECO_SCORE_FIELDS: &[&str] = &["eco-score", "eco_score", "ecoscore_value"];
const ECO_GRADE_FIELDS: &[&str] = &["eco-grade", "eco_grade", "ecoscore_grade"];
const CARBON_FIELDS: &[&str] = &["carbon_emission_kg", "carbon_emission"];
const NUTRISCORE_FIELDS: &[&str] = &["nutriscore", "nutriscore_grade"];
const SUSTAINABILITY_FIELDS: &[&str] = &["overall_sustainability_score", "sustainability_score"];
const PACKAGING_FIELDS: &[&str] = &["packaging"];
const RECYCLABLE_FIELDS: &[&str] = &["recyclable"];
const LABEL_FIELDS: &[&str] = &["label", "labels"];

const SUGGESTION_NAME_FIELDS: &[&str] = &["name", "product_name"];
const SUGGESTION_BRAND_FIELDS: &[&str] = &["brand", "brands"];
const SUGGESTION_REASON_FIELDS: &[&str] = &["reason"];
const SUGGESTION_IMAGE_FIELDS: &[&str] = &["image", "image_url"];

/// Map a barcode lookup response onto a canonical [`ProductRecord`]
///
/// Fails with `Api` when the body carries an error field (or is not an
/// object) and with `ProductNotFound` when neither a product name nor a brand
/// is present. `requested_barcode` fills in the key when the body omits it.
pub fn normalize_product(body: &Value, requested_barcode: &str) -> ServiceResult<ProductRecord> {
    let obj = as_object(body)?;

    if let Some(message) = first_text(obj, ERROR_FIELDS) {
        return Err(ServiceError::Api {
            status: None,
            message,
        });
    }

    let product_name = first_text(obj, NAME_FIELDS);
    let brand = first_text(obj, BRAND_FIELDS);
    if product_name.is_none() && brand.is_none() {
        return Err(ServiceError::ProductNotFound {
            barcode: requested_barcode.to_string(),
        });
    }

    let packaging = first_text(obj, PACKAGING_FIELDS);
    let recyclable = first_value(obj, RECYCLABLE_FIELDS)
        .and_then(as_bool)
        .unwrap_or_else(|| {
            packaging
                .as_deref()
                .is_some_and(|p| p.to_lowercase().contains("recyclable"))
        });

    Ok(ProductRecord {
        barcode: first_text(obj, BARCODE_FIELDS).unwrap_or_else(|| requested_barcode.to_string()),
        product_name,
        brand,
        image_url: first_text(obj, IMAGE_FIELDS),
        eco_score: first_number(obj, ECO_SCORE_FIELDS),
        eco_grade: first_grade(obj, ECO_GRADE_FIELDS),
        carbon_emission_kg: first_number(obj, CARBON_FIELDS).unwrap_or(0.0),
        recyclable,
        packaging,
        overall_sustainability_score: first_number(obj, SUSTAINABILITY_FIELDS),
        nutriscore: first_grade(obj, NUTRISCORE_FIELDS),
        label: first_grade(obj, LABEL_FIELDS),
    })
}

/// Extract the `suggestions` list from a suggestion response
///
/// A missing or non-list `suggestions` field is an empty list; entries
/// without a name are dropped.
pub fn normalize_suggestions(body: &Value) -> ServiceResult<Vec<Suggestion>> {
    let obj = as_object(body)?;

    let Some(items) = obj.get("suggestions").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    Ok(items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|item| {
            Some(Suggestion {
                name: first_text(item, SUGGESTION_NAME_FIELDS)?,
                brand: first_text(item, SUGGESTION_BRAND_FIELDS).unwrap_or_default(),
                reason: first_text(item, SUGGESTION_REASON_FIELDS).unwrap_or_default(),
                image: first_text(item, SUGGESTION_IMAGE_FIELDS),
            })
        })
        .collect())
}

fn as_object(body: &Value) -> ServiceResult<&Map<String, Value>> {
    body.as_object().ok_or_else(|| ServiceError::Api {
        status: None,
        message: "Unexpected response from product service".to_string(),
    })
}

// First alias whose value is present and not null
fn first_value<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find(|value| !value.is_null())
}

// Falsy values (empty strings, false, 0) count as absent
fn first_text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find_map(as_text)
}

fn first_number(obj: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find_map(as_number)
}

// Grades use "N/A" as a placeholder for missing data
fn first_grade(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    first_text(obj, keys).filter(|grade| !grade.eq_ignore_ascii_case("n/a"))
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        Value::Object(_) | Value::Array(_) => Some(value.to_string()),
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|n| n != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
