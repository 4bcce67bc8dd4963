//! Usage analytics derived from the scan history

use crate::store::types::ScanEvent;
use chrono::{Local, NaiveDate, TimeZone};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

/// Derived values; never stored
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Analytics {
    pub total_scans: usize,
    /// Calendar date -> number of scans that day, oldest first
    pub scans_by_date: BTreeMap<NaiveDate, usize>,
    pub most_sustainable_product: Option<ScanEvent>,
    /// One entry per barcode (latest scan wins), best score first, unscored last
    pub ranked_products: Vec<ScanEvent>,
}

impl Analytics {
    /// The first `limit` ranked products
    pub fn top_ranked(&self, limit: usize) -> &[ScanEvent] {
        &self.ranked_products[..self.ranked_products.len().min(limit)]
    }
}

/// Analytics with dates in the local time zone
pub fn compute_analytics(events: &[ScanEvent]) -> Analytics {
    compute_analytics_in(events, &Local)
}

/// Analytics with dates taken in `tz`
pub fn compute_analytics_in<Tz: TimeZone>(events: &[ScanEvent], tz: &Tz) -> Analytics {
    let mut scans_by_date = BTreeMap::new();
    for event in events {
        match tz.timestamp_millis_opt(event.timestamp).earliest() {
            Some(at) => *scans_by_date.entry(at.date_naive()).or_insert(0) += 1,
            None => log::debug!(
                "Scan of {} has out-of-range timestamp {}",
                event.barcode,
                event.timestamp
            ),
        }
    }

    let mut ranked_products = latest_per_barcode(events);
    ranked_products.sort_by(|a, b| by_score_descending(a.sustainability_score, b.sustainability_score));

    let most_sustainable_product = ranked_products
        .first()
        .filter(|top| top.sustainability_score.is_some())
        .cloned();

    Analytics {
        total_scans: events.len(),
        scans_by_date,
        most_sustainable_product,
        ranked_products,
    }
}

// Keeps the position of a barcode's first scan but the data of its last one
fn latest_per_barcode(events: &[ScanEvent]) -> Vec<ScanEvent> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut unique: Vec<ScanEvent> = Vec::new();

    for event in events {
        match positions.get(event.barcode.as_str()) {
            Some(&idx) => unique[idx] = event.clone(),
            None => {
                positions.insert(event.barcode.as_str(), unique.len());
                unique.push(event.clone());
            }
        }
    }
    unique
}

fn by_score_descending(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
