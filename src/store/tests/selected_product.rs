//! Tests for the read-once selected product handoff

use crate::store::api::{HistoryStore, MemoryBackend, ProductRecord, SELECTED_PRODUCT_KEY};
use std::sync::Arc;

#[test]
fn test_selected_product_is_consumed_on_read() {
    let backend = Arc::new(MemoryBackend::new());
    let store = HistoryStore::open(backend.clone());

    let mut record = ProductRecord::new("5000112548167");
    record.product_name = Some("Sparkling water".to_string());
    assert!(store.select_product(&record).is_persisted());
    assert!(backend.raw(SELECTED_PRODUCT_KEY).is_some());

    assert_eq!(store.take_selected_product(), Some(record));
    assert!(backend.raw(SELECTED_PRODUCT_KEY).is_none());
    assert_eq!(store.take_selected_product(), None);
}

#[test]
fn test_unreadable_selection_is_discarded() {
    let backend = Arc::new(MemoryBackend::with_entries([(SELECTED_PRODUCT_KEY, "{oops")]));
    let store = HistoryStore::open(backend.clone());

    assert_eq!(store.take_selected_product(), None);
    assert!(backend.raw(SELECTED_PRODUCT_KEY).is_none());
}

#[test]
fn test_nothing_selected() {
    let store = HistoryStore::open(MemoryBackend::new());
    assert_eq!(store.take_selected_product(), None);
    assert_eq!(store.persistence_failures(), 0);
}
