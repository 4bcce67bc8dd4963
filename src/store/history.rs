//! HistoryStore implementation
//!
//! Created once at startup and shared (behind an `Arc`) by the scan
//! controller and the front end. Every mutation is written through to the
//! backend immediately. Write failures never reach the caller: the data stays
//! in memory for the rest of the process and the failure is logged and
//! counted, see [`HistoryStore::persistence_failures`].

use crate::store::analytics::{compute_analytics, Analytics};
use crate::store::backend::KeyValueBackend;
use crate::store::error::StoreError;
use crate::store::types::{ProductRecord, ScanEvent};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

pub const SCAN_HISTORY_KEY: &str = "scanHistory";
pub const RECENT_PRODUCTS_KEY: &str = "recentProducts";
pub const SELECTED_PRODUCT_KEY: &str = "selectedProduct";

/// Maximum length of the recently viewed products list
pub const RECENT_PRODUCTS_LIMIT: usize = 6;

/// Whether a write reached the backend
#[derive(Debug, Clone, PartialEq)]
pub enum PersistOutcome {
    Persisted,
    /// Kept in memory only; the backend rejected the write
    MemoryOnly(StoreError),
}

impl PersistOutcome {
    pub fn is_persisted(&self) -> bool {
        matches!(self, PersistOutcome::Persisted)
    }
}

#[derive(Default)]
struct StoreState {
    history: Vec<ScanEvent>,
    recent: Vec<ProductRecord>,
}

pub struct HistoryStore {
    backend: Box<dyn KeyValueBackend>,
    state: Mutex<StoreState>,
    persistence_failures: AtomicUsize,
}

impl HistoryStore {
    /// Open the store, loading whatever the backend already holds
    ///
    /// Missing or corrupt values start out empty.
    pub fn open(backend: impl KeyValueBackend + 'static) -> Self {
        let store = Self {
            backend: Box::new(backend),
            state: Mutex::new(StoreState::default()),
            persistence_failures: AtomicUsize::new(0),
        };

        let history = store.load_scan_history();
        let recent = store.load_recent_products();
        log::debug!(
            "History store opened: {} scan events, {} recent products",
            history.len(),
            recent.len()
        );
        {
            let mut state = store.lock();
            state.history = history;
            state.recent = recent;
        }
        store
    }

    /// Append a scan event and persist the whole sequence
    pub fn append_scan_event(&self, event: ScanEvent) -> PersistOutcome {
        let mut state = self.lock();
        log::debug!(
            "Appending scan event for {} ({} events before)",
            event.barcode,
            state.history.len()
        );
        state.history.push(event);
        self.persist(SCAN_HISTORY_KEY, &state.history)
    }

    /// Move or insert `record` at the front of the recent list, capped at six
    pub fn upsert_recent_product(&self, record: ProductRecord) -> PersistOutcome {
        let mut state = self.lock();
        state.recent.retain(|p| p.barcode != record.barcode);
        state.recent.insert(0, record);
        state.recent.truncate(RECENT_PRODUCTS_LIMIT);
        self.persist(RECENT_PRODUCTS_KEY, &state.recent)
    }

    /// Scan history as currently persisted; empty when missing or corrupt
    pub fn load_scan_history(&self) -> Vec<ScanEvent> {
        self.load_collection(SCAN_HISTORY_KEY)
    }

    /// Recent products as currently persisted; empty when missing or corrupt
    pub fn load_recent_products(&self) -> Vec<ProductRecord> {
        let mut recent: Vec<ProductRecord> = self.load_collection(RECENT_PRODUCTS_KEY);
        recent.truncate(RECENT_PRODUCTS_LIMIT);
        recent
    }

    /// Scan history held by this process, including unpersisted events
    pub fn scan_history(&self) -> Vec<ScanEvent> {
        self.lock().history.clone()
    }

    /// Recent products held by this process, most recent first
    pub fn recent_products(&self) -> Vec<ProductRecord> {
        self.lock().recent.clone()
    }

    /// Analytics derived from the in-process scan history
    pub fn compute_analytics(&self) -> Analytics {
        compute_analytics(&self.lock().history)
    }

    /// Hand a product over to the next reader of the selected-product slot
    pub fn select_product(&self, record: &ProductRecord) -> PersistOutcome {
        self.persist(SELECTED_PRODUCT_KEY, record)
    }

    /// Read and delete the selected product
    ///
    /// Returns `None` when nothing was selected. A value that cannot be
    /// decoded is discarded as well.
    pub fn take_selected_product(&self) -> Option<ProductRecord> {
        let raw = match self.backend.get(SELECTED_PRODUCT_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                log::warn!("Could not read {}: {}", SELECTED_PRODUCT_KEY, e);
                return None;
            }
        };

        if let Err(e) = self.backend.remove(SELECTED_PRODUCT_KEY) {
            self.record_failure(SELECTED_PRODUCT_KEY, &e);
        }

        match serde_json::from_str::<ProductRecord>(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("Discarding unreadable {}: {}", SELECTED_PRODUCT_KEY, e);
                None
            }
        }
    }

    /// Number of writes that only reached memory
    pub fn persistence_failures(&self) -> usize {
        self.persistence_failures.load(Ordering::Relaxed)
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn load_collection<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::warn!("Could not read {}: {}", key, e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<T>>(&raw) {
            Ok(items) => items,
            Err(e) => {
                log::warn!("Ignoring corrupt {} ({}), starting empty", key, e);
                Vec::new()
            }
        }
    }

    fn persist<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> PersistOutcome {
        let result = serde_json::to_string(value)
            .map_err(|e| StoreError::Serialization {
                key: key.to_string(),
                message: e.to_string(),
            })
            .and_then(|encoded| self.backend.set(key, &encoded));

        match result {
            Ok(()) => PersistOutcome::Persisted,
            Err(e) => {
                self.record_failure(key, &e);
                PersistOutcome::MemoryOnly(e)
            }
        }
    }

    fn record_failure(&self, key: &str, error: &StoreError) {
        let total = self.persistence_failures.fetch_add(1, Ordering::Relaxed) + 1;
        log::warn!(
            "Could not persist {}, keeping it in memory only ({} failures so far): {}",
            key,
            total,
            error
        );
    }
}
