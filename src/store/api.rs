//! Public API for the history & cache store

pub use crate::store::analytics::{compute_analytics, compute_analytics_in, Analytics};
pub use crate::store::backend::{FileBackend, KeyValueBackend, MemoryBackend};
pub use crate::store::error::{StoreError, StoreResult};
pub use crate::store::history::{
    HistoryStore, PersistOutcome, RECENT_PRODUCTS_KEY, RECENT_PRODUCTS_LIMIT, SCAN_HISTORY_KEY,
    SELECTED_PRODUCT_KEY,
};
pub use crate::store::types::{ProductRecord, ScanEvent, UNKNOWN_PRODUCT};
