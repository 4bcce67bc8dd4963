//! Lookup-and-persist step shared by the scan controller and direct lookups

use crate::core::time::{SystemTimeProvider, TimeProvider};
use crate::notifications::api::{publish_event, Event, NotificationService, StoreEvent, StoreEventType};
use crate::scanner::error::ScanResult;
use crate::service::api::ProductService;
use crate::store::api::{
    HistoryStore, PersistOutcome, ProductRecord, ScanEvent, RECENT_PRODUCTS_KEY, SCAN_HISTORY_KEY,
};
use std::sync::Arc;

/// Looks a barcode up and writes a successful result through to the store
///
/// Failures are returned as-is; nothing is retried.
#[derive(Clone)]
pub struct LookupPipeline {
    service: Arc<dyn ProductService>,
    store: Arc<HistoryStore>,
    notifications: NotificationService,
    clock: Arc<dyn TimeProvider>,
}

impl LookupPipeline {
    pub fn new(
        service: Arc<dyn ProductService>,
        store: Arc<HistoryStore>,
        notifications: NotificationService,
    ) -> Self {
        Self {
            service,
            store,
            notifications,
            clock: Arc::new(SystemTimeProvider),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn TimeProvider>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &Arc<HistoryStore> {
        &self.store
    }

    pub fn notifications(&self) -> &NotificationService {
        &self.notifications
    }

    pub async fn lookup_and_persist(&self, barcode: &str) -> ScanResult<ProductRecord> {
        let product = self.service.lookup_barcode(barcode).await?;

        let event = ScanEvent::from_product(&product, self.clock.now_millis());
        let outcome = self.store.append_scan_event(event);
        self.report(
            outcome,
            StoreEventType::HistoryAppended,
            SCAN_HISTORY_KEY,
            self.store.scan_history().len(),
        )
        .await;

        let outcome = self.store.upsert_recent_product(product.clone());
        self.report(
            outcome,
            StoreEventType::RecentUpdated,
            RECENT_PRODUCTS_KEY,
            self.store.recent_products().len(),
        )
        .await;

        Ok(product)
    }

    async fn report(
        &self,
        outcome: PersistOutcome,
        event_type: StoreEventType,
        key: &str,
        size: usize,
    ) {
        let event = match outcome {
            PersistOutcome::Persisted => StoreEvent::with_size(event_type, key, size),
            PersistOutcome::MemoryOnly(e) => {
                StoreEvent::with_message(StoreEventType::PersistFailed, key, e.to_string())
            }
        };
        publish_event(&self.notifications, Event::Store(event)).await;
    }
}
