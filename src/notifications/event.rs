//! Event types for the notification system

use std::time::SystemTime;

use crate::scanner::api::{ErrorKind, SessionState};
use crate::store::api::ProductRecord;

#[derive(Clone, Debug, PartialEq)]
pub enum SessionEventType {
    StateChanged,
    CodeAccepted,
    ProductFound,
    LookupFailed,
    SessionFailed,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StoreEventType {
    HistoryAppended,
    RecentUpdated,
    PersistFailed,
}

/// Something that happened inside a scan session
///
/// `session_id` identifies the session the event belongs to; lookup results
/// can arrive after a newer session has started.
#[derive(Clone, Debug)]
pub struct SessionEvent {
    pub event_type: SessionEventType,
    pub timestamp: SystemTime,
    pub session_id: u64,
    pub state: SessionState,
    pub barcode: Option<String>,
    pub product: Option<ProductRecord>,
    pub error: Option<ErrorKind>,
    pub message: Option<String>,
}

impl SessionEvent {
    pub fn new(event_type: SessionEventType, session_id: u64, state: SessionState) -> Self {
        Self {
            event_type,
            timestamp: SystemTime::now(),
            session_id,
            state,
            barcode: None,
            product: None,
            error: None,
            message: None,
        }
    }

    pub fn with_barcode(mut self, barcode: &str) -> Self {
        self.barcode = Some(barcode.to_string());
        self
    }

    pub fn with_product(mut self, product: ProductRecord) -> Self {
        self.barcode = Some(product.barcode.clone());
        self.product = Some(product);
        self
    }

    pub fn with_error(mut self, kind: ErrorKind, message: String) -> Self {
        self.error = Some(kind);
        self.message = Some(message);
        self
    }
}

/// A write to the history & cache store
#[derive(Clone, Debug)]
pub struct StoreEvent {
    pub event_type: StoreEventType,
    pub timestamp: SystemTime,
    pub key: String,
    pub size: Option<usize>,
    pub message: Option<String>,
}

impl StoreEvent {
    pub fn new(event_type: StoreEventType, key: &str) -> Self {
        Self {
            event_type,
            timestamp: SystemTime::now(),
            key: key.to_string(),
            size: None,
            message: None,
        }
    }

    pub fn with_size(event_type: StoreEventType, key: &str, size: usize) -> Self {
        Self {
            size: Some(size),
            ..Self::new(event_type, key)
        }
    }

    pub fn with_message(event_type: StoreEventType, key: &str, message: String) -> Self {
        Self {
            message: Some(message),
            ..Self::new(event_type, key)
        }
    }
}

/// Unified event enum that encompasses all event types
#[derive(Clone, Debug)]
pub enum Event {
    Session(SessionEvent),
    Store(StoreEvent),
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Session(_) => "Session",
            Event::Store(_) => "Store",
        }
    }
}

/// Event filtering options for subscribers
#[derive(Clone, Debug, PartialEq)]
pub enum EventFilter {
    SessionOnly,
    StoreOnly,
    All,
}

impl EventFilter {
    /// Check if an event should be accepted by this filter
    pub fn accepts(&self, event: &Event) -> bool {
        matches!(
            (self, event),
            (EventFilter::SessionOnly, Event::Session(_))
                | (EventFilter::StoreOnly, Event::Store(_))
                | (EventFilter::All, _)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_event_builders() {
        let event = SessionEvent::new(SessionEventType::CodeAccepted, 3, SessionState::Detected)
            .with_barcode("3017620422003");
        assert_eq!(event.event_type, SessionEventType::CodeAccepted);
        assert_eq!(event.session_id, 3);
        assert_eq!(event.barcode.as_deref(), Some("3017620422003"));
        assert!(event.product.is_none());

        let mut product = ProductRecord::new("42");
        product.product_name = Some("Oat drink".to_string());
        let found = SessionEvent::new(SessionEventType::ProductFound, 3, SessionState::Idle)
            .with_product(product);
        assert_eq!(found.barcode.as_deref(), Some("42"));

        let failed = SessionEvent::new(SessionEventType::LookupFailed, 3, SessionState::Idle)
            .with_error(
                ErrorKind::ProductNotFound,
                "Product not found in database".to_string(),
            );
        assert_eq!(failed.error, Some(ErrorKind::ProductNotFound));
        assert_eq!(
            failed.message.as_deref(),
            Some("Product not found in database")
        );
    }

    #[test]
    fn test_store_event_creation() {
        let event = StoreEvent::with_size(StoreEventType::HistoryAppended, "scanHistory", 4);
        assert_eq!(event.key, "scanHistory");
        assert_eq!(event.size, Some(4));
        assert!(event.message.is_none());

        let failed = StoreEvent::with_message(
            StoreEventType::PersistFailed,
            "recentProducts",
            "disk full".to_string(),
        );
        assert!(failed.size.is_none());
        assert_eq!(failed.message.as_deref(), Some("disk full"));
    }

    #[test]
    fn test_event_filter_accepts() {
        let session = Event::Session(SessionEvent::new(
            SessionEventType::StateChanged,
            1,
            SessionState::Scanning,
        ));
        let store = Event::Store(StoreEvent::new(StoreEventType::RecentUpdated, "recentProducts"));

        assert!(EventFilter::SessionOnly.accepts(&session));
        assert!(!EventFilter::SessionOnly.accepts(&store));
        assert!(EventFilter::StoreOnly.accepts(&store));
        assert!(!EventFilter::StoreOnly.accepts(&session));
        assert!(EventFilter::All.accepts(&session));
        assert!(EventFilter::All.accepts(&store));

        assert_eq!(session.kind(), "Session");
        assert_eq!(store.kind(), "Store");
    }
}
