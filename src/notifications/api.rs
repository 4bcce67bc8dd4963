//! Public API for the notification system
//!
//! External modules should import from here rather than directly from internal modules.

use std::sync::Arc;
use tokio::sync::Mutex;

pub use crate::notifications::error::NotificationError;
pub use crate::notifications::event::{
    Event, EventFilter, SessionEvent, SessionEventType, StoreEvent, StoreEventType,
};
pub use crate::notifications::manager::{AsyncNotificationManager, EventReceiver};
pub use crate::notifications::traits::SubscriberStatistics;

/// Shared handle to a notification manager
///
/// Created once at startup and injected into the scan controller and the
/// front end.
pub type NotificationService = Arc<Mutex<AsyncNotificationManager>>;

pub fn new_notification_service() -> NotificationService {
    log::trace!("Initializing notification service");
    Arc::new(Mutex::new(AsyncNotificationManager::new()))
}

/// Publish an event; pruned subscribers are logged at debug level
pub async fn publish_event(service: &NotificationService, event: Event) {
    let mut manager = service.lock().await;
    if let Err(e) = manager.publish(event).await {
        log::debug!("{}", e);
    }
}
