//! AsyncNotificationManager implementation

use crate::notifications::error::NotificationError;
use crate::notifications::event::{Event, EventFilter};
use crate::notifications::traits::SubscriberStatistics;
use std::collections::HashMap;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

pub type EventReceiver = UnboundedReceiver<Event>;

struct SubscriberInfo {
    filter: EventFilter,
    source: String,
    sender: UnboundedSender<Event>,
    statistics: SubscriberStatistics,
}

pub struct AsyncNotificationManager {
    subscribers: HashMap<String, SubscriberInfo>,
}

impl Default for AsyncNotificationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AsyncNotificationManager {
    pub fn new() -> Self {
        Self {
            subscribers: HashMap::new(),
        }
    }

    /// Register a subscriber; an existing subscription with the same id is replaced
    pub fn subscribe(
        &mut self,
        subscriber_id: String,
        filter: EventFilter,
        source: String,
    ) -> EventReceiver {
        let (sender, receiver) = unbounded_channel();

        let subscriber_info = SubscriberInfo {
            filter,
            source: source.clone(),
            sender,
            statistics: SubscriberStatistics::new(),
        };

        if let Some(existing) = self
            .subscribers
            .insert(subscriber_id.clone(), subscriber_info)
        {
            log::warn!(
                "Subscriber '{}' replaced existing subscription (source: {} -> {})",
                subscriber_id,
                existing.source,
                source
            );
        } else {
            log::trace!("Subscriber '{}' registered ({})", subscriber_id, source);
        }

        receiver
    }

    /// Remove a subscriber, returning its delivery statistics
    pub fn unsubscribe(&mut self, subscriber_id: &str) -> Option<SubscriberStatistics> {
        self.subscribers
            .remove(subscriber_id)
            .map(|info| info.statistics)
    }

    /// Deliver `event` to every subscriber whose filter accepts it
    ///
    /// Subscribers whose receiver has been dropped are removed and reported
    /// in the returned error; delivery to the others is unaffected.
    pub async fn publish(&mut self, event: Event) -> Result<(), NotificationError> {
        let mut failed_subscribers = Vec::new();

        for (subscriber_id, subscriber_info) in self.subscribers.iter_mut() {
            if !subscriber_info.filter.accepts(&event) {
                continue;
            }
            if subscriber_info.sender.send(event.clone()).is_err() {
                failed_subscribers.push(subscriber_id.clone());
            } else {
                subscriber_info.statistics.record_delivery();
            }
        }

        for subscriber_id in &failed_subscribers {
            self.subscribers.remove(subscriber_id);
        }

        if !failed_subscribers.is_empty() {
            return Err(NotificationError::PublishFailed {
                event_type: event.kind().to_string(),
                failed_subscribers,
            });
        }

        Ok(())
    }
}
