//! Subscriber bookkeeping for the notification system

/// Delivery statistics for one subscriber
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SubscriberStatistics {
    events_delivered: usize,
}

impl SubscriberStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events_delivered(&self) -> usize {
        self.events_delivered
    }

    pub fn record_delivery(&mut self) {
        self.events_delivered += 1;
    }
}
