//! Clock abstraction for scan timestamps

#[cfg(test)]
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of wall-clock timestamps in epoch milliseconds
pub trait TimeProvider: Send + Sync {
    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;
}

/// Production time provider using the system clock
#[derive(Default, Clone)]
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now_millis(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }
}

/// Mock time provider for deterministic testing
#[derive(Clone)]
#[cfg(test)]
pub struct MockTimeProvider {
    current: Arc<Mutex<i64>>,
}

#[cfg(test)]
impl MockTimeProvider {
    pub fn at(millis: i64) -> Self {
        Self {
            current: Arc::new(Mutex::new(millis)),
        }
    }

    pub fn advance_millis(&self, millis: i64) {
        *self.current.lock().unwrap() += millis;
    }
}

#[cfg(test)]
impl TimeProvider for MockTimeProvider {
    fn now_millis(&self) -> i64 {
        *self.current.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_system_time_provider_is_monotonic_enough() {
        let provider = SystemTimeProvider;

        let first = provider.now_millis();
        std::thread::sleep(Duration::from_millis(2));
        let second = provider.now_millis();

        assert!(first > 1_600_000_000_000);
        assert!(second >= first);
    }

    #[test]
    fn test_mock_time_provider_advances() {
        let provider = MockTimeProvider::at(1_700_000_000_000);
        provider.advance_millis(86_400_000);

        assert_eq!(provider.now_millis(), 1_700_086_400_000);
    }
}
