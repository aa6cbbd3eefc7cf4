//! Throttled data poller shared by every sensor of one device.

use super::data::{MetricValue, ReadingSet};
use mieclock_hw::{Address, Client, Error, Metric, Reading};
use std::sync::{Mutex, PoisonError, RwLock, TryLockError};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Result of a single [`DataPoller::refresh`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// The client was queried and the reading set replaced.
    Fetched,
    /// The minimum interval has not elapsed; cached data kept.
    Throttled,
    /// Another refresh is talking to the device; cached data kept.
    Busy,
    /// The client failed; cached data kept.
    Failed(Error),
}

impl std::fmt::Display for RefreshOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefreshOutcome::Fetched => write!(f, "fetched"),
            RefreshOutcome::Throttled => write!(f, "throttled"),
            RefreshOutcome::Busy => write!(f, "busy"),
            RefreshOutcome::Failed(e) => write!(f, "failed: {}", e),
        }
    }
}

/// Client plus throttle bookkeeping, held for the duration of a fetch.
struct Fetcher {
    client: Box<dyn Client>,
    min_interval: Duration,
    last_success: Option<Instant>,
}

impl Fetcher {
    fn fetch(&mut self) -> mieclock_hw::Result<ReadingSet> {
        let reading = Reading {
            temperature: self.client.temperature()?,
            humidity: self.client.humidity()?,
            battery: self.client.battery()?,
        };
        ReadingSet::from_reading(&reading)
    }

    fn is_throttled(&self, now: Instant) -> bool {
        self.last_success
            .is_some_and(|last| now.saturating_duration_since(last) < self.min_interval)
    }
}

/// Owns the device client and the most recent readings.
pub struct DataPoller {
    address: Address,
    fetcher: Mutex<Fetcher>,
    data: RwLock<ReadingSet>,
}

impl DataPoller {
    /// Creates a poller that queries `client` at most once per `min_interval`.
    pub fn new(client: Box<dyn Client>, min_interval: Duration) -> Self {
        Self {
            address: client.address().clone(),
            fetcher: Mutex::new(Fetcher {
                client,
                min_interval,
                last_success: None,
            }),
            data: RwLock::new(ReadingSet::default()),
        }
    }

    /// Returns the device address.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Refreshes the readings unless throttled.
    pub fn refresh(&self) -> RefreshOutcome {
        self.refresh_at(Instant::now())
    }

    /// Refreshes the readings as if the current time were `now`.
    ///
    /// Failures are logged and leave the previous readings in place.
    pub fn refresh_at(&self, now: Instant) -> RefreshOutcome {
        let mut fetcher = match self.fetcher.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => {
                debug!("Fetch already in progress for {}", self.address);
                return RefreshOutcome::Busy;
            }
            Err(TryLockError::Poisoned(e)) => e.into_inner(),
        };

        if fetcher.is_throttled(now) {
            debug!("Skipping fetch for {}: throttled", self.address);
            return RefreshOutcome::Throttled;
        }

        match fetcher.fetch() {
            Ok(readings) => {
                debug!("Fetched readings for {}: {:?}", self.address, readings);
                *self.data.write().unwrap_or_else(PoisonError::into_inner) = readings;
                fetcher.last_success = Some(now);
                RefreshOutcome::Fetched
            }
            Err(e) => {
                warn!("Could not update data from {}: {}", self.address, e);
                RefreshOutcome::Failed(e)
            }
        }
    }

    /// Returns the cached value for `metric`.
    pub fn current_value(&self, metric: Metric) -> Option<MetricValue> {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(metric)
    }

    #[cfg(test)]
    fn readings(&self) -> ReadingSet {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mieclock_hw::{FakeClient, FakeHandle};
    use std::sync::Arc;

    const INTERVAL: Duration = Duration::from_secs(30);

    fn reading(temperature: f64) -> Reading {
        Reading {
            temperature,
            humidity: 45,
            battery: 80,
        }
    }

    fn poller() -> (DataPoller, FakeHandle) {
        let client = FakeClient::new("E7:2E:01:6A:1B:2C".parse().unwrap(), reading(21.96));
        let handle = client.handle();
        (DataPoller::new(Box::new(client), INTERVAL), handle)
    }

    #[test]
    fn test_first_refresh_fetches() {
        let (poller, handle) = poller();
        assert!(poller.readings().is_empty());

        assert_eq!(poller.refresh(), RefreshOutcome::Fetched);
        assert_eq!(handle.calls(), 3);
        assert_eq!(
            poller.current_value(Metric::Temperature),
            Some(MetricValue::Tenths(219))
        );
        assert_eq!(
            poller.current_value(Metric::Humidity),
            Some(MetricValue::Integer(45))
        );
    }

    #[test]
    fn test_throttle_window() {
        let (poller, handle) = poller();
        let start = Instant::now();

        assert_eq!(poller.refresh_at(start), RefreshOutcome::Fetched);
        for secs in [0, 1, 10, 29] {
            let at = start + Duration::from_secs(secs);
            assert_eq!(poller.refresh_at(at), RefreshOutcome::Throttled);
        }
        assert_eq!(handle.calls(), 3);

        assert_eq!(
            poller.refresh_at(start + INTERVAL),
            RefreshOutcome::Fetched
        );
        assert_eq!(handle.calls(), 6);
    }

    #[test]
    fn test_throttled_refresh_keeps_cached_data() {
        let (poller, handle) = poller();
        let start = Instant::now();

        poller.refresh_at(start);
        handle.set_reading(reading(22.5));
        poller.refresh_at(start + Duration::from_secs(5));

        assert_eq!(
            poller.current_value(Metric::Temperature),
            Some(MetricValue::Tenths(219))
        );
    }

    #[test]
    fn test_failure_leaves_readings_unchanged() {
        let (poller, handle) = poller();
        let start = Instant::now();

        poller.refresh_at(start);
        let before = poller.readings();

        handle.set_reading(reading(30.0));
        handle.fail("device disconnected");
        let outcome = poller.refresh_at(start + INTERVAL);
        assert!(matches!(outcome, RefreshOutcome::Failed(Error::Client { .. })));
        assert_eq!(poller.readings(), before);
    }

    #[test]
    fn test_partial_failure_is_not_observable() {
        let (poller, handle) = poller();
        let start = Instant::now();

        poller.refresh_at(start);
        handle.set_reading(Reading {
            temperature: 30.0,
            humidity: 60,
            battery: 10,
        });
        // Temperature and humidity succeed, battery fails.
        handle.fail_on(Metric::Battery, "timeout");

        let outcome = poller.refresh_at(start + INTERVAL);
        assert!(matches!(outcome, RefreshOutcome::Failed(_)));
        assert_eq!(
            poller.current_value(Metric::Temperature),
            Some(MetricValue::Tenths(219))
        );
        assert_eq!(
            poller.current_value(Metric::Humidity),
            Some(MetricValue::Integer(45))
        );
    }

    #[test]
    fn test_failure_before_any_success_stays_empty() {
        let (poller, handle) = poller();
        handle.fail("no such device");

        assert!(matches!(poller.refresh(), RefreshOutcome::Failed(_)));
        assert!(poller.readings().is_empty());
        assert_eq!(poller.current_value(Metric::Temperature), None);
        assert_eq!(poller.current_value(Metric::Battery), None);
    }

    #[test]
    fn test_failure_does_not_start_throttle_window() {
        let (poller, handle) = poller();
        let start = Instant::now();

        handle.fail("no such device");
        poller.refresh_at(start);

        handle.recover();
        assert_eq!(
            poller.refresh_at(start + Duration::from_secs(1)),
            RefreshOutcome::Fetched
        );
    }

    #[test]
    fn test_invalid_temperature_is_a_failure() {
        let (poller, handle) = poller();
        let start = Instant::now();

        poller.refresh_at(start);
        handle.set_reading(reading(f64::NAN));

        let outcome = poller.refresh_at(start + INTERVAL);
        assert!(matches!(
            outcome,
            RefreshOutcome::Failed(Error::InvalidReading { .. })
        ));
        assert_eq!(
            poller.current_value(Metric::Temperature),
            Some(MetricValue::Tenths(219))
        );
    }

    #[test]
    fn test_concurrent_refreshes_share_one_fetch() {
        let (poller, handle) = poller();
        let poller = Arc::new(poller);

        let threads: Vec<_> = (0..4)
            .map(|_| {
                let poller = poller.clone();
                std::thread::spawn(move || poller.refresh())
            })
            .collect();
        let outcomes: Vec<_> = threads.into_iter().map(|t| t.join().unwrap()).collect();

        let fetched = outcomes
            .iter()
            .filter(|o| **o == RefreshOutcome::Fetched)
            .count();
        assert_eq!(fetched, 1);
        assert_eq!(handle.calls(), 3);
    }
}
