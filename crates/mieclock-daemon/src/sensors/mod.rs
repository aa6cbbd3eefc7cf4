//! Sensor entities exposed for the clock.
//!
//! Each [`MetricSensor`] exposes one metric and reads it from a
//! [`DataPoller`] shared with the other sensors of the same device.

pub mod data;
pub mod poller;

pub use data::MetricValue;
pub use poller::{DataPoller, RefreshOutcome};

use chrono::{DateTime, Utc};
use mieclock_hw::{DeviceClass, Metric};
use std::sync::Arc;

/// State reported for a sensor that has never observed a value.
pub const STATE_UNKNOWN: &str = "unknown";

/// Capability shared by all exposed entities.
pub trait Entity: Send {
    /// Returns the display name.
    fn name(&self) -> &str;

    /// Returns the last observed value.
    fn value(&self) -> Option<MetricValue>;

    /// Returns the unit of measurement.
    fn unit(&self) -> &str;

    /// Returns the device classification.
    fn device_class(&self) -> DeviceClass;

    /// Returns when the observed value last changed.
    fn last_updated(&self) -> Option<DateTime<Utc>>;

    /// Pulls fresh data into the entity.
    fn refresh(&mut self) -> RefreshOutcome;

    /// Returns the value rendered as a state string.
    fn state(&self) -> String {
        self.value()
            .map(|v| v.to_string())
            .unwrap_or_else(|| STATE_UNKNOWN.to_string())
    }
}

/// Exposes a single metric from a shared poller.
pub struct MetricSensor {
    poller: Arc<DataPoller>,
    metric: Metric,
    device_class: DeviceClass,
    name: String,
    unit: String,
    value: Option<MetricValue>,
    last_updated: Option<DateTime<Utc>>,
}

impl MetricSensor {
    /// Creates a sensor for `metric` backed by `poller`.
    pub fn new(
        poller: Arc<DataPoller>,
        metric: Metric,
        device_class: DeviceClass,
        name: String,
        unit: &str,
    ) -> Self {
        Self {
            poller,
            metric,
            device_class,
            name,
            unit: unit.to_string(),
            value: None,
            last_updated: None,
        }
    }

    /// Returns the metric this sensor exposes.
    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Refreshes the shared poller as of `now` and picks up this sensor's value.
    #[cfg(test)]
    pub fn refresh_at(&mut self, now: std::time::Instant) -> RefreshOutcome {
        let outcome = self.poller.refresh_at(now);
        self.observe();
        outcome
    }

    fn observe(&mut self) {
        let value = self.poller.current_value(self.metric);
        if value != self.value {
            self.value = value;
            self.last_updated = Some(Utc::now());
        }
    }
}

impl Entity for MetricSensor {
    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> Option<MetricValue> {
        self.value
    }

    fn unit(&self) -> &str {
        &self.unit
    }

    fn device_class(&self) -> DeviceClass {
        self.device_class
    }

    fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    fn refresh(&mut self) -> RefreshOutcome {
        let outcome = self.poller.refresh();
        self.observe();
        outcome
    }
}
