//! Reading set shared between the poller and the exposed sensors.

use mieclock_hw::{Error, Metric, Reading, Result};
use std::collections::HashMap;

/// A stored metric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricValue {
    /// Fixed point value with one fractional digit, in tenths.
    Tenths(i64),
    /// Whole number value.
    Integer(i64),
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            MetricValue::Tenths(tenths) => {
                let sign = if tenths < 0 { "-" } else { "" };
                let abs = tenths.unsigned_abs();
                write!(f, "{}{}.{}", sign, abs / 10, abs % 10)
            }
            MetricValue::Integer(value) => write!(f, "{}", value),
        }
    }
}

/// Rounds `raw` down to one fractional digit, toward negative infinity.
///
/// Products that land within float noise of a whole number of tenths are
/// taken as that number, so `2.3` stays `2.3`. Returns `None` for
/// non-finite input.
pub fn round_down_tenths(raw: f64) -> Option<i64> {
    let scaled = raw * 10.0;
    if !scaled.is_finite() {
        return None;
    }

    let nearest = scaled.round();
    let tenths = if (scaled - nearest).abs() <= 4.0 * f64::EPSILON * scaled.abs().max(1.0) {
        nearest
    } else {
        scaled.floor()
    };
    Some(tenths as i64)
}

/// Values from the most recent successful fetch, keyed by metric.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadingSet {
    values: HashMap<Metric, MetricValue>,
}

impl ReadingSet {
    /// Builds a reading set from raw client values.
    pub fn from_reading(reading: &Reading) -> Result<Self> {
        let temperature =
            round_down_tenths(reading.temperature).ok_or(Error::InvalidReading {
                metric: Metric::Temperature,
                value: reading.temperature,
            })?;

        let values = HashMap::from([
            (Metric::Temperature, MetricValue::Tenths(temperature)),
            (Metric::Humidity, MetricValue::Integer(reading.humidity.into())),
            (Metric::Battery, MetricValue::Integer(reading.battery.into())),
        ]);
        Ok(Self { values })
    }

    /// Returns the value stored for `metric`, if any.
    pub fn get(&self, metric: Metric) -> Option<MetricValue> {
        self.values.get(&metric).copied()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
