//! Metrics reported by the clock and their fixed descriptors.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A value the clock can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Ambient temperature in °C.
    Temperature,
    /// Relative humidity in percent.
    Humidity,
    /// Battery level in percent.
    Battery,
}

/// Device classification tag attached to an exposed metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Temperature,
    Humidity,
    Battery,
}

/// Static description of how a metric is exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricDescriptor {
    /// Classification tag.
    pub device_class: DeviceClass,
    /// Display name, before any prefix is applied.
    pub name: &'static str,
    /// Unit of measurement.
    pub unit: &'static str,
}

impl Metric {
    /// All metrics, in their default exposure order.
    pub const ALL: [Metric; 3] = [Metric::Temperature, Metric::Humidity, Metric::Battery];

    /// Returns the metric identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Temperature => "temperature",
            Metric::Humidity => "humidity",
            Metric::Battery => "battery",
        }
    }

    /// Returns the fixed descriptor for this metric.
    pub fn descriptor(&self) -> MetricDescriptor {
        match self {
            Metric::Temperature => MetricDescriptor {
                device_class: DeviceClass::Temperature,
                name: "Temperature",
                unit: "°C",
            },
            Metric::Humidity => MetricDescriptor {
                device_class: DeviceClass::Humidity,
                name: "Humidity",
                unit: "%",
            },
            Metric::Battery => MetricDescriptor {
                device_class: DeviceClass::Battery,
                name: "Battery",
                unit: "%",
            },
        }
    }
}

impl FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "temperature" => Ok(Metric::Temperature),
            "humidity" => Ok(Metric::Humidity),
            "battery" => Ok(Metric::Battery),
            _ => Err(Error::InvalidMetric(s.to_string())),
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceClass::Temperature => write!(f, "temperature"),
            DeviceClass::Humidity => write!(f, "humidity"),
            DeviceClass::Battery => write!(f, "battery"),
        }
    }
}
