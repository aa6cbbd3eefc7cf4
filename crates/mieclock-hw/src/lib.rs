//! Mi e-ink Clock Device Library
//!
//! Provides the device-facing pieces for the Xiaomi Mi e-ink clock
//! (LYWSD02) temperature and humidity sensor: the metric table, device
//! addressing, and the client seam the BLE transport plugs into.

pub mod address;
pub mod client;
pub mod error;
pub mod metric;

pub use address::Address;
pub use client::{Client, FakeClient, FakeHandle, Reading};
pub use error::{Error, Result};
pub use metric::{DeviceClass, Metric, MetricDescriptor};

/// Display name prefix used when the configuration does not set one.
pub const DEFAULT_NAME: &str = "Mi eClock BT";
