//! Sensor client seam.
//!
//! The BLE transport lives behind [`Client`]. Every accessor performs a
//! blocking round-trip to the device and may fail.

mod fake;

pub use fake::{FakeClient, FakeHandle};

use crate::{Address, Result};
use serde::Deserialize;

/// Blocking client for a single clock.
pub trait Client: Send {
    /// Returns the address this client is bound to.
    fn address(&self) -> &Address;

    /// Reads the current temperature in °C.
    fn temperature(&mut self) -> Result<f64>;

    /// Reads the relative humidity in percent.
    fn humidity(&mut self) -> Result<u8>;

    /// Reads the battery level in percent.
    fn battery(&mut self) -> Result<u8>;
}

/// One complete set of raw device readings.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Reading {
    pub temperature: f64,
    pub humidity: u8,
    pub battery: u8,
}
