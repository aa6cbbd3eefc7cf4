//! Error types for the Mi e-ink clock device library.

use crate::Metric;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the device.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Device address is not a valid Bluetooth address.
    #[error("Invalid device address: {0}")]
    InvalidAddress(String),

    /// Metric name outside the supported set.
    #[error("Unknown metric: {0}")]
    InvalidMetric(String),

    /// The client could not read a value from the device.
    #[error("Client error on {address}: {message}")]
    Client { address: String, message: String },

    /// The client returned a value that cannot be stored.
    #[error("Invalid {metric} reading: {value}")]
    InvalidReading { metric: Metric, value: f64 },
}
