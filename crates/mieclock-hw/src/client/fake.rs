//! In-memory client used for simulation and tests.

use super::{Client, Reading};
use crate::{Address, Error, Metric, Result};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

#[derive(Debug)]
struct FakeState {
    reading: Reading,
    failure: Option<(Option<Metric>, String)>,
    calls: usize,
}

/// In-memory client serving a fixed reading.
///
/// The reading and failure mode can be changed at any time through a
/// [`FakeHandle`], which also counts accessor calls.
#[derive(Debug)]
pub struct FakeClient {
    address: Address,
    state: Arc<Mutex<FakeState>>,
}

/// Shared control over a [`FakeClient`].
#[derive(Debug, Clone)]
pub struct FakeHandle {
    state: Arc<Mutex<FakeState>>,
}

impl FakeClient {
    /// Creates a fake client that always returns `reading`.
    pub fn new(address: Address, reading: Reading) -> Self {
        Self {
            address,
            state: Arc::new(Mutex::new(FakeState {
                reading,
                failure: None,
                calls: 0,
            })),
        }
    }

    /// Returns a handle for scripting this client.
    pub fn handle(&self) -> FakeHandle {
        FakeHandle {
            state: self.state.clone(),
        }
    }

    fn read<T>(&self, metric: Metric, pick: impl FnOnce(&Reading) -> T) -> Result<T> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.calls += 1;

        if let Some((target, message)) = &state.failure {
            if target.map_or(true, |t| t == metric) {
                debug!("Fake {} read on {} failing: {}", metric, self.address, message);
                return Err(Error::Client {
                    address: self.address.to_string(),
                    message: message.clone(),
                });
            }
        }

        Ok(pick(&state.reading))
    }
}

impl FakeHandle {
    /// Replaces the reading served from now on.
    pub fn set_reading(&self, reading: Reading) {
        self.lock().reading = reading;
    }

    /// Makes every accessor fail with `message`.
    pub fn fail(&self, message: &str) {
        self.lock().failure = Some((None, message.to_string()));
    }

    /// Makes only the accessor for `metric` fail with `message`.
    pub fn fail_on(&self, metric: Metric, message: &str) {
        self.lock().failure = Some((Some(metric), message.to_string()));
    }

    /// Clears any configured failure.
    pub fn recover(&self) {
        self.lock().failure = None;
    }

    /// Number of accessor calls made so far, failed ones included.
    pub fn calls(&self) -> usize {
        self.lock().calls
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Client for FakeClient {
    fn address(&self) -> &Address {
        &self.address
    }

    fn temperature(&mut self) -> Result<f64> {
        self.read(Metric::Temperature, |r| r.temperature)
    }

    fn humidity(&mut self) -> Result<u8> {
        self.read(Metric::Humidity, |r| r.humidity)
    }

    fn battery(&mut self) -> Result<u8> {
        self.read(Metric::Battery, |r| r.battery)
    }
}
