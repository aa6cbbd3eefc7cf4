//! Sensor platform wiring.
//!
//! Builds one client and one shared poller per configured device, then one
//! sensor per monitored condition.

use anyhow::{bail, Result};
use mieclock_hw::{Client, FakeClient, MetricDescriptor};
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::sensors::{DataPoller, MetricSensor};

/// Creates the device client selected by the configuration.
pub fn build_client(config: &Config) -> Result<Box<dyn Client>> {
    match config.simulate {
        Some(reading) => {
            info!("Simulating device {} with {:?}", config.mac, reading);
            Ok(Box::new(FakeClient::new(config.mac.clone(), reading)))
        }
        None => bail!(
            "No client backend for {}: BLE transport is not built in, add a [simulate] table",
            config.mac
        ),
    }
}

/// Sets up the sensors for one device.
pub fn setup_platform(config: &Config, client: Box<dyn Client>) -> Vec<MetricSensor> {
    let poller = Arc::new(DataPoller::new(client, config.update_interval()));
    info!(
        "Polling {} at most every {}s",
        poller.address(),
        config.update_interval
    );

    config
        .monitored_conditions
        .iter()
        .map(|metric| {
            let descriptor = metric.descriptor();
            MetricSensor::new(
                poller.clone(),
                *metric,
                descriptor.device_class,
                sensor_name(&config.name, &descriptor),
                descriptor.unit,
            )
        })
        .collect()
}

/// Display name for a sensor, with the configured prefix applied.
pub fn sensor_name(prefix: &str, descriptor: &MetricDescriptor) -> String {
    if prefix.is_empty() {
        descriptor.name.to_string()
    } else {
        format!("{} {}", prefix, descriptor.name)
    }
}
