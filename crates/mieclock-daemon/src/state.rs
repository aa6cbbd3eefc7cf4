//! Serializable entity state snapshots.

use chrono::{DateTime, Utc};
use mieclock_hw::DeviceClass;
use serde::Serialize;

use crate::sensors::Entity;

/// Snapshot of an entity as reported to consumers.
#[derive(Debug, Clone, Serialize)]
pub struct EntityState {
    pub entity_id: String,
    pub state: String,
    pub attributes: Attributes,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Descriptive attributes attached to a state.
#[derive(Debug, Clone, Serialize)]
pub struct Attributes {
    pub friendly_name: String,
    pub unit_of_measurement: String,
    pub device_class: DeviceClass,
}

impl EntityState {
    /// Captures the current state of `entity`.
    pub fn from_entity(entity: &dyn Entity) -> Self {
        Self {
            entity_id: format!("sensor.{}", slugify(entity.name())),
            state: entity.state(),
            attributes: Attributes {
                friendly_name: entity.name().to_string(),
                unit_of_measurement: entity.unit().to_string(),
                device_class: entity.device_class(),
            },
            last_updated: entity.last_updated(),
        }
    }
}

/// Lowercases `name` and joins its alphanumeric runs with underscores.
fn slugify(name: &str) -> String {
    name.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::{DataPoller, MetricSensor};
    use mieclock_hw::{FakeClient, Metric, Reading};
    use std::sync::Arc;
    use std::time::Duration;

    fn sensor() -> MetricSensor {
        let client = FakeClient::new(
            "E7:2E:01:6A:1B:2C".parse().unwrap(),
            Reading {
                temperature: -0.05,
                humidity: 45,
                battery: 80,
            },
        );
        let poller = Arc::new(DataPoller::new(Box::new(client), Duration::from_secs(30)));
        let descriptor = Metric::Temperature.descriptor();
        MetricSensor::new(
            poller,
            Metric::Temperature,
            descriptor.device_class,
            "Mi eClock BT Temperature".to_string(),
            descriptor.unit,
        )
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Mi eClock BT Temperature"), "mi_eclock_bt_temperature");
        assert_eq!(slugify("  Living-room  Battery "), "living_room_battery");
    }

    #[test]
    fn test_unknown_state() {
        let state = EntityState::from_entity(&sensor());
        assert_eq!(state.entity_id, "sensor.mi_eclock_bt_temperature");
        assert_eq!(state.state, "unknown");
        assert!(state.last_updated.is_none());
    }

    #[test]
    fn test_json_shape() {
        let mut sensor = sensor();
        sensor.refresh();

        let json = serde_json::to_value(EntityState::from_entity(&sensor)).unwrap();
        assert_eq!(json["state"], "-0.1");
        assert_eq!(json["attributes"]["unit_of_measurement"], "°C");
        assert_eq!(json["attributes"]["device_class"], "temperature");
        assert_eq!(
            json["attributes"]["friendly_name"],
            "Mi eClock BT Temperature"
        );
        assert!(json["last_updated"].is_string());
    }
}
