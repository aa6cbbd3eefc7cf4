//! Configuration management.

use anyhow::{bail, Context, Result};
use mieclock_hw::{Address, Metric, Reading, DEFAULT_NAME};
use serde::{Deserialize, Deserializer};
use std::num::NonZeroU64;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Bluetooth address of the clock
    pub mac: Address,

    /// Prefix for sensor display names (empty for none)
    #[serde(default = "default_name")]
    pub name: String,

    /// Metrics to expose, in order
    #[serde(
        default = "default_monitored_conditions",
        deserialize_with = "deserialize_conditions"
    )]
    pub monitored_conditions: Vec<Metric>,

    /// Minimum seconds between device fetches
    #[serde(default = "default_interval")]
    pub update_interval: NonZeroU64,

    /// Seconds between sensor refresh rounds
    #[serde(default = "default_interval")]
    pub scan_interval: NonZeroU64,

    /// Fixed readings served instead of a real device
    #[serde(default)]
    pub simulate: Option<Reading>,
}

/// Either a single value or a list of values.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn deserialize_conditions<'de, D>(deserializer: D) -> std::result::Result<Vec<Metric>, D::Error>
where
    D: Deserializer<'de>,
{
    let names = match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(name) => vec![name],
        OneOrMany::Many(names) => names,
    };

    names
        .iter()
        .map(|name| name.parse().map_err(serde::de::Error::custom))
        .collect()
}

// Default value functions
fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

fn default_monitored_conditions() -> Vec<Metric> {
    Metric::ALL.to_vec()
}

fn default_interval() -> NonZeroU64 {
    NonZeroU64::new(30).unwrap_or(NonZeroU64::MIN)
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read configuration file")?;
        Self::parse(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(content).context("Failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&mut self) -> Result<()> {
        if self.monitored_conditions.is_empty() {
            bail!("monitored_conditions must name at least one metric");
        }

        let mut seen = Vec::with_capacity(self.monitored_conditions.len());
        for metric in &self.monitored_conditions {
            if seen.contains(metric) {
                warn!("Ignoring duplicate monitored condition: {}", metric);
            } else {
                seen.push(*metric);
            }
        }
        self.monitored_conditions = seen;

        Ok(())
    }

    /// Minimum time between device fetches.
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval.get())
    }

    /// Time between sensor refresh rounds.
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval.get())
    }
}
