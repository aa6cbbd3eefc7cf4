//! Bluetooth device addressing.

use crate::{Error, Result};
use serde::{Deserialize, Deserializer};
use std::str::FromStr;

/// Number of octets in a Bluetooth device address.
const OCTETS: usize = 6;

/// A Bluetooth device address, normalized to `XX:XX:XX:XX:XX:XX`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    /// Returns the normalized address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let octets: Vec<&str> = trimmed.split([':', '-']).collect();

        let valid = octets.len() == OCTETS
            && octets
                .iter()
                .all(|o| o.len() == 2 && o.chars().all(|c| c.is_ascii_hexdigit()));
        if !valid {
            return Err(Error::InvalidAddress(s.to_string()));
        }

        Ok(Address(octets.join(":").to_uppercase()))
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
