// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Setpoint temperatures on the gateway's half-degree grid.

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValueError;

/// A setpoint temperature in half-degree Celsius increments.
///
/// The MAX! protocol carries every settable temperature as a count of
/// half degrees, so this type stores exactly that. Constructing from a
/// float validates the half-degree grid; values decoded from the wire are
/// grid-valid by construction.
///
/// The gateway accepts setpoints up to [`Temperature::MAX_SETTABLE`]
/// (32 °C); that bound is enforced by the command builders, not here,
/// because decoded configuration bytes can legitimately exceed it.
///
/// # Examples
///
/// ```
/// use maxcube_lib::types::Temperature;
///
/// let t = Temperature::from_celsius(21.5).unwrap();
/// assert_eq!(t.to_celsius(), 21.5);
///
/// // Off-grid values are rejected
/// assert!(Temperature::from_celsius(21.3).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Temperature(u8);

impl Temperature {
    /// The "off" setpoint (4.5 °C), the lowest target the valves accept.
    pub const OFF: Self = Self(9);

    /// The highest setpoint the gateway accepts in a write (32 °C).
    pub const MAX_SETTABLE: Self = Self(64);

    /// Creates a temperature from degrees Celsius.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::TemperatureNotHalfDegree`] if the value is not
    /// a multiple of 0.5, and [`ValueError::TemperatureTooHigh`] if it does
    /// not fit the protocol's 7-bit half-degree field (above 63.5 °C) or is
    /// negative.
    pub fn from_celsius(celsius: f64) -> Result<Self, ValueError> {
        let half_degrees = celsius * 2.0;
        if half_degrees.fract() != 0.0 {
            return Err(ValueError::TemperatureNotHalfDegree(celsius));
        }
        if !(0.0..=127.0).contains(&half_degrees) {
            return Err(ValueError::TemperatureTooHigh {
                max: 63.5,
                actual: celsius,
            });
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Ok(Self(half_degrees as u8))
    }

    /// Creates a temperature from a raw half-degree count off the wire.
    #[must_use]
    pub(crate) const fn from_raw(half_degrees: u8) -> Self {
        Self(half_degrees)
    }

    /// Returns the temperature in degrees Celsius.
    #[must_use]
    pub fn to_celsius(self) -> f64 {
        f64::from(self.0) / 2.0
    }

    /// Returns the raw half-degree count as carried on the wire.
    #[must_use]
    pub(crate) const fn raw(self) -> u8 {
        self.0
    }

    /// Returns `true` if this setpoint can be written to the gateway.
    #[must_use]
    pub fn is_settable(self) -> bool {
        self <= Self::MAX_SETTABLE
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_celsius())
    }
}

impl Serialize for Temperature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_celsius())
    }
}

impl<'de> Deserialize<'de> for Temperature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let celsius = f64::deserialize(deserializer)?;
        Self::from_celsius(celsius).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_degree_grid() {
        assert_eq!(Temperature::from_celsius(0.0).unwrap().raw(), 0);
        assert_eq!(Temperature::from_celsius(21.5).unwrap().raw(), 43);
        assert_eq!(Temperature::from_celsius(32.0).unwrap().raw(), 64);
        assert!(Temperature::from_celsius(21.25).is_err());
        assert!(Temperature::from_celsius(-0.5).is_err());
        assert!(Temperature::from_celsius(64.0).is_err());
    }

    #[test]
    fn settable_bound() {
        assert!(Temperature::from_celsius(32.0).unwrap().is_settable());
        assert!(!Temperature::from_celsius(32.5).unwrap().is_settable());
    }

    #[test]
    fn raw_round_trip() {
        for raw in 0..=127u8 {
            let t = Temperature::from_raw(raw);
            assert_eq!(Temperature::from_celsius(t.to_celsius()).unwrap(), t);
        }
    }

    #[test]
    fn display_and_serde() {
        let t = Temperature::from_celsius(17.0).unwrap();
        assert_eq!(t.to_string(), "17");
        assert_eq!(serde_json::to_string(&t).unwrap(), "17.0");
        let back: Temperature = serde_json::from_str("17.0").unwrap();
        assert_eq!(back, t);
    }
}
