// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Operating mode and battery condition of MAX! devices.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Operating mode of a thermostat or wall thermostat.
///
/// Carried as the low two bits of the second flag byte in LiveStatus
/// submessages, and as bits 6-7 of the temperature byte in write frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThermostatMode {
    /// Following the weekly programme.
    Auto,
    /// Holding a manually set target temperature.
    Manual,
    /// Holding a fixed target until a stored end timestamp.
    Vacation,
    /// Driving the valve to the boost position for the boost duration.
    Boost,
}

impl ThermostatMode {
    /// Decodes the 2-bit wire value.
    #[must_use]
    pub(crate) const fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => Self::Auto,
            1 => Self::Manual,
            2 => Self::Vacation,
            _ => Self::Boost,
        }
    }

    /// Returns the 2-bit wire value.
    #[must_use]
    pub(crate) const fn bits(self) -> u8 {
        match self {
            Self::Auto => 0,
            Self::Manual => 1,
            Self::Vacation => 2,
            Self::Boost => 3,
        }
    }

    /// Returns the lowercase mode name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Manual => "manual",
            Self::Vacation => "vacation",
            Self::Boost => "boost",
        }
    }
}

impl fmt::Display for ThermostatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThermostatMode {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "manual" | "manu" => Ok(Self::Manual),
            "vacation" => Ok(Self::Vacation),
            "boost" => Ok(Self::Boost),
            _ => Err(ValueError::InvalidMode(s.to_string())),
        }
    }
}

/// Battery condition as reported by a device.
///
/// The gateway reports a single bit, not a voltage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Battery {
    /// Battery is fine.
    Ok,
    /// Battery needs replacing.
    Low,
}

impl Battery {
    /// Decodes the battery bit.
    #[must_use]
    pub(crate) const fn from_bit(bit: bool) -> Self {
        if bit { Self::Low } else { Self::Ok }
    }

    /// Returns `true` if the battery needs replacing.
    #[must_use]
    pub const fn is_low(self) -> bool {
        matches!(self, Self::Low)
    }
}

impl fmt::Display for Battery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ok => "ok",
            Self::Low => "low",
        })
    }
}
