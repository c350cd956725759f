// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Radio addresses of MAX! devices.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValueError;

/// The 3-byte radio identifier of a MAX! device.
///
/// Radio addresses are the only stable key across gateway messages: the
/// Metadata frame assigns names and rooms by address, and Configuration and
/// LiveStatus frames are correlated to known devices by it. Rendered as
/// 6 uppercase hexadecimal characters, matching the gateway's own notation.
///
/// # Examples
///
/// ```
/// use maxcube_lib::types::RfAddress;
///
/// let addr: RfAddress = "0A1B2C".parse().unwrap();
/// assert_eq!(addr.to_string(), "0A1B2C");
/// assert_eq!(addr.octets(), [0x0A, 0x1B, 0x2C]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RfAddress([u8; 3]);

impl RfAddress {
    /// The null address used as the broadcast placeholder in write frames.
    pub const NULL: Self = Self([0, 0, 0]);

    /// Creates an address from its three raw octets.
    #[must_use]
    pub const fn new(octets: [u8; 3]) -> Self {
        Self(octets)
    }

    /// Returns the raw octets, most significant first.
    #[must_use]
    pub const fn octets(&self) -> [u8; 3] {
        self.0
    }

    /// Reads an address from the first three bytes of a buffer.
    ///
    /// Returns `None` if the buffer is shorter than three bytes.
    #[must_use]
    pub(crate) fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let octets: [u8; 3] = bytes.get(..3)?.try_into().ok()?;
        Some(Self(octets))
    }
}

impl fmt::Display for RfAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}{:02X}{:02X}", self.0[0], self.0[1], self.0[2])
    }
}

impl FromStr for RfAddress {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 6 || !s.is_ascii() {
            return Err(ValueError::InvalidRfAddress(s.to_string()));
        }
        let mut octets = [0u8; 3];
        for (i, octet) in octets.iter_mut().enumerate() {
            *octet = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)
                .map_err(|_| ValueError::InvalidRfAddress(s.to_string()))?;
        }
        Ok(Self(octets))
    }
}

impl Serialize for RfAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RfAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_uppercase_hex() {
        let addr = RfAddress::new([0xab, 0x01, 0xff]);
        assert_eq!(addr.to_string(), "AB01FF");
    }

    #[test]
    fn parse_accepts_both_cases() {
        let lower: RfAddress = "ab01ff".parse().unwrap();
        let upper: RfAddress = "AB01FF".parse().unwrap();
        assert_eq!(lower, upper);
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!("AB01".parse::<RfAddress>().is_err());
        assert!("AB01FG".parse::<RfAddress>().is_err());
        assert!("AB01FF00".parse::<RfAddress>().is_err());
    }

    #[test]
    fn from_bytes_requires_three() {
        assert!(RfAddress::from_bytes(&[1, 2]).is_none());
        assert_eq!(
            RfAddress::from_bytes(&[1, 2, 3, 4]),
            Some(RfAddress::new([1, 2, 3]))
        );
    }

    #[test]
    fn serde_round_trip() {
        let addr = RfAddress::new([0x01, 0x02, 0x03]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"010203\"");
        let back: RfAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
