// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `L:` live status decoder.
//!
//! A live status frame is a sequence of length-prefixed submessages, one
//! per device. Framing is kind-independent: the cursor always advances by
//! `length + 1`, so a submessage for an unknown address never desyncs the
//! rest of the frame. Interpreting a submessage's bytes requires knowing
//! the device kind, which only the registry has; that second step is
//! [`decode_submessage`].

use chrono::{NaiveDate, NaiveDateTime};

use super::decode_base64;
use crate::device::DeviceType;
use crate::error::DecodeError;
use crate::types::{Battery, RfAddress, Temperature, ThermostatMode};

/// One raw, framed submessage of a live status frame.
#[derive(Debug, Clone)]
pub struct Submessage {
    /// Address the submessage is about.
    pub rf_address: RfAddress,
    /// The submessage bytes, including the leading length byte.
    pub data: Vec<u8>,
}

/// A decoded live status frame: framing only, no interpretation.
#[derive(Debug, Clone)]
pub struct LiveStatus {
    /// Submessages in wire order.
    pub submessages: Vec<Submessage>,
}

pub(crate) fn decode(frame: &str) -> Result<LiveStatus, DecodeError> {
    let data = decode_base64(&frame[2..])?;
    let mut submessages = Vec::new();
    let mut pos = 0;

    while pos < data.len() {
        let length = usize::from(data[pos]);
        let submessage = data
            .get(pos..pos + length + 1)
            .ok_or(DecodeError::Truncated("live status submessage"))?;
        let rf_address = RfAddress::from_bytes(&submessage[1..])
            .ok_or(DecodeError::Truncated("submessage rf address"))?;
        submessages.push(Submessage {
            rf_address,
            data: submessage.to_vec(),
        });
        pos += length + 1;
    }

    Ok(LiveStatus { submessages })
}

/// Flag bits common to every device kind.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CommonFlags {
    pub initialized: bool,
    pub battery: Battery,
}

/// Kind-interpreted content of one submessage.
#[derive(Debug, Clone)]
pub(crate) enum DeviceUpdate {
    Thermostat {
        flags: CommonFlags,
        target_temperature: Temperature,
        locked: bool,
        mode: ThermostatMode,
        vacation_until: Option<NaiveDateTime>,
        valve_position: u8,
        /// `None` clears the reading (raw 0, or no reading in this mode).
        actual_temperature: Option<f64>,
    },
    WallThermostat {
        flags: CommonFlags,
        target_temperature: Temperature,
        locked: bool,
        mode: ThermostatMode,
        vacation_until: Option<NaiveDateTime>,
        actual_temperature: Option<f64>,
    },
    WindowShutter {
        flags: CommonFlags,
        is_open: bool,
    },
    /// Kinds with no operational bytes worth reading.
    Plain { flags: CommonFlags },
}

/// Interprets a submessage's bytes for a device of the given kind.
pub(crate) fn decode_submessage(
    kind: DeviceType,
    sub: &Submessage,
) -> Result<DeviceUpdate, DecodeError> {
    let d = sub.data.as_slice();
    if d.len() < 7 {
        return Err(DecodeError::Truncated("status flags"));
    }
    let flags2 = d[6];
    let flags = CommonFlags {
        initialized: d[5] & 0x02 != 0,
        battery: Battery::from_bit(flags2 & 0x80 != 0),
    };

    let update = match kind {
        DeviceType::RadiatorThermostat | DeviceType::RadiatorThermostatPlus => {
            if d.len() < 12 {
                return Err(DecodeError::Truncated("thermostat status"));
            }
            let mode = ThermostatMode::from_bits(flags2);
            let actual_temperature = match mode {
                ThermostatMode::Auto | ThermostatMode::Manual => {
                    let raw = (u16::from(d[9] & 0x03) << 8) | u16::from(d[10]);
                    reading_from_raw(raw)
                }
                _ => None,
            };
            DeviceUpdate::Thermostat {
                flags,
                target_temperature: Temperature::from_raw(d[8] & 0x7F),
                locked: flags2 & 0x20 != 0,
                mode,
                vacation_until: vacation_until(mode, d),
                valve_position: d[7],
                actual_temperature,
            }
        }
        DeviceType::WallThermostat => {
            if d.len() < 13 {
                return Err(DecodeError::Truncated("wall thermostat status"));
            }
            let mode = ThermostatMode::from_bits(flags2);
            let raw = (u16::from(d[8] & 0x80) << 1) | u16::from(d[12]);
            DeviceUpdate::WallThermostat {
                flags,
                target_temperature: Temperature::from_raw(d[8] & 0x7F),
                locked: flags2 & 0x20 != 0,
                mode,
                vacation_until: vacation_until(mode, d),
                actual_temperature: reading_from_raw(raw),
            }
        }
        DeviceType::WindowShutter => DeviceUpdate::WindowShutter {
            flags,
            is_open: flags2 & 0x02 != 0,
        },
        DeviceType::Cube => DeviceUpdate::Plain { flags },
    };
    Ok(update)
}

/// A raw reading of 0 means "no reading", not zero degrees.
fn reading_from_raw(raw: u16) -> Option<f64> {
    (raw != 0).then(|| f64::from(raw) / 10.0)
}

/// Assembles the vacation-end timestamp from its non-contiguous bits.
///
/// Returns `None` outside vacation mode, and also when the bytes do not
/// form a real calendar date (logged, not fatal).
fn vacation_until(mode: ThermostatMode, d: &[u8]) -> Option<NaiveDateTime> {
    if mode != ThermostatMode::Vacation {
        return None;
    }
    let day = u32::from(d[9] & 0x1F);
    let month = u32::from(((d[9] & 0xE0) >> 4) | ((d[10] & 0x40) >> 6));
    let year = 2000 + i32::from(d[10] & 0x1F);
    let hour = u32::from(d[11] >> 1);
    let minute = if d[11] & 0x01 != 0 { 30 } else { 0 };

    let timestamp = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0));
    if timestamp.is_none() {
        tracing::warn!(year, month, day, hour, "implausible vacation-end timestamp");
    }
    timestamp
}
