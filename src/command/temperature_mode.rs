// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Temperature/mode write frames.

use super::{CMD_SET_TEMPERATURE, RF_FLAG_ROOM, frame_head, wrap};
use crate::error::ValueError;
use crate::types::{RfAddress, Temperature, ThermostatMode};

/// Builds a frame setting one target's temperature and mode.
///
/// The payload byte packs the temperature in half degrees into the low
/// six bits and the mode into the top two: `(t * 2) | (mode << 6)`.
///
/// # Errors
///
/// Returns [`ValueError::TemperatureTooHigh`] above the gateway's 32-degree
/// write limit. The half-degree grid is enforced by [`Temperature`] itself.
pub(crate) fn build_temperature_mode(
    rf_address: RfAddress,
    room_id: u8,
    temperature: Temperature,
    mode: ThermostatMode,
) -> Result<String, ValueError> {
    if !temperature.is_settable() {
        return Err(ValueError::TemperatureTooHigh {
            max: Temperature::MAX_SETTABLE.to_celsius(),
            actual: temperature.to_celsius(),
        });
    }

    let mut payload = frame_head(RF_FLAG_ROOM, CMD_SET_TEMPERATURE);
    payload.extend_from_slice(&rf_address.octets());
    payload.push(room_id);
    payload.push(temperature.raw() | (mode.bits() << 6));
    Ok(wrap(&payload))
}
