// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Devices and rooms reported by the Cube.
//!
//! A [`Device`] is a common header (identity, room assignment, battery)
//! plus a per-kind payload. Kind checks are pattern matches, not dynamic
//! dispatch: [`Device::is_thermostat`], [`Device::is_wall_thermostat`] and
//! friends. All payload fields start unknown and are filled in as
//! Configuration and LiveStatus frames arrive.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::types::{Battery, Programme, RfAddress, Temperature, ThermostatMode, Weekday};

/// Device kind byte from the gateway's device table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    /// The gateway itself.
    Cube,
    /// Radiator valve thermostat.
    RadiatorThermostat,
    /// Radiator valve thermostat (plus variant).
    RadiatorThermostatPlus,
    /// Wall-mounted thermostat.
    WallThermostat,
    /// Window open/closed sensor.
    WindowShutter,
}

impl DeviceType {
    /// Decodes the device-kind byte of the Metadata table.
    ///
    /// Returns `None` for kinds this library does not model (e.g. the eco
    /// push button); the metadata decoder skips those entries.
    #[must_use]
    pub(crate) const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Cube),
            1 => Some(Self::RadiatorThermostat),
            2 => Some(Self::RadiatorThermostatPlus),
            3 => Some(Self::WallThermostat),
            4 => Some(Self::WindowShutter),
            _ => None,
        }
    }

    /// Returns `true` for radiator valve thermostats.
    #[must_use]
    pub const fn is_radiator(self) -> bool {
        matches!(self, Self::RadiatorThermostat | Self::RadiatorThermostatPlus)
    }

    /// Returns `true` for any device holding a target temperature.
    #[must_use]
    pub const fn is_heating(self) -> bool {
        matches!(
            self,
            Self::RadiatorThermostat | Self::RadiatorThermostatPlus | Self::WallThermostat
        )
    }
}

/// Scheduled anti-limescale valve exercise time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decalcification {
    /// Day of the exercise run.
    pub weekday: Weekday,
    /// Hour of the exercise run (0-23).
    pub hour: u8,
}

impl fmt::Display for Decalcification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:02}:00", self.weekday, self.hour)
    }
}

/// State shared by radiator and wall thermostats.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeatingState {
    /// Comfort preset temperature.
    pub(crate) comfort_temperature: Option<Temperature>,
    /// Eco preset temperature.
    pub(crate) eco_temperature: Option<Temperature>,
    /// Upper settable bound configured on the device.
    pub(crate) max_temperature: Option<Temperature>,
    /// Lower settable bound configured on the device.
    pub(crate) min_temperature: Option<Temperature>,
    /// Current target temperature.
    pub(crate) target_temperature: Option<Temperature>,
    /// Measured temperature; absent when the gateway has no live reading.
    pub(crate) actual_temperature: Option<f64>,
    /// Operating mode.
    pub(crate) mode: Option<ThermostatMode>,
    /// End of vacation mode; present only while `mode` is vacation.
    pub(crate) vacation_until: Option<NaiveDateTime>,
    /// Child lock engaged.
    pub(crate) locked: Option<bool>,
    /// Weekly programme.
    pub(crate) programme: Programme,
}

/// Full state of a radiator valve thermostat.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ThermostatState {
    #[serde(flatten)]
    pub(crate) heating: HeatingState,
    /// Measurement offset in degrees Celsius (-3.5 to +3.5).
    pub(crate) temperature_offset: Option<f64>,
    /// Target while a window is detected open.
    pub(crate) window_open_temperature: Option<Temperature>,
    /// How long a window must stay open before reacting, in minutes.
    pub(crate) window_open_duration: Option<u16>,
    /// Boost mode duration in minutes.
    pub(crate) boost_duration: Option<u16>,
    /// Valve position driven during boost, in percent.
    pub(crate) boost_valve_position: Option<u8>,
    /// Anti-limescale exercise schedule.
    pub(crate) decalcification: Option<Decalcification>,
    /// Maximum valve opening in percent.
    pub(crate) max_valve_setting: Option<f64>,
    /// Valve offset in percent.
    pub(crate) valve_offset: Option<f64>,
    /// Live valve position in percent.
    pub(crate) valve_position: Option<u8>,
}

/// Per-kind payload of a [`Device`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DeviceData {
    /// The gateway has no operational payload in the registry.
    Gateway {},
    /// Radiator valve thermostat payload.
    Thermostat(ThermostatState),
    /// Wall thermostat payload.
    WallThermostat(HeatingState),
    /// Window shutter payload.
    WindowShutter {
        /// Window currently open; unknown until the first LiveStatus.
        is_open: Option<bool>,
    },
}

/// One device paired with the gateway.
///
/// Created only by the Metadata decoder and never removed during a
/// session; every later frame updates an existing entry, keyed by
/// [`RfAddress`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Device {
    #[serde(rename = "type")]
    pub(crate) device_type: DeviceType,
    pub(crate) rf_address: RfAddress,
    /// Room assignment; unset until a Metadata frame provides it.
    pub(crate) room_id: Option<u8>,
    pub(crate) name: String,
    /// 10-character serial from the device table.
    pub(crate) serial: String,
    /// Firmware version as `major.minor`.
    pub(crate) firmware_version: Option<String>,
    pub(crate) initialized: bool,
    pub(crate) battery: Option<Battery>,
    #[serde(flatten)]
    pub(crate) data: DeviceData,
}

impl Device {
    /// Creates a fresh device entry with all state unknown.
    pub(crate) fn new(device_type: DeviceType, rf_address: RfAddress) -> Self {
        let data = match device_type {
            DeviceType::Cube => DeviceData::Gateway {},
            DeviceType::RadiatorThermostat | DeviceType::RadiatorThermostatPlus => {
                DeviceData::Thermostat(ThermostatState::default())
            }
            DeviceType::WallThermostat => DeviceData::WallThermostat(HeatingState::default()),
            DeviceType::WindowShutter => DeviceData::WindowShutter { is_open: None },
        };
        Self {
            device_type,
            rf_address,
            room_id: None,
            name: String::new(),
            serial: String::new(),
            firmware_version: None,
            initialized: false,
            battery: None,
            data,
        }
    }

    /// Returns the device kind.
    #[must_use]
    pub const fn device_type(&self) -> DeviceType {
        self.device_type
    }

    /// Returns the radio address.
    #[must_use]
    pub const fn rf_address(&self) -> RfAddress {
        self.rf_address
    }

    /// Returns the room this device is assigned to, if known yet.
    #[must_use]
    pub const fn room_id(&self) -> Option<u8> {
        self.room_id
    }

    /// Returns the device name from the gateway's device table.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the device serial.
    #[must_use]
    pub fn serial(&self) -> &str {
        &self.serial
    }

    /// Returns the firmware version as `major.minor`, if reported.
    #[must_use]
    pub fn firmware_version(&self) -> Option<&str> {
        self.firmware_version.as_deref()
    }

    /// Returns `true` once the device has completed its RF setup.
    #[must_use]
    pub const fn initialized(&self) -> bool {
        self.initialized
    }

    /// Returns the battery condition, if reported.
    #[must_use]
    pub const fn battery(&self) -> Option<Battery> {
        self.battery
    }

    /// Returns `true` for radiator valve thermostats.
    #[must_use]
    pub const fn is_thermostat(&self) -> bool {
        matches!(self.data, DeviceData::Thermostat(_))
    }

    /// Returns `true` for wall thermostats.
    #[must_use]
    pub const fn is_wall_thermostat(&self) -> bool {
        matches!(self.data, DeviceData::WallThermostat(_))
    }

    /// Returns `true` for window shutters.
    #[must_use]
    pub const fn is_window_shutter(&self) -> bool {
        matches!(self.data, DeviceData::WindowShutter { .. })
    }

    /// Returns `true` for any device holding a target temperature.
    #[must_use]
    pub const fn is_heating(&self) -> bool {
        matches!(
            self.data,
            DeviceData::Thermostat(_) | DeviceData::WallThermostat(_)
        )
    }

    /// Returns the shared thermostat state of a heating device.
    #[must_use]
    pub fn heating(&self) -> Option<&HeatingState> {
        match &self.data {
            DeviceData::Thermostat(state) => Some(&state.heating),
            DeviceData::WallThermostat(state) => Some(state),
            _ => None,
        }
    }

    pub(crate) fn heating_mut(&mut self) -> Option<&mut HeatingState> {
        match &mut self.data {
            DeviceData::Thermostat(state) => Some(&mut state.heating),
            DeviceData::WallThermostat(state) => Some(state),
            _ => None,
        }
    }

    /// Returns the radiator-specific state of a thermostat.
    #[must_use]
    pub fn thermostat(&self) -> Option<&ThermostatState> {
        match &self.data {
            DeviceData::Thermostat(state) => Some(state),
            _ => None,
        }
    }

    pub(crate) fn thermostat_mut(&mut self) -> Option<&mut ThermostatState> {
        match &mut self.data {
            DeviceData::Thermostat(state) => Some(state),
            _ => None,
        }
    }

    /// Returns the open/closed state of a window shutter.
    #[must_use]
    pub const fn is_open(&self) -> Option<bool> {
        match self.data {
            DeviceData::WindowShutter { is_open } => is_open,
            _ => None,
        }
    }

    /// Returns the weekly programme of a heating device.
    #[must_use]
    pub fn programme(&self) -> Option<&Programme> {
        self.heating().map(|h| &h.programme)
    }
}

impl HeatingState {
    /// Returns the comfort preset temperature.
    #[must_use]
    pub const fn comfort_temperature(&self) -> Option<Temperature> {
        self.comfort_temperature
    }

    /// Returns the eco preset temperature.
    #[must_use]
    pub const fn eco_temperature(&self) -> Option<Temperature> {
        self.eco_temperature
    }

    /// Returns the configured upper setpoint bound.
    #[must_use]
    pub const fn max_temperature(&self) -> Option<Temperature> {
        self.max_temperature
    }

    /// Returns the configured lower setpoint bound.
    #[must_use]
    pub const fn min_temperature(&self) -> Option<Temperature> {
        self.min_temperature
    }

    /// Returns the current target temperature.
    #[must_use]
    pub const fn target_temperature(&self) -> Option<Temperature> {
        self.target_temperature
    }

    /// Returns the measured temperature, absent without a live reading.
    #[must_use]
    pub const fn actual_temperature(&self) -> Option<f64> {
        self.actual_temperature
    }

    /// Returns the operating mode.
    #[must_use]
    pub const fn mode(&self) -> Option<ThermostatMode> {
        self.mode
    }

    /// Returns the end of vacation mode while it is active.
    #[must_use]
    pub const fn vacation_until(&self) -> Option<NaiveDateTime> {
        self.vacation_until
    }

    /// Returns the child-lock state.
    #[must_use]
    pub const fn locked(&self) -> Option<bool> {
        self.locked
    }

    /// Returns the weekly programme.
    #[must_use]
    pub const fn programme(&self) -> &Programme {
        &self.programme
    }
}

impl ThermostatState {
    /// Returns the measurement offset in degrees Celsius.
    #[must_use]
    pub const fn temperature_offset(&self) -> Option<f64> {
        self.temperature_offset
    }

    /// Returns the window-open target temperature.
    #[must_use]
    pub const fn window_open_temperature(&self) -> Option<Temperature> {
        self.window_open_temperature
    }

    /// Returns the window-open reaction delay in minutes.
    #[must_use]
    pub const fn window_open_duration(&self) -> Option<u16> {
        self.window_open_duration
    }

    /// Returns the boost duration in minutes.
    #[must_use]
    pub const fn boost_duration(&self) -> Option<u16> {
        self.boost_duration
    }

    /// Returns the boost valve position in percent.
    #[must_use]
    pub const fn boost_valve_position(&self) -> Option<u8> {
        self.boost_valve_position
    }

    /// Returns the anti-limescale exercise schedule.
    #[must_use]
    pub const fn decalcification(&self) -> Option<Decalcification> {
        self.decalcification
    }

    /// Returns the maximum valve opening in percent.
    #[must_use]
    pub const fn max_valve_setting(&self) -> Option<f64> {
        self.max_valve_setting
    }

    /// Returns the valve offset in percent.
    #[must_use]
    pub const fn valve_offset(&self) -> Option<f64> {
        self.valve_offset
    }

    /// Returns the live valve position in percent.
    #[must_use]
    pub const fn valve_position(&self) -> Option<u8> {
        self.valve_position
    }
}

/// One room from the gateway's room table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Room {
    pub(crate) id: u8,
    pub(crate) name: String,
    pub(crate) group_rf_address: RfAddress,
}

impl Room {
    pub(crate) fn new(id: u8, name: String, group_rf_address: RfAddress) -> Self {
        Self {
            id,
            name,
            group_rf_address,
        }
    }

    /// Returns the room id.
    #[must_use]
    pub const fn id(&self) -> u8 {
        self.id
    }

    /// Returns the room name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the broadcast address covering every device in this room.
    #[must_use]
    pub const fn group_rf_address(&self) -> RfAddress {
        self.group_rf_address
    }
}

/// Pseudo-device addressing all devices assigned to a room at once.
///
/// Resolved from a room's group address. It is a command target only and
/// is never entered into the device registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupDevice {
    pub(crate) rf_address: RfAddress,
    pub(crate) room_id: u8,
    pub(crate) name: String,
}

impl GroupDevice {
    /// Returns the room's broadcast address.
    #[must_use]
    pub const fn rf_address(&self) -> RfAddress {
        self.rf_address
    }

    /// Returns the room this pseudo-device addresses.
    #[must_use]
    pub const fn room_id(&self) -> u8 {
        self.room_id
    }

    /// Returns the room name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_type_from_byte() {
        assert_eq!(DeviceType::from_byte(0), Some(DeviceType::Cube));
        assert_eq!(DeviceType::from_byte(1), Some(DeviceType::RadiatorThermostat));
        assert_eq!(DeviceType::from_byte(3), Some(DeviceType::WallThermostat));
        assert_eq!(DeviceType::from_byte(4), Some(DeviceType::WindowShutter));
        assert_eq!(DeviceType::from_byte(5), None);
    }

    #[test]
    fn kind_queries_follow_payload() {
        let addr = RfAddress::new([1, 2, 3]);
        let radiator = Device::new(DeviceType::RadiatorThermostat, addr);
        assert!(radiator.is_thermostat());
        assert!(radiator.is_heating());
        assert!(!radiator.is_wall_thermostat());

        let wall = Device::new(DeviceType::WallThermostat, addr);
        assert!(wall.is_wall_thermostat());
        assert!(wall.is_heating());
        assert!(wall.thermostat().is_none());

        let shutter = Device::new(DeviceType::WindowShutter, addr);
        assert!(shutter.is_window_shutter());
        assert!(!shutter.is_heating());
        assert!(shutter.heating().is_none());
    }

    #[test]
    fn new_device_state_is_unknown() {
        let device = Device::new(
            DeviceType::RadiatorThermostat,
            RfAddress::new([1, 2, 3]),
        );
        let heating = device.heating().unwrap();
        assert!(heating.target_temperature().is_none());
        assert!(heating.actual_temperature().is_none());
        assert!(device.battery().is_none());
        assert!(!device.initialized());
    }

    #[test]
    fn decalcification_display() {
        let decalc = Decalcification {
            weekday: Weekday::Friday,
            hour: 5,
        };
        assert_eq!(decalc.to_string(), "friday 05:00");
    }

    #[test]
    fn export_shape_is_flat() {
        let mut device = Device::new(
            DeviceType::RadiatorThermostat,
            RfAddress::new([0x01, 0x02, 0x03]),
        );
        device.name = "Valve".to_string();
        let json = serde_json::to_value(&device).unwrap();
        assert_eq!(json["type"], "radiator_thermostat");
        assert_eq!(json["rf_address"], "010203");
        // Payload fields are flattened next to the header.
        assert!(json.get("comfort_temperature").is_some());
        assert!(json.get("valve_position").is_some());
    }
}
