// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `C:` configuration decoder.
//!
//! One frame per device, carrying its static settings and, for heating
//! devices, the stored weekly programme. Which sections are present
//! depends on the device-kind byte the payload itself carries.

use super::decode_base64;
use crate::device::Decalcification;
use crate::error::DecodeError;
use crate::types::{Programme, RfAddress, Setpoint, Temperature, Weekday};

/// Offset of the weekly programme block in a configuration payload.
const PROGRAMME_OFFSET: usize = 29;
/// Bytes per day in the programme block.
const PROGRAMME_DAY_LEN: usize = 26;
/// Length of the programme block: 7 days, with the final byte cut off by
/// the gateway's own framing.
const PROGRAMME_LEN: usize = 181;

/// Settings shared by radiator and wall thermostats.
#[derive(Debug, Clone)]
pub struct HeatingConfig {
    /// Comfort preset temperature.
    pub comfort_temperature: Temperature,
    /// Eco preset temperature.
    pub eco_temperature: Temperature,
    /// Upper settable bound.
    pub max_temperature: Temperature,
    /// Lower settable bound.
    pub min_temperature: Temperature,
    /// Stored weekly programme; empty when the payload carries none.
    pub programme: Programme,
}

/// Settings specific to radiator valve thermostats.
#[derive(Debug, Clone)]
pub struct RadiatorConfig {
    /// Measurement offset in degrees Celsius.
    pub temperature_offset: f64,
    /// Target while a window is detected open.
    pub window_open_temperature: Temperature,
    /// Window-open reaction delay in minutes.
    pub window_open_duration: u16,
    /// Boost duration in minutes.
    pub boost_duration: u16,
    /// Boost valve position in percent.
    pub boost_valve_position: u8,
    /// Anti-limescale exercise schedule.
    pub decalcification: Decalcification,
    /// Maximum valve opening in percent.
    pub max_valve_setting: f64,
    /// Valve offset in percent.
    pub valve_offset: f64,
}

/// Decoded per-device configuration.
#[derive(Debug, Clone)]
pub struct Configuration {
    /// Address of the configured device, from the frame header.
    pub rf_address: RfAddress,
    /// Raw device-kind byte from the payload.
    pub device_type: u8,
    /// Room the device is assigned to.
    pub room_id: u8,
    /// Device firmware as `major.minor`.
    pub firmware_version: String,
    /// 10-character serial.
    pub serial: String,
    /// Present for radiator and wall thermostats.
    pub heating: Option<HeatingConfig>,
    /// Present for radiator thermostats only.
    pub radiator: Option<RadiatorConfig>,
}

pub(crate) fn decode(frame: &str) -> Result<Configuration, DecodeError> {
    let mut tokens = frame[2..].split(',');
    let rf_token = tokens.next().ok_or(DecodeError::MissingField("rf address"))?;
    let rf_address: RfAddress = rf_token
        .parse()
        .map_err(|_| DecodeError::InvalidNumber {
            field: "rf address",
            value: rf_token.to_string(),
        })?;
    let payload = tokens
        .next()
        .ok_or(DecodeError::MissingField("configuration payload"))?;
    let data = decode_base64(payload)?;

    let device_type = *data.get(4).ok_or(DecodeError::Truncated("device type"))?;
    let room_id = *data.get(5).ok_or(DecodeError::Truncated("room id"))?;
    let firmware = *data.get(6).ok_or(DecodeError::Truncated("firmware"))?;
    let firmware_version = format!("{:02}.{:02}", firmware >> 4, firmware & 0x0F);
    let serial_bytes = data
        .get(8..18)
        .ok_or(DecodeError::Truncated("serial"))?;
    let serial = super::decode_name(serial_bytes);

    // Kind bytes 1/2 are radiator thermostats, 3 is a wall thermostat.
    let is_radiator = matches!(device_type, 1 | 2);
    let is_heating = is_radiator || device_type == 3;

    let heating = if is_heating {
        let settings = data
            .get(18..22)
            .ok_or(DecodeError::Truncated("temperature presets"))?;
        Some(HeatingConfig {
            comfort_temperature: Temperature::from_raw(settings[0]),
            eco_temperature: Temperature::from_raw(settings[1]),
            max_temperature: Temperature::from_raw(settings[2]),
            min_temperature: Temperature::from_raw(settings[3]),
            programme: decode_programme(&data),
        })
    } else {
        None
    };

    let radiator = if is_radiator {
        let settings = data
            .get(22..29)
            .ok_or(DecodeError::Truncated("valve settings"))?;
        let boost = settings[3];
        let boost_bits = (boost & 0xE0) >> 5;
        let boost_duration = if boost_bits == 7 {
            60
        } else {
            u16::from(boost_bits) * 5
        };
        let decalc = settings[4];
        Some(RadiatorConfig {
            temperature_offset: f64::from(settings[0]) / 2.0 - 3.5,
            window_open_temperature: Temperature::from_raw(settings[1]),
            window_open_duration: u16::from(settings[2]) * 5,
            boost_duration,
            boost_valve_position: (boost & 0x1F) * 5,
            decalcification: Decalcification {
                weekday: Weekday::from_gateway_index((decalc & 0xE0) >> 5),
                hour: decalc & 0x1F,
            },
            max_valve_setting: valve_percent(settings[5]),
            valve_offset: valve_percent(settings[6]),
        })
    } else {
        None
    };

    Ok(Configuration {
        rf_address,
        device_type,
        room_id,
        firmware_version,
        serial,
        heating,
        radiator,
    })
}

/// Percent scaling of the valve bytes, kept as the gateway documents it:
/// byte * 100 / 255 (the byte needs no masking, it already is one).
fn valve_percent(byte: u8) -> f64 {
    f64::from(byte) * 100.0 / 255.0
}

/// Decodes the weekly programme block.
///
/// Wall-thermostat payloads are shorter than the full block; whatever
/// days fit are decoded and the rest stay unknown. Within a day the
/// `24:00` sentinel ends the usable setpoints.
fn decode_programme(data: &[u8]) -> Programme {
    let mut programme = Programme::new();
    let Some(block) = data.get(PROGRAMME_OFFSET..) else {
        return programme;
    };
    let block = &block[..block.len().min(PROGRAMME_LEN)];

    for (index, day) in block.chunks(PROGRAMME_DAY_LEN).enumerate().take(7) {
        let weekday = Weekday::from_gateway_index(u8::try_from(index).unwrap_or(0));
        let mut setpoints = Vec::new();
        for pair in day.chunks_exact(2) {
            let setpoint = Setpoint::from_wire([pair[0], pair[1]]);
            let done = setpoint.until.is_end_of_day();
            setpoints.push(setpoint);
            if done {
                break;
            }
        }
        programme.set_day(weekday, setpoints);
    }
    programme
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;

    /// Builds a radiator-thermostat configuration payload.
    fn radiator_payload() -> Vec<u8> {
        let mut data = vec![0u8; 29];
        data[0] = 0xD2; // length byte, unused by the decoder
        data[1..4].copy_from_slice(&[0x01, 0x02, 0x03]);
        data[4] = 1; // radiator thermostat
        data[5] = 1; // room 1
        data[6] = 0x13; // firmware 01.03
        data[8..18].copy_from_slice(b"KEQ0123456");
        data[18] = 42; // comfort 21.0
        data[19] = 34; // eco 17.0
        data[20] = 61; // max 30.5
        data[21] = 9; // min 4.5
        data[22] = 7; // offset 0.0
        data[23] = 24; // window open 12.0
        data[24] = 3; // window duration 15
        data[25] = 0b1111_0100; // boost: sentinel 7 -> 60 min, valve 20 -> 100%? (0x14 * 5)
        data[26] = 0b1100_0101; // decalcification: weekday 6, hour 5
        data[27] = 255; // max valve 100%
        data[28] = 0; // valve offset 0%
        // One day programme: 17.0 until 24:00, then filler.
        let mut day = [0u8; 26];
        day[0] = 0x45;
        day[1] = 0x20;
        for _ in 0..7 {
            data.extend_from_slice(&day);
        }
        data.truncate(29 + PROGRAMME_LEN);
        data
    }

    fn frame_for(payload: &[u8]) -> String {
        format!("C:010203,{}", STANDARD.encode(payload))
    }

    #[test]
    fn decodes_identity_and_presets() {
        let config = decode(&frame_for(&radiator_payload())).unwrap();
        assert_eq!(config.rf_address.to_string(), "010203");
        assert_eq!(config.room_id, 1);
        assert_eq!(config.firmware_version, "01.03");
        assert_eq!(config.serial, "KEQ0123456");

        let heating = config.heating.unwrap();
        assert_eq!(heating.comfort_temperature.to_celsius(), 21.0);
        assert_eq!(heating.eco_temperature.to_celsius(), 17.0);
        assert_eq!(heating.max_temperature.to_celsius(), 30.5);
        assert_eq!(heating.min_temperature.to_celsius(), 4.5);
    }

    #[test]
    fn decodes_radiator_settings() {
        let config = decode(&frame_for(&radiator_payload())).unwrap();
        let radiator = config.radiator.unwrap();
        assert_eq!(radiator.temperature_offset, 0.0);
        assert_eq!(radiator.window_open_temperature.to_celsius(), 12.0);
        assert_eq!(radiator.window_open_duration, 15);
        assert_eq!(radiator.boost_valve_position, 100);
        assert_eq!(radiator.max_valve_setting, 100.0);
        assert_eq!(radiator.valve_offset, 0.0);
    }

    #[test]
    fn boost_sentinel_means_an_hour() {
        let mut payload = radiator_payload();
        payload[25] = 7 << 5;
        let config = decode(&frame_for(&payload)).unwrap();
        assert_eq!(config.radiator.unwrap().boost_duration, 60);

        payload[25] = 3 << 5;
        let config = decode(&frame_for(&payload)).unwrap();
        assert_eq!(config.radiator.unwrap().boost_duration, 15);
    }

    #[test]
    fn decalcification_weekday_is_saturday_first() {
        let config = decode(&frame_for(&radiator_payload())).unwrap();
        let decalc = config.radiator.unwrap().decalcification;
        assert_eq!(decalc.weekday, Weekday::Friday);
        assert_eq!(decalc.hour, 5);
    }

    #[test]
    fn programme_stops_at_end_of_day_sentinel() {
        let config = decode(&frame_for(&radiator_payload())).unwrap();
        let programme = config.heating.unwrap().programme;
        for weekday in Weekday::ALL {
            let day = programme.day(weekday);
            assert_eq!(day.len(), 1, "{weekday}");
            assert_eq!(day[0].temp.to_celsius(), 17.0);
            assert!(day[0].until.is_end_of_day());
        }
    }

    #[test]
    fn wall_thermostat_payload_has_no_radiator_section() {
        let mut payload = radiator_payload();
        payload[4] = 3; // wall thermostat
        payload.truncate(22);
        let config = decode(&frame_for(&payload)).unwrap();
        assert!(config.heating.is_some());
        assert!(config.radiator.is_none());
        assert!(config.heating.unwrap().programme.is_empty());
    }

    #[test]
    fn truncated_presets_abandon_the_frame() {
        let mut payload = radiator_payload();
        payload.truncate(20);
        assert!(decode(&frame_for(&payload)).is_err());
    }
}
