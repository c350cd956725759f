// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Weekly-programme write frames.

use super::{CMD_SET_PROGRAMME, frame_head, wrap};
use crate::error::ValueError;
use crate::types::{
    MAX_SETPOINTS_PER_DAY, RfAddress, SETPOINTS_PER_WRITE, Setpoint, Temperature, Weekday,
};

/// One per-device block of a programme write: which device, which day,
/// and the padded setpoint sequence to store.
#[derive(Debug, Clone)]
pub(crate) struct DayBlock {
    pub rf_address: RfAddress,
    pub room_id: u8,
    pub weekday: Weekday,
    pub setpoints: Vec<Setpoint>,
}

/// Validates a day's setpoints and pads them for the wire.
///
/// Short programmes are right-padded with `{0, 00:00}` up to the seven
/// setpoints a write frame carries; longer ones (the gateway stores up
/// to thirteen) are sent as-is.
///
/// # Errors
///
/// Returns [`ValueError::TooManySetpoints`] past thirteen entries and
/// [`ValueError::TemperatureTooHigh`] for any setpoint above the
/// 32-degree write limit. Times are grid-valid by construction of
/// [`crate::types::TimeOfDay`].
pub(crate) fn pad_setpoints(setpoints: &[Setpoint]) -> Result<Vec<Setpoint>, ValueError> {
    if setpoints.len() > MAX_SETPOINTS_PER_DAY {
        return Err(ValueError::TooManySetpoints {
            max: MAX_SETPOINTS_PER_DAY,
            actual: setpoints.len(),
        });
    }
    for setpoint in setpoints {
        if !setpoint.temp.is_settable() {
            return Err(ValueError::TemperatureTooHigh {
                max: Temperature::MAX_SETTABLE.to_celsius(),
                actual: setpoint.temp.to_celsius(),
            });
        }
    }

    let mut padded = setpoints.to_vec();
    while padded.len() < SETPOINTS_PER_WRITE {
        padded.push(Setpoint::PADDING);
    }
    Ok(padded)
}

/// Builds a programme write frame from already-diffed device blocks.
pub(crate) fn build_programme(rf_flag: u8, blocks: &[DayBlock]) -> String {
    let mut payload = frame_head(rf_flag, CMD_SET_PROGRAMME);
    for block in blocks {
        payload.extend_from_slice(&block.rf_address.octets());
        payload.push(block.room_id);
        payload.push(block.weekday.gateway_index());
        for setpoint in &block.setpoints {
            payload.extend_from_slice(&setpoint.to_wire());
        }
    }
    wrap(&payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::RF_FLAG_DEVICE;
    use crate::types::TimeOfDay;
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;

    fn sp(celsius: f64, until: &str) -> Setpoint {
        Setpoint::new(
            Temperature::from_celsius(celsius).unwrap(),
            until.parse().unwrap(),
        )
    }

    #[test]
    fn pads_short_days_to_seven() {
        let padded = pad_setpoints(&[sp(21.0, "06:30"), sp(17.0, "24:00")]).unwrap();
        assert_eq!(padded.len(), 7);
        assert_eq!(padded[0], sp(21.0, "06:30"));
        assert_eq!(padded[1], sp(17.0, "24:00"));
        for filler in &padded[2..] {
            assert_eq!(filler.temp, Temperature::from_raw(0));
            assert_eq!(filler.until, TimeOfDay::MIDNIGHT);
        }
    }

    #[test]
    fn long_days_are_kept_whole() {
        let setpoints: Vec<_> = (0..10).map(|_| sp(17.0, "24:00")).collect();
        assert_eq!(pad_setpoints(&setpoints).unwrap().len(), 10);
    }

    #[test]
    fn rejects_more_than_thirteen_setpoints() {
        let setpoints: Vec<_> = (0..14).map(|_| sp(17.0, "24:00")).collect();
        assert!(matches!(
            pad_setpoints(&setpoints),
            Err(ValueError::TooManySetpoints { max: 13, actual: 14 })
        ));
    }

    #[test]
    fn rejects_unsettable_temperatures() {
        assert!(matches!(
            pad_setpoints(&[sp(32.5, "24:00")]),
            Err(ValueError::TemperatureTooHigh { .. })
        ));
    }

    #[test]
    fn padded_day_round_trips_through_the_wire() {
        let original = vec![sp(21.0, "06:30"), sp(17.0, "24:00")];
        let padded = pad_setpoints(&original).unwrap();

        // Decoding stops at the 24:00 sentinel, recovering the original.
        let mut recovered = Vec::new();
        for setpoint in &padded {
            let decoded = Setpoint::from_wire(setpoint.to_wire());
            let done = decoded.until.is_end_of_day();
            recovered.push(decoded);
            if done {
                break;
            }
        }
        assert_eq!(recovered, original);
    }

    #[test]
    fn frame_layout_one_block() {
        let blocks = [DayBlock {
            rf_address: RfAddress::new([0x0F, 0xDA, 0xED]),
            room_id: 2,
            weekday: Weekday::Monday,
            setpoints: pad_setpoints(&[sp(17.0, "24:00")]).unwrap(),
        }];
        let frame = build_programme(RF_FLAG_DEVICE, &blocks);
        let payload = STANDARD
            .decode(frame.strip_prefix("s:").unwrap().trim_end())
            .unwrap();
        assert_eq!(&payload[..6], &[0x00, 0x00, 0x10, 0x00, 0x00, 0x00]);
        assert_eq!(&payload[6..9], &[0x0F, 0xDA, 0xED]);
        assert_eq!(payload[9], 2);
        assert_eq!(payload[10], Weekday::Monday.gateway_index());
        assert_eq!(&payload[11..13], &[0x45, 0x20]);
        assert_eq!(payload.len(), 11 + 14);
    }
}
