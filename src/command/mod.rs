// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Outbound write frames.
//!
//! Both write operations share one frame structure: a preamble byte, an
//! rf-flag byte (room or device addressing), the sub-command code, a null
//! target address, then one block per affected device. The result is
//! base64-wrapped as `s:<base64>\r\n`.
//!
//! All inputs are validated before a frame is built; an invalid
//! temperature or time never reaches the wire as a garbled frame.

mod programme;
mod temperature_mode;

pub(crate) use programme::{DayBlock, build_programme, pad_setpoints};
pub(crate) use temperature_mode::build_temperature_mode;

use crate::types::RfAddress;

/// Sub-command code for a temperature/mode write.
const CMD_SET_TEMPERATURE: u8 = 0x40;
/// Sub-command code for a weekly-programme write.
const CMD_SET_PROGRAMME: u8 = 0x10;

/// Rf-flag byte addressing a room's device group.
pub(crate) const RF_FLAG_ROOM: u8 = 0x04;
/// Rf-flag byte addressing a single device.
pub(crate) const RF_FLAG_DEVICE: u8 = 0x00;

/// What a write operation is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandTarget {
    /// A single device by radio address.
    Device(RfAddress),
    /// Every device in a room, reached through the room's group address.
    Room(u8),
}

/// The shared frame head: preamble, rf flag, command code, null address.
fn frame_head(rf_flag: u8, command: u8) -> Vec<u8> {
    let mut head = vec![0x00, rf_flag, command];
    head.extend_from_slice(&RfAddress::NULL.octets());
    head
}

/// Wraps a binary payload into an outbound `s:` frame.
fn wrap(payload: &[u8]) -> String {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;

    format!("s:{}\r\n", STANDARD.encode(payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_head_layout() {
        assert_eq!(
            frame_head(RF_FLAG_ROOM, CMD_SET_TEMPERATURE),
            vec![0x00, 0x04, 0x40, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn wrap_terminates_with_crlf() {
        let frame = wrap(&[0x00, 0x04, 0x40]);
        assert!(frame.starts_with("s:"));
        assert!(frame.ends_with("\r\n"));
    }
}
