// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `M:` metadata decoder.
//!
//! The metadata frame carries the gateway's paired-device tables: first
//! the rooms, then the devices. It is the only frame that creates
//! entities; everything else updates entities it announced.

use super::{Reader, decode_base64, decode_name};
use crate::error::DecodeError;
use crate::types::RfAddress;

/// One row of the room table.
#[derive(Debug, Clone)]
pub struct RoomEntry {
    /// Room id.
    pub id: u8,
    /// Room name.
    pub name: String,
    /// Broadcast address covering every device in the room.
    pub group_rf_address: RfAddress,
}

/// One row of the device table.
#[derive(Debug, Clone)]
pub struct DeviceEntry {
    /// Raw device-kind byte; unknown kinds are skipped on apply.
    pub device_type: u8,
    /// Radio address, the device's stable key.
    pub rf_address: RfAddress,
    /// 10-character serial.
    pub serial: String,
    /// Device name.
    pub name: String,
    /// Id of the room the device is assigned to.
    pub room_id: u8,
}

/// Decoded room and device tables.
#[derive(Debug, Clone)]
pub struct Metadata {
    /// All rooms known to the gateway.
    pub rooms: Vec<RoomEntry>,
    /// All devices known to the gateway.
    pub devices: Vec<DeviceEntry>,
}

pub(crate) fn decode(frame: &str) -> Result<Metadata, DecodeError> {
    // "M:<index>,<count>,<base64>" - the two leading fields are ignored.
    let payload = frame[2..]
        .split(',')
        .nth(2)
        .ok_or(DecodeError::MissingField("metadata payload"))?;
    let data = decode_base64(payload)?;
    let mut reader = Reader::new(&data);

    reader.skip(2);
    let room_count = reader.u8("room count")?;
    let mut rooms = Vec::with_capacity(usize::from(room_count));
    for _ in 0..room_count {
        let id = reader.u8("room id")?;
        let name_len = reader.u8("room name length")?;
        let name = decode_name(reader.bytes(usize::from(name_len), "room name")?);
        let group_rf_address = RfAddress::from_bytes(reader.bytes(3, "group rf address")?)
            .ok_or(DecodeError::Truncated("group rf address"))?;
        rooms.push(RoomEntry {
            id,
            name,
            group_rf_address,
        });
    }

    let device_count = reader.u8("device count")?;
    let mut devices = Vec::with_capacity(usize::from(device_count));
    for _ in 0..device_count {
        let device_type = reader.u8("device type")?;
        let rf_address = RfAddress::from_bytes(reader.bytes(3, "device rf address")?)
            .ok_or(DecodeError::Truncated("device rf address"))?;
        let serial = decode_name(reader.bytes(10, "device serial")?);
        let name_len = reader.u8("device name length")?;
        let name = decode_name(reader.bytes(usize::from(name_len), "device name")?);
        let room_id = reader.u8("device room id")?;
        devices.push(DeviceEntry {
            device_type,
            rf_address,
            serial,
            name,
            room_id,
        });
    }

    Ok(Metadata { rooms, devices })
}
