// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory model of rooms and devices, with per-room change tracking.
//!
//! Entities are created only while applying a Metadata frame and never
//! deleted during a session. Configuration and LiveStatus frames update
//! entities that already exist; submessages for unknown addresses are
//! skipped, never fabricated into new entries.
//!
//! Every observable field goes through [`ChangeTracker::set`]: compare,
//! write on change, and mark the owning room dirty. Identity fields
//! (name, serial, firmware, room assignment) are plain writes and do not
//! dirty a room.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::device::{Device, DeviceType, GroupDevice, Room};
use crate::message::{
    Configuration, DeviceUpdate, LiveStatus, Metadata, decode_submessage,
};
use crate::types::{RfAddress, Setpoint, Temperature, ThermostatMode, Weekday};

/// Per-room dirty flags with read-and-clear semantics.
///
/// A flag is raised whenever an observable field of a device in that room
/// actually changes value, and stays raised until [`ChangeTracker::take`]
/// reads it. Changes on devices whose room is still unknown are recorded
/// without attribution and signaled as a diagnostic.
#[derive(Debug, Default)]
pub(crate) struct ChangeTracker {
    dirty: BTreeSet<u8>,
}

impl ChangeTracker {
    /// Writes `value` into `slot` if it differs, marking the room dirty.
    ///
    /// Returns `true` if the slot changed.
    pub(crate) fn set<T: PartialEq>(
        &mut self,
        room_id: Option<u8>,
        slot: &mut T,
        value: T,
    ) -> bool {
        if *slot == value {
            return false;
        }
        *slot = value;
        match room_id {
            Some(id) => {
                self.dirty.insert(id);
            }
            None => {
                tracing::debug!("device changed before its room was known; change unattributed");
            }
        }
        true
    }

    /// Reads and clears one room's dirty flag.
    pub(crate) fn take(&mut self, room_id: u8) -> bool {
        self.dirty.remove(&room_id)
    }
}

/// Registry of all rooms and devices the gateway has announced.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    rooms: BTreeMap<u8, Room>,
    devices: BTreeMap<RfAddress, Device>,
    tracker: ChangeTracker,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub(crate) fn device(&self, rf_address: RfAddress) -> Option<&Device> {
        self.devices.get(&rf_address)
    }

    pub(crate) fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    pub(crate) fn room(&self, room_id: u8) -> Option<&Room> {
        self.rooms.get(&room_id)
    }

    pub(crate) fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    pub(crate) fn devices_in_room(&self, room_id: u8) -> impl Iterator<Item = &Device> {
        self.devices
            .values()
            .filter(move |device| device.room_id == Some(room_id))
    }

    /// Synthesizes the pseudo-device behind a room's group address.
    ///
    /// The result is a command target only; it is never stored in the
    /// device table.
    pub(crate) fn group_device(&self, room_id: u8) -> Option<GroupDevice> {
        self.rooms.get(&room_id).map(|room| GroupDevice {
            rf_address: room.group_rf_address,
            room_id: room.id,
            name: room.name.clone(),
        })
    }

    /// Reads and clears one room's dirty flag.
    pub(crate) fn take_changed(&mut self, room_id: u8) -> bool {
        self.tracker.take(room_id)
    }

    // =========================================================================
    // Frame application
    // =========================================================================

    /// Applies the room and device tables.
    ///
    /// First sightings create entities; re-sightings update identity
    /// fields in place. Entries with unknown device-kind bytes are
    /// skipped.
    pub(crate) fn apply_metadata(&mut self, metadata: Metadata) {
        for entry in metadata.rooms {
            let room = self
                .rooms
                .entry(entry.id)
                .or_insert_with(|| Room::new(entry.id, String::new(), entry.group_rf_address));
            room.name = entry.name;
            room.group_rf_address = entry.group_rf_address;
        }

        for entry in metadata.devices {
            let Some(device_type) = DeviceType::from_byte(entry.device_type) else {
                tracing::warn!(
                    rf_address = %entry.rf_address,
                    device_type = entry.device_type,
                    "skipping device of unsupported kind"
                );
                continue;
            };
            let device = self
                .devices
                .entry(entry.rf_address)
                .or_insert_with(|| Device::new(device_type, entry.rf_address));
            device.name = entry.name;
            device.serial = entry.serial;
            device.room_id = Some(entry.room_id);
        }
    }

    /// Applies one device's configuration.
    ///
    /// Unknown addresses are ignored; the device table is only ever
    /// extended by metadata.
    pub(crate) fn apply_configuration(&mut self, config: Configuration) {
        let Some(device) = self.devices.get_mut(&config.rf_address) else {
            tracing::debug!(rf_address = %config.rf_address, "configuration for unknown device");
            return;
        };

        device.room_id = Some(config.room_id);
        device.firmware_version = Some(config.firmware_version);
        device.serial = config.serial;
        let room_id = device.room_id;

        if let Some(cfg) = config.heating
            && let Some(heating) = device.heating_mut()
        {
            let tracker = &mut self.tracker;
            tracker.set(room_id, &mut heating.comfort_temperature, Some(cfg.comfort_temperature));
            tracker.set(room_id, &mut heating.eco_temperature, Some(cfg.eco_temperature));
            tracker.set(room_id, &mut heating.max_temperature, Some(cfg.max_temperature));
            tracker.set(room_id, &mut heating.min_temperature, Some(cfg.min_temperature));
            tracker.set(room_id, &mut heating.programme, cfg.programme);
        }

        if let Some(cfg) = config.radiator
            && let Some(thermostat) = device.thermostat_mut()
        {
            let tracker = &mut self.tracker;
            tracker.set(room_id, &mut thermostat.temperature_offset, Some(cfg.temperature_offset));
            tracker.set(
                room_id,
                &mut thermostat.window_open_temperature,
                Some(cfg.window_open_temperature),
            );
            tracker.set(
                room_id,
                &mut thermostat.window_open_duration,
                Some(cfg.window_open_duration),
            );
            tracker.set(room_id, &mut thermostat.boost_duration, Some(cfg.boost_duration));
            tracker.set(
                room_id,
                &mut thermostat.boost_valve_position,
                Some(cfg.boost_valve_position),
            );
            tracker.set(room_id, &mut thermostat.decalcification, Some(cfg.decalcification));
            tracker.set(room_id, &mut thermostat.max_valve_setting, Some(cfg.max_valve_setting));
            tracker.set(room_id, &mut thermostat.valve_offset, Some(cfg.valve_offset));
        }
    }

    /// Applies a live status frame.
    ///
    /// Submessages for unknown addresses are skipped without breaking the
    /// frame's cursor (the decoder already advanced past them), and a
    /// submessage too short for its device kind abandons only itself.
    pub(crate) fn apply_live_status(&mut self, status: &LiveStatus) {
        for sub in &status.submessages {
            let Some(device) = self.devices.get_mut(&sub.rf_address) else {
                tracing::debug!(rf_address = %sub.rf_address, "live status for unknown device");
                continue;
            };
            let update = match decode_submessage(device.device_type, sub) {
                Ok(update) => update,
                Err(error) => {
                    tracing::warn!(rf_address = %sub.rf_address, %error, "dropping submessage");
                    continue;
                }
            };

            let room_id = device.room_id;
            let tracker = &mut self.tracker;
            match update {
                DeviceUpdate::Thermostat {
                    flags,
                    target_temperature,
                    locked,
                    mode,
                    vacation_until,
                    valve_position,
                    actual_temperature,
                } => {
                    tracker.set(room_id, &mut device.initialized, flags.initialized);
                    tracker.set(room_id, &mut device.battery, Some(flags.battery));
                    if let Some(thermostat) = device.thermostat_mut() {
                        tracker.set(room_id, &mut thermostat.valve_position, Some(valve_position));
                        let heating = &mut thermostat.heating;
                        tracker.set(room_id, &mut heating.actual_temperature, actual_temperature);
                        tracker.set(room_id, &mut heating.target_temperature, Some(target_temperature));
                        tracker.set(room_id, &mut heating.locked, Some(locked));
                        tracker.set(room_id, &mut heating.mode, Some(mode));
                        tracker.set(room_id, &mut heating.vacation_until, vacation_until);
                    }
                }
                DeviceUpdate::WallThermostat {
                    flags,
                    target_temperature,
                    locked,
                    mode,
                    vacation_until,
                    actual_temperature,
                } => {
                    tracker.set(room_id, &mut device.initialized, flags.initialized);
                    tracker.set(room_id, &mut device.battery, Some(flags.battery));
                    if let Some(heating) = device.heating_mut() {
                        tracker.set(room_id, &mut heating.target_temperature, Some(target_temperature));
                        tracker.set(room_id, &mut heating.locked, Some(locked));
                        tracker.set(room_id, &mut heating.mode, Some(mode));
                        tracker.set(room_id, &mut heating.vacation_until, vacation_until);
                        tracker.set(room_id, &mut heating.actual_temperature, actual_temperature);
                    }
                }
                DeviceUpdate::WindowShutter { flags, is_open } => {
                    tracker.set(room_id, &mut device.initialized, flags.initialized);
                    tracker.set(room_id, &mut device.battery, Some(flags.battery));
                    if let crate::device::DeviceData::WindowShutter { is_open: slot } =
                        &mut device.data
                    {
                        tracker.set(room_id, slot, Some(is_open));
                    }
                }
                DeviceUpdate::Plain { flags } => {
                    tracker.set(room_id, &mut device.initialized, flags.initialized);
                    tracker.set(room_id, &mut device.battery, Some(flags.battery));
                }
            }
        }
    }

    // =========================================================================
    // Post-success command updates
    // =========================================================================

    /// Records an acknowledged temperature/mode write.
    pub(crate) fn record_temperature_mode(
        &mut self,
        rf_address: RfAddress,
        temperature: Temperature,
        mode: ThermostatMode,
    ) {
        let Some(device) = self.devices.get_mut(&rf_address) else {
            return;
        };
        let room_id = device.room_id;
        if let Some(heating) = device.heating_mut() {
            self.tracker
                .set(room_id, &mut heating.target_temperature, Some(temperature));
            self.tracker.set(room_id, &mut heating.mode, Some(mode));
        }
    }

    /// Records an acknowledged programme write for one day.
    pub(crate) fn record_programme_day(
        &mut self,
        rf_address: RfAddress,
        weekday: Weekday,
        setpoints: &[Setpoint],
    ) {
        let Some(device) = self.devices.get_mut(&rf_address) else {
            return;
        };
        let room_id = device.room_id;
        if let Some(heating) = device.heating_mut() {
            let mut programme = heating.programme.clone();
            programme.set_day(weekday, setpoints.to_vec());
            self.tracker.set(room_id, &mut heating.programme, programme);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{DeviceEntry, RoomEntry};

    fn addr(a: u8, b: u8, c: u8) -> RfAddress {
        RfAddress::new([a, b, c])
    }

    fn seeded_registry() -> Registry {
        let mut registry = Registry::new();
        registry.apply_metadata(Metadata {
            rooms: vec![RoomEntry {
                id: 1,
                name: "Living Room".to_string(),
                group_rf_address: addr(0xAB, 0xCD, 0xEF),
            }],
            devices: vec![DeviceEntry {
                device_type: 1,
                rf_address: addr(1, 2, 3),
                serial: "KEQ0123456".to_string(),
                name: "Radiator".to_string(),
                room_id: 1,
            }],
        });
        registry
    }

    #[test]
    fn metadata_creates_entities_once() {
        let mut registry = seeded_registry();
        assert!(registry.room(1).is_some());
        assert!(registry.device(addr(1, 2, 3)).is_some());

        // Re-applying the same table updates in place, never duplicates.
        registry.apply_metadata(Metadata {
            rooms: vec![RoomEntry {
                id: 1,
                name: "Lounge".to_string(),
                group_rf_address: addr(0xAB, 0xCD, 0xEF),
            }],
            devices: vec![],
        });
        assert_eq!(registry.rooms().count(), 1);
        assert_eq!(registry.room(1).unwrap().name(), "Lounge");
    }

    #[test]
    fn metadata_skips_unknown_device_kinds() {
        let mut registry = Registry::new();
        registry.apply_metadata(Metadata {
            rooms: vec![],
            devices: vec![DeviceEntry {
                device_type: 5, // eco button, unmodeled
                rf_address: addr(9, 9, 9),
                serial: "KEQ0999999".to_string(),
                name: "Button".to_string(),
                room_id: 1,
            }],
        });
        assert_eq!(registry.devices().count(), 0);
    }

    #[test]
    fn identity_updates_do_not_dirty_the_room() {
        let mut registry = seeded_registry();
        // Seeding itself performed no observable-state change.
        assert!(!registry.take_changed(1));
    }

    #[test]
    fn tracker_set_marks_room_once_per_change() {
        let mut tracker = ChangeTracker::default();
        let mut slot = Some(1u8);
        assert!(tracker.set(Some(1), &mut slot, Some(2)));
        assert!(!tracker.set(Some(1), &mut slot, Some(2)));
        assert!(tracker.take(1));
        assert!(!tracker.take(1));
    }

    #[test]
    fn dirty_flags_are_independent_per_room() {
        let mut tracker = ChangeTracker::default();
        let mut a = 0u8;
        let mut b = 0u8;
        tracker.set(Some(1), &mut a, 1);
        tracker.set(Some(2), &mut b, 1);
        assert!(tracker.take(1));
        assert!(tracker.take(2));
        assert!(!tracker.take(1));
    }

    #[test]
    fn change_without_room_is_recorded_best_effort() {
        let mut tracker = ChangeTracker::default();
        let mut slot = 0u8;
        assert!(tracker.set(None, &mut slot, 7));
        assert_eq!(slot, 7);
    }

    #[test]
    fn configuration_for_unknown_device_is_ignored() {
        let mut registry = seeded_registry();
        registry.apply_configuration(Configuration {
            rf_address: addr(7, 7, 7),
            device_type: 1,
            room_id: 1,
            firmware_version: "01.00".to_string(),
            serial: "KEQ0777777".to_string(),
            heating: None,
            radiator: None,
        });
        assert!(registry.device(addr(7, 7, 7)).is_none());
        assert_eq!(registry.devices().count(), 1);
    }

    #[test]
    fn group_device_is_synthesized_not_registered() {
        let registry = seeded_registry();
        let group = registry.group_device(1).unwrap();
        assert_eq!(group.rf_address(), addr(0xAB, 0xCD, 0xEF));
        assert_eq!(group.room_id(), 1);
        assert!(registry.device(group.rf_address()).is_none());
    }

    #[test]
    fn record_temperature_mode_dirties_the_room() {
        let mut registry = seeded_registry();
        registry.record_temperature_mode(
            addr(1, 2, 3),
            Temperature::from_celsius(20.5).unwrap(),
            ThermostatMode::Manual,
        );
        assert!(registry.take_changed(1));
        let heating = registry.device(addr(1, 2, 3)).unwrap().heating().unwrap();
        assert_eq!(heating.target_temperature().unwrap().to_celsius(), 20.5);
        assert_eq!(heating.mode(), Some(ThermostatMode::Manual));
    }
}
