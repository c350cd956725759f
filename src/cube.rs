// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The gateway facade.
//!
//! [`Cube`] ties the transport, the frame decoders, the registry and the
//! command builders together: connect and decode the greeting burst,
//! refresh live status on demand, look up rooms and devices, and issue
//! writes with the gateway's acknowledgement checked.
//!
//! The facade is strictly single-threaded: one blocking connection, one
//! in-flight request. Callers that share a `Cube` across tasks must
//! serialize access themselves.

use serde::{Deserialize, Serialize};

use crate::command::{
    CommandTarget, DayBlock, RF_FLAG_DEVICE, RF_FLAG_ROOM, build_programme,
    build_temperature_mode, pad_setpoints,
};
use crate::config::CubeConfig;
use crate::device::{Device, GroupDevice, HeatingState, Room};
use crate::error::{DeviceError, Error, Result};
use crate::message::{Message, parse_burst};
use crate::protocol::Transport;
use crate::registry::Registry;
use crate::types::{Programme, RfAddress, Setpoint, Temperature, ThermostatMode, Weekday};

/// Frame requesting a fresh LiveStatus for all devices.
const REFRESH_FRAME: &str = "l:\r\n";

/// Identity and health of the gateway itself.
#[derive(Debug, Clone, Default)]
struct GatewayState {
    rf_address: Option<RfAddress>,
    serial: Option<String>,
    firmware_version: Option<String>,
    duty_cycle: Option<u8>,
    command_result: Option<u8>,
    memory_slots: Option<u8>,
}

/// Weekly programmes for one device, as loaded from an external source.
///
/// The on-disk format (JSON files, typically) is the collaborator's
/// concern; this is the structure it deserializes into and hands to
/// [`Cube::apply_programmes`]. A device without programmes (a window
/// shutter, say) may simply leave the map empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgrammeConfig {
    /// Device the programmes belong to.
    pub rf_address: RfAddress,
    /// Days to apply; omitted days are left untouched.
    #[serde(default)]
    pub programme: Programme,
}

/// A connected MAX! Cube gateway and its device model.
///
/// # Examples
///
/// ```no_run
/// use maxcube_lib::{CommandTarget, Cube, CubeConfig, ThermostatMode};
/// use maxcube_lib::types::Temperature;
///
/// fn main() -> maxcube_lib::Result<()> {
///     let mut cube = Cube::connect(CubeConfig::new("192.168.0.16"))?;
///
///     for room in cube.rooms() {
///         println!("room {}: {}", room.id(), room.name());
///     }
///
///     cube.set_temperature_mode(
///         CommandTarget::Room(1),
///         Temperature::from_celsius(21.0)?,
///         ThermostatMode::Manual,
///     )?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Cube {
    transport: Transport,
    registry: Registry,
    gateway: GatewayState,
}

impl Cube {
    /// Connects to the gateway and builds the initial device model.
    ///
    /// The connection sequence decodes the greeting burst (Hello,
    /// Metadata, per-device Configuration) and then requests a first
    /// LiveStatus.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the gateway is unreachable.
    pub fn connect(config: CubeConfig) -> Result<Self> {
        let mut transport = Transport::new(config);
        let greeting = transport.connect().map_err(Error::Transport)?;

        let mut cube = Self {
            transport,
            registry: Registry::new(),
            gateway: GatewayState::default(),
        };
        cube.apply_response(&greeting);
        cube.refresh()?;
        cube.log_summary();
        Ok(cube)
    }

    /// Requests a fresh LiveStatus and applies it to the device model.
    ///
    /// # Errors
    ///
    /// Returns a transport error when both the send and its one retry
    /// fail, or a command rejection if the gateway reports one.
    pub fn refresh(&mut self) -> Result<()> {
        self.send_command(REFRESH_FRAME)
    }

    /// Sends the quit frame and closes the connection.
    pub fn disconnect(&mut self) {
        self.transport.disconnect();
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Looks up a device by radio address.
    #[must_use]
    pub fn device(&self, rf_address: RfAddress) -> Option<&Device> {
        self.registry.device(rf_address)
    }

    /// Iterates over all known devices.
    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.registry.devices()
    }

    /// Looks up a room by id.
    #[must_use]
    pub fn room(&self, room_id: u8) -> Option<&Room> {
        self.registry.room(room_id)
    }

    /// Iterates over all known rooms.
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.registry.rooms()
    }

    /// Iterates over the devices assigned to one room.
    pub fn devices_in_room(&self, room_id: u8) -> impl Iterator<Item = &Device> {
        self.registry.devices_in_room(room_id)
    }

    /// Resolves a room's group pseudo-device.
    ///
    /// The pseudo-device addresses every device in the room at once. It
    /// is synthesized on lookup and never lives in the device registry.
    #[must_use]
    pub fn group_device(&self, room_id: u8) -> Option<GroupDevice> {
        self.registry.group_device(room_id)
    }

    /// Reads and clears a room's dirty flag.
    ///
    /// Returns `true` exactly once per burst of changes: the flag stays
    /// raised across polls until read, then stays cleared until the next
    /// actual change.
    pub fn take_changed(&mut self, room_id: u8) -> bool {
        self.registry.take_changed(room_id)
    }

    /// Snapshots the full device state for external publication.
    #[must_use]
    pub fn export(&self) -> Vec<Device> {
        self.registry.devices().cloned().collect()
    }

    /// Serializes the full device state to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns a decode error if serialization fails.
    pub fn devices_as_json(&self) -> Result<String> {
        let devices = self.export();
        serde_json::to_string_pretty(&devices)
            .map_err(|e| Error::Decode(crate::error::DecodeError::Json(e)))
    }

    // =========================================================================
    // Gateway identity
    // =========================================================================

    /// Returns the gateway's own radio address.
    #[must_use]
    pub fn rf_address(&self) -> Option<RfAddress> {
        self.gateway.rf_address
    }

    /// Returns the gateway serial.
    #[must_use]
    pub fn serial(&self) -> Option<&str> {
        self.gateway.serial.as_deref()
    }

    /// Returns the gateway firmware version as `major.minor`.
    #[must_use]
    pub fn firmware_version(&self) -> Option<&str> {
        self.gateway.firmware_version.as_deref()
    }

    /// Returns the percent of allowed RF airtime used.
    #[must_use]
    pub fn duty_cycle(&self) -> Option<u8> {
        self.gateway.duty_cycle
    }

    /// Returns the result code of the most recent write (0 = success).
    #[must_use]
    pub fn command_result(&self) -> Option<u8> {
        self.gateway.command_result
    }

    /// Returns the free command-queue slots on the gateway.
    #[must_use]
    pub fn memory_slots(&self) -> Option<u8> {
        self.gateway.memory_slots
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Sets target temperature and mode in one write.
    ///
    /// Device targets must be heating devices; room targets go through
    /// the room's group address. Local state is updated only after the
    /// gateway acknowledges the write.
    ///
    /// # Errors
    ///
    /// Returns a value error for temperatures above 32 degrees, a device
    /// error for non-heating targets or a gateway rejection, and a
    /// transport error when the connection is lost.
    pub fn set_temperature_mode(
        &mut self,
        target: CommandTarget,
        temperature: Temperature,
        mode: ThermostatMode,
    ) -> Result<()> {
        match target {
            CommandTarget::Device(rf_address) => {
                let device = self
                    .registry
                    .device(rf_address)
                    .ok_or(Error::UnknownDevice(rf_address))?;
                if !device.is_heating() {
                    tracing::error!(rf_address = %rf_address, "target is no (wall) thermostat");
                    return Err(DeviceError::NotAThermostat(rf_address).into());
                }
                let room_id = device.room_id().unwrap_or(0);
                let frame = build_temperature_mode(rf_address, room_id, temperature, mode)?;
                self.send_command(&frame)?;
                self.registry
                    .record_temperature_mode(rf_address, temperature, mode);
            }
            CommandTarget::Room(room_id) => {
                let group = self
                    .registry
                    .group_device(room_id)
                    .ok_or(Error::UnknownRoom(room_id))?;
                let frame =
                    build_temperature_mode(group.rf_address(), room_id, temperature, mode)?;
                self.send_command(&frame)?;
                let heating: Vec<RfAddress> = self
                    .registry
                    .devices_in_room(room_id)
                    .filter(|d| d.is_heating())
                    .map(Device::rf_address)
                    .collect();
                for rf_address in heating {
                    self.registry
                        .record_temperature_mode(rf_address, temperature, mode);
                }
            }
        }
        Ok(())
    }

    /// Sets the target temperature, keeping the current mode.
    ///
    /// Falls back to manual mode while the device's mode is still
    /// unknown.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Cube::set_temperature_mode`].
    pub fn set_target_temperature(
        &mut self,
        target: CommandTarget,
        temperature: Temperature,
    ) -> Result<()> {
        let mode = self
            .current_mode(target)
            .unwrap_or(ThermostatMode::Manual);
        self.set_temperature_mode(target, temperature, mode)
    }

    /// Sets the mode, keeping the current target temperature.
    ///
    /// While the target is still unknown the temperature byte is sent as
    /// zero, which in auto mode tells the device to take its target from
    /// the weekly programme.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Cube::set_temperature_mode`].
    pub fn set_mode(&mut self, target: CommandTarget, mode: ThermostatMode) -> Result<()> {
        let temperature = self
            .current_target(target)
            .unwrap_or(Temperature::from_raw(0));
        self.set_temperature_mode(target, temperature, mode)
    }

    /// Writes one day of a weekly programme.
    ///
    /// Room targets expand to the room's heating devices. Each targeted
    /// device is diffed first: a day is re-sent only when the new
    /// setpoints differ from the recorded ones, and if nothing differs
    /// the operation is a no-op success. Recorded state is updated only
    /// after the gateway acknowledges the write.
    ///
    /// # Errors
    ///
    /// Returns a value error for more than thirteen setpoints or
    /// temperatures above 32 degrees, a device error for non-heating
    /// targets or a gateway rejection, and a transport error when the
    /// connection is lost.
    pub fn set_programme(
        &mut self,
        target: CommandTarget,
        weekday: Weekday,
        setpoints: &[Setpoint],
    ) -> Result<()> {
        let padded = pad_setpoints(setpoints)?;

        let (rf_flag, candidates) = match target {
            CommandTarget::Device(rf_address) => {
                let device = self
                    .registry
                    .device(rf_address)
                    .ok_or(Error::UnknownDevice(rf_address))?;
                if !device.is_heating() {
                    tracing::error!(rf_address = %rf_address, "target is no (wall) thermostat");
                    return Err(DeviceError::NotAThermostat(rf_address).into());
                }
                (RF_FLAG_DEVICE, vec![(rf_address, device.room_id().unwrap_or(0))])
            }
            CommandTarget::Room(room_id) => {
                if self.registry.room(room_id).is_none() {
                    return Err(Error::UnknownRoom(room_id));
                }
                let devices: Vec<_> = self
                    .registry
                    .devices_in_room(room_id)
                    .filter(|d| d.is_heating())
                    .map(|d| (d.rf_address(), room_id))
                    .collect();
                (RF_FLAG_ROOM, devices)
            }
        };

        // Diff before encoding: only changed device+day pairs are sent.
        let changed: Vec<_> = candidates
            .into_iter()
            .filter(|(rf_address, _)| {
                let recorded = self
                    .registry
                    .device(*rf_address)
                    .and_then(Device::programme)
                    .map(|p| p.day(weekday));
                recorded != Some(setpoints)
            })
            .collect();

        if changed.is_empty() {
            tracing::debug!(%weekday, "programme unchanged, skipping write");
            return Ok(());
        }

        let blocks: Vec<DayBlock> = changed
            .iter()
            .map(|(rf_address, room_id)| DayBlock {
                rf_address: *rf_address,
                room_id: *room_id,
                weekday,
                setpoints: padded.clone(),
            })
            .collect();
        let frame = build_programme(rf_flag, &blocks);
        self.send_command(&frame)?;

        for (rf_address, _) in changed {
            self.registry
                .record_programme_day(rf_address, weekday, setpoints);
        }
        Ok(())
    }

    /// Applies externally-loaded weekly programmes device by device.
    ///
    /// Stops at the first failing write.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownDevice`] for an address the gateway never
    /// announced, plus the failure modes of [`Cube::set_programme`].
    pub fn apply_programmes(&mut self, configs: &[ProgrammeConfig]) -> Result<()> {
        for config in configs {
            if config.programme.is_empty() {
                // Nothing to write, e.g. a wall thermostat entry.
                continue;
            }
            if self.registry.device(config.rf_address).is_none() {
                return Err(Error::UnknownDevice(config.rf_address));
            }
            for (weekday, setpoints) in config.programme.iter() {
                self.set_programme(CommandTarget::Device(config.rf_address), weekday, setpoints)?;
            }
        }
        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Sends a frame and interprets the gateway's acknowledgement.
    ///
    /// The command-result slot is cleared first, so a stale Status frame
    /// from an earlier write can never fail this one.
    fn send_command(&mut self, frame: &str) -> Result<()> {
        tracing::debug!(frame = %frame.trim_end(), "sending command");
        self.gateway.command_result = None;
        let response = self.transport.send(frame).map_err(Error::Transport)?;
        self.apply_response(&response);

        match self.gateway.command_result {
            Some(result) if result > 0 => {
                tracing::error!(
                    result,
                    duty_cycle = ?self.gateway.duty_cycle,
                    memory_slots = ?self.gateway.memory_slots,
                    "command failed"
                );
                Err(DeviceError::CommandRejected {
                    result,
                    duty_cycle: self.gateway.duty_cycle,
                    memory_slots: self.gateway.memory_slots,
                }
                .into())
            }
            _ => Ok(()),
        }
    }

    /// Decodes a response burst and applies every frame.
    fn apply_response(&mut self, response: &str) {
        for message in parse_burst(response) {
            match message {
                Message::Hello(hello) => {
                    self.gateway.serial = Some(hello.serial);
                    self.gateway.rf_address = Some(hello.rf_address);
                    self.gateway.firmware_version = Some(hello.firmware_version);
                }
                Message::Metadata(metadata) => self.registry.apply_metadata(metadata),
                Message::Configuration(config) => self.registry.apply_configuration(config),
                Message::LiveStatus(status) => self.registry.apply_live_status(&status),
                Message::Status(status) => {
                    self.gateway.duty_cycle = Some(status.duty_cycle);
                    self.gateway.command_result = Some(status.command_result);
                    self.gateway.memory_slots = Some(status.memory_slots);
                }
            }
        }
    }

    fn current_mode(&self, target: CommandTarget) -> Option<ThermostatMode> {
        match target {
            CommandTarget::Device(rf) => self.device(rf)?.heating()?.mode(),
            CommandTarget::Room(room_id) => self
                .devices_in_room(room_id)
                .find_map(|d| d.heating().and_then(HeatingState::mode)),
        }
    }

    fn current_target(&self, target: CommandTarget) -> Option<Temperature> {
        match target {
            CommandTarget::Device(rf) => self.device(rf)?.heating()?.target_temperature(),
            CommandTarget::Room(room_id) => self
                .devices_in_room(room_id)
                .find_map(|d| d.heating().and_then(HeatingState::target_temperature)),
        }
    }

    /// One-line summary of the model after connecting.
    fn log_summary(&self) {
        tracing::info!(
            rf_address = ?self.gateway.rf_address.map(|a| a.to_string()),
            firmware = ?self.gateway.firmware_version,
            rooms = self.registry.rooms().count(),
            devices = self.registry.devices().count(),
            "cube connected"
        );
        for room in self.registry.rooms() {
            tracing::debug!(
                id = room.id(),
                name = %room.name(),
                group_rf = %room.group_rf_address(),
                "room"
            );
            for device in self.registry.devices_in_room(room.id()) {
                tracing::debug!(
                    rf_address = %device.rf_address(),
                    name = %device.name(),
                    kind = ?device.device_type(),
                    "device"
                );
            }
        }
    }
}
