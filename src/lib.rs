// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `MaxCube` Lib - A Rust library to control eQ-3 MAX! heating systems.
//!
//! This library talks to the MAX! Cube LAN gateway over its proprietary
//! line-oriented TCP protocol and maintains a live model of the rooms,
//! radiator thermostats, wall thermostats and window shutters it reports.
//!
//! # Supported Features
//!
//! - **Device model**: rooms, thermostats, wall thermostats, window
//!   shutters, with per-room change tracking
//! - **Live status**: target/actual temperatures, valve positions, modes,
//!   battery and window state
//! - **Writes**: set temperature and mode, set weekly programmes, per
//!   device or per room
//! - **Export**: JSON snapshots of the full device state
//!
//! # Quick Start
//!
//! ```no_run
//! use maxcube_lib::{CommandTarget, Cube, CubeConfig, ThermostatMode};
//! use maxcube_lib::types::Temperature;
//!
//! fn main() -> maxcube_lib::Result<()> {
//!     // Connecting decodes the gateway's greeting burst and requests a
//!     // first live status.
//!     let mut cube = Cube::connect(CubeConfig::new("192.168.0.16"))?;
//!
//!     for device in cube.devices() {
//!         println!("{} ({})", device.name(), device.rf_address());
//!     }
//!
//!     // Set the living room to 21.5 degrees, manual mode.
//!     cube.set_temperature_mode(
//!         CommandTarget::Room(1),
//!         Temperature::from_celsius(21.5)?,
//!         ThermostatMode::Manual,
//!     )?;
//!
//!     // Edge-triggered change polling for a downstream publisher.
//!     cube.refresh()?;
//!     if cube.take_changed(1) {
//!         println!("{}", cube.devices_as_json()?);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Concurrency
//!
//! The library is deliberately synchronous: one blocking TCP connection,
//! one in-flight request at a time, no internal locking. Callers that
//! share a [`Cube`] across threads or tasks must serialize access
//! themselves, e.g. behind a mutex or a single-owner task.
//!
//! # Protocol caveat
//!
//! The Cube protocol has no length prefix; a response ends when the
//! socket goes idle for the configured timeout (2 seconds by default).
//! A slow or fragmented TCP delivery can therefore be misread as
//! end-of-message. This library preserves the real protocol's behavior
//! rather than inventing framing the gateway does not have.

pub mod command;
mod config;
mod cube;
mod device;
pub mod error;
pub mod message;
pub mod protocol;
mod registry;
pub mod types;

pub use command::CommandTarget;
pub use config::{CubeConfig, DEFAULT_PORT, DEFAULT_TIMEOUT};
pub use cube::{Cube, ProgrammeConfig};
pub use device::{
    Decalcification, Device, DeviceData, DeviceType, GroupDevice, HeatingState, Room,
    ThermostatState,
};
pub use error::{DecodeError, DeviceError, Error, Result, TransportError, ValueError};
pub use types::{
    Battery, Programme, RfAddress, Setpoint, Temperature, ThermostatMode, TimeOfDay, Weekday,
};
