// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for MAX! device control.
//!
//! This module provides type-safe representations of the values carried by
//! the Cube protocol. Each type validates its wire constraints at
//! construction time, so command builders never produce a garbled frame.
//!
//! # Types
//!
//! - [`RfAddress`] - 3-byte radio identifier, rendered as 6 hex chars
//! - [`Temperature`] - setpoint on the half-degree Celsius grid
//! - [`ThermostatMode`] - Auto/Manual/Vacation/Boost
//! - [`Battery`] - Ok/Low battery condition
//! - [`Weekday`] - Saturday-first gateway week
//! - [`TimeOfDay`] - clock time on the 5-minute grid
//! - [`Setpoint`] / [`Programme`] - weekly schedule entries

mod mode;
mod programme;
mod rf_address;
mod temperature;

pub use mode::{Battery, ThermostatMode};
pub use programme::{
    MAX_SETPOINTS_PER_DAY, Programme, Setpoint, TimeOfDay, Weekday,
};
pub(crate) use programme::SETPOINTS_PER_WRITE;
pub use rf_address::RfAddress;
pub use temperature::Temperature;
