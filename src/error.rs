// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `maxcube_lib` library.
//!
//! This module provides the error hierarchy for failures across the library:
//! value validation, TCP transport, frame decoding, and gateway command
//! outcomes. Expected failure modes are always returned as `Err` values,
//! never panics.

use thiserror::Error;

use crate::types::RfAddress;

/// The main error type for this library.
///
/// This enum encompasses all possible errors that can occur when talking to
/// a MAX! Cube gateway.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred on the TCP connection to the gateway.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Error occurred while decoding a gateway frame.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Error reported by the gateway or by device-kind checks.
    #[error("device error: {0}")]
    Device(#[from] DeviceError),

    /// No device with this radio address is known to the gateway.
    #[error("unknown device {0}")]
    UnknownDevice(RfAddress),

    /// No room with this id is known to the gateway.
    #[error("unknown room {0}")]
    UnknownRoom(u8),
}

/// Errors related to value validation and constraints.
///
/// These errors occur when attempting to create constrained types
/// with invalid values, or when a command input fails its preconditions.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValueError {
    /// A temperature is not a multiple of 0.5 degrees Celsius.
    #[error("temperature {0} is not a multiple of 0.5 degrees")]
    TemperatureNotHalfDegree(f64),

    /// A temperature exceeds the settable range.
    #[error("temperature {actual} exceeds the maximum of {max} degrees")]
    TemperatureTooHigh {
        /// Maximum settable temperature in degrees Celsius.
        max: f64,
        /// The temperature that was provided.
        actual: f64,
    },

    /// A time of day is not on the 5-minute grid.
    #[error("time of day {0} minutes is not a multiple of 5 minutes")]
    TimeNotFiveMinutes(u16),

    /// A time of day lies past the end-of-day sentinel.
    #[error("time of day {0} minutes is past 24:00")]
    TimePastMidnight(u16),

    /// A time-of-day string could not be parsed as `HH:MM`.
    #[error("invalid time of day: {0}")]
    InvalidTimeOfDay(String),

    /// A radio address string is not 6 hexadecimal characters.
    #[error("invalid rf address: {0}")]
    InvalidRfAddress(String),

    /// An unrecognized weekday name.
    #[error("invalid weekday: {0}")]
    InvalidWeekday(String),

    /// An unrecognized thermostat mode name.
    #[error("invalid thermostat mode: {0}")]
    InvalidMode(String),

    /// A day programme holds more setpoints than the gateway stores.
    #[error("programme has {actual} setpoints, the gateway stores at most {max}")]
    TooManySetpoints {
        /// Maximum number of setpoints per day.
        max: usize,
        /// The number of setpoints that was provided.
        actual: usize,
    },
}

/// Errors on the TCP connection to the gateway.
///
/// `Transport::send` recovers from the first failure with one
/// reconnect-and-resend attempt. Only the second failure surfaces here.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The gateway address could not be resolved.
    #[error("invalid gateway address: {0}")]
    InvalidAddress(String),

    /// Connecting to the gateway failed.
    #[error("connection failed: {0}")]
    Connect(#[source] std::io::Error),

    /// Reading or writing the socket failed, including after the retry.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// An operation was attempted without an open connection.
    #[error("not connected to the gateway")]
    NotConnected,
}

/// Errors while decoding a single gateway frame or submessage.
///
/// A decode failure abandons that frame only; other frames in the same
/// burst continue to be processed.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The base64 payload of a frame could not be decoded.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// A frame or submessage ended before a required field.
    #[error("frame truncated while reading {0}")]
    Truncated(&'static str),

    /// A comma-separated frame is missing a field.
    #[error("missing field in frame: {0}")]
    MissingField(&'static str),

    /// A numeric token could not be parsed.
    #[error("invalid {field} field: {value:?}")]
    InvalidNumber {
        /// Name of the field that failed to parse.
        field: &'static str,
        /// The raw token.
        value: String,
    },

    /// JSON serialization of exported state failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors reported by the gateway or by device-kind checks.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The gateway answered a write with a non-zero result code.
    #[error(
        "command rejected by gateway (result={result}, duty cycle={duty_cycle:?}, free slots={memory_slots:?})"
    )]
    CommandRejected {
        /// Result code from the Status frame (always > 0 here).
        result: u8,
        /// RF duty cycle at the time of rejection, when known.
        duty_cycle: Option<u8>,
        /// Free command slots at the time of rejection, when known.
        memory_slots: Option<u8>,
    },

    /// The operation targets a device kind that cannot accept it.
    #[error("device {0} is not a heating device")]
    NotAThermostat(RfAddress),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_error_display() {
        let err = ValueError::TemperatureTooHigh {
            max: 32.0,
            actual: 32.5,
        };
        assert_eq!(
            err.to_string(),
            "temperature 32.5 exceeds the maximum of 32 degrees"
        );
    }

    #[test]
    fn error_from_value_error() {
        let value_err = ValueError::TemperatureNotHalfDegree(21.3);
        let err: Error = value_err.into();
        assert!(matches!(
            err,
            Error::Value(ValueError::TemperatureNotHalfDegree(_))
        ));
    }

    #[test]
    fn command_rejected_display() {
        let err = DeviceError::CommandRejected {
            result: 1,
            duty_cycle: Some(30),
            memory_slots: Some(20),
        };
        let text = err.to_string();
        assert!(text.contains("result=1"));
        assert!(text.contains("30"));
    }

    #[test]
    fn decode_error_display() {
        let err = DecodeError::MissingField("firmware");
        assert_eq!(err.to_string(), "missing field in frame: firmware");
    }
}
