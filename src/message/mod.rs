// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoders for the Cube's line-oriented frames.
//!
//! A gateway response is a burst of CRLF-separated frames, each starting
//! with a one-character type tag. The binary payloads are base64-wrapped.
//! [`parse_burst`] splits a burst and dispatches every frame to its
//! decoder; a malformed frame is logged and dropped without affecting the
//! rest of the burst.
//!
//! Frame shapes:
//!
//! | Tag | Content |
//! |-----|---------|
//! | `H` | gateway serial, rf address, firmware (comma tokens) |
//! | `M` | room and device tables (base64 binary) |
//! | `C` | per-device configuration (base64 binary) |
//! | `L` | live status of all devices (base64 binary) |
//! | `S` | duty cycle, command result, free memory slots |

mod configuration;
mod hello;
mod live_status;
mod metadata;
mod status;

pub use configuration::{Configuration, HeatingConfig, RadiatorConfig};
pub use hello::Hello;
pub use live_status::{LiveStatus, Submessage};
pub(crate) use live_status::{DeviceUpdate, decode_submessage};
pub use metadata::{DeviceEntry, Metadata, RoomEntry};
pub use status::Status;

use crate::error::DecodeError;

/// One decoded gateway frame.
#[derive(Debug, Clone)]
pub enum Message {
    /// `H:` greeting with the gateway's own identity.
    Hello(Hello),
    /// `M:` room and device tables.
    Metadata(Metadata),
    /// `C:` configuration of one device.
    Configuration(Configuration),
    /// `L:` live status of all devices.
    LiveStatus(LiveStatus),
    /// `S:` command outcome and gateway health counters.
    Status(Status),
}

/// Shortest frame worth dispatching; anything below carries no payload.
const MIN_FRAME_LEN: usize = 9;

/// Decodes a single trimmed frame by its type tag.
///
/// Returns `Ok(None)` for tags this library does not handle.
///
/// # Errors
///
/// Returns a [`DecodeError`] when the frame's payload is malformed.
pub fn parse_frame(frame: &str) -> Result<Option<Message>, DecodeError> {
    let message = match frame.as_bytes().first() {
        Some(b'H') => Some(Message::Hello(hello::decode(frame)?)),
        Some(b'M') => Some(Message::Metadata(metadata::decode(frame)?)),
        Some(b'C') => Some(Message::Configuration(configuration::decode(frame)?)),
        Some(b'L') => Some(Message::LiveStatus(live_status::decode(frame)?)),
        Some(b'S') => Some(Message::Status(status::decode(frame)?)),
        _ => None,
    };
    Ok(message)
}

/// Splits a response burst into frames and decodes each one.
///
/// Frames that are too short, carry an unknown tag, or fail to decode are
/// logged and skipped; the rest of the burst is still processed.
#[must_use]
pub fn parse_burst(response: &str) -> Vec<Message> {
    let mut messages = Vec::new();
    for line in response.split('\n') {
        let frame = line.trim();
        if frame.len() < MIN_FRAME_LEN {
            continue;
        }
        match parse_frame(frame) {
            Ok(Some(message)) => messages.push(message),
            Ok(None) => {
                tracing::warn!(tag = %&frame[..1], "unhandled frame type");
            }
            Err(error) => {
                tracing::warn!(frame = %frame, %error, "dropping malformed frame");
            }
        }
    }
    messages
}

/// Decodes the base64 payload of a binary frame.
pub(crate) fn decode_base64(payload: &str) -> Result<Vec<u8>, DecodeError> {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;

    Ok(STANDARD.decode(payload.trim())?)
}

/// Sequential reader over a binary payload.
///
/// Every read names the field it is after, so truncation errors say what
/// was missing.
pub(crate) struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn u8(&mut self, what: &'static str) -> Result<u8, DecodeError> {
        let byte = *self
            .data
            .get(self.pos)
            .ok_or(DecodeError::Truncated(what))?;
        self.pos += 1;
        Ok(byte)
    }

    pub(crate) fn bytes(&mut self, len: usize, what: &'static str) -> Result<&'a [u8], DecodeError> {
        let slice = self
            .data
            .get(self.pos..self.pos + len)
            .ok_or(DecodeError::Truncated(what))?;
        self.pos += len;
        Ok(slice)
    }

    pub(crate) fn skip(&mut self, len: usize) {
        self.pos += len;
    }
}

/// Decodes a length-prefixed string table entry (gateway names are not
/// guaranteed to be valid UTF-8; invalid bytes are replaced).
pub(crate) fn decode_name(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_skips_short_and_unknown_frames() {
        let burst = "S:00,0,32\r\nq:\r\nX:123456789\r\n";
        let messages = parse_burst(burst);
        assert_eq!(messages.len(), 1);
        assert!(matches!(messages[0], Message::Status(_)));
    }

    #[test]
    fn burst_survives_a_malformed_frame() {
        // The L frame has invalid base64; the S frame still decodes.
        let burst = "L:!!!invalid!!!\r\nS:00,0,32\r\n";
        let messages = parse_burst(burst);
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn reader_reports_truncation() {
        let mut reader = Reader::new(&[1, 2]);
        assert_eq!(reader.u8("first").unwrap(), 1);
        assert!(reader.bytes(3, "tail").is_err());
    }
}
