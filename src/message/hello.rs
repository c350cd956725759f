// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `H:` greeting decoder.

use crate::error::DecodeError;
use crate::types::RfAddress;

/// The gateway's unsolicited greeting.
///
/// Sent right after the TCP connection opens. Carries the gateway's own
/// identity; the trailing comma fields (HTTP connection id, date, time,
/// state) are present on the wire but unused here.
#[derive(Debug, Clone)]
pub struct Hello {
    /// Gateway serial number.
    pub serial: String,
    /// The gateway's own radio address.
    pub rf_address: RfAddress,
    /// Firmware version as `major.minor`, from the 4-hex-digit token.
    pub firmware_version: String,
}

pub(crate) fn decode(frame: &str) -> Result<Hello, DecodeError> {
    let mut tokens = frame[2..].split(',');
    let serial = tokens
        .next()
        .ok_or(DecodeError::MissingField("serial"))?
        .to_string();
    let rf_token = tokens.next().ok_or(DecodeError::MissingField("rf address"))?;
    let rf_address = rf_token
        .parse()
        .map_err(|_| DecodeError::InvalidNumber {
            field: "rf address",
            value: rf_token.to_string(),
        })?;
    let firmware = tokens.next().ok_or(DecodeError::MissingField("firmware"))?;
    if firmware.len() < 4 {
        return Err(DecodeError::Truncated("firmware"));
    }
    let firmware_version = format!("{}.{}", &firmware[..2], &firmware[2..4]);

    Ok(Hello {
        serial,
        rf_address,
        firmware_version,
    })
}
