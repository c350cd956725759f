// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `S:` status decoder.

use crate::error::DecodeError;

/// Gateway health counters and the outcome of the most recent write.
#[derive(Debug, Clone, Copy)]
pub struct Status {
    /// Percent of the allowed RF airtime used (hex on the wire).
    pub duty_cycle: u8,
    /// 0 on success, a failure code otherwise (decimal on the wire).
    pub command_result: u8,
    /// Free command-queue slots on the gateway (hex on the wire).
    pub memory_slots: u8,
}

pub(crate) fn decode(frame: &str) -> Result<Status, DecodeError> {
    let mut tokens = frame[2..].split(',');
    let duty_cycle = hex_token(tokens.next(), "duty cycle")?;
    let result_token = tokens
        .next()
        .ok_or(DecodeError::MissingField("command result"))?;
    let command_result = result_token
        .trim()
        .parse()
        .map_err(|_| DecodeError::InvalidNumber {
            field: "command result",
            value: result_token.to_string(),
        })?;
    let memory_slots = hex_token(tokens.next(), "memory slots")?;

    Ok(Status {
        duty_cycle,
        command_result,
        memory_slots,
    })
}

fn hex_token(token: Option<&str>, field: &'static str) -> Result<u8, DecodeError> {
    let token = token.ok_or(DecodeError::MissingField(field))?;
    u8::from_str_radix(token.trim(), 16).map_err(|_| DecodeError::InvalidNumber {
        field,
        value: token.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_status() {
        let status = decode("S:1e,0,1f").unwrap();
        assert_eq!(status.duty_cycle, 30);
        assert_eq!(status.command_result, 0);
        assert_eq!(status.memory_slots, 31);
    }

    #[test]
    fn nonzero_result_is_carried_through() {
        let status = decode("S:64,1,00").unwrap();
        assert_eq!(status.duty_cycle, 100);
        assert_eq!(status.command_result, 1);
        assert_eq!(status.memory_slots, 0);
    }

    #[test]
    fn rejects_garbage() {
        assert!(decode("S:zz,0,1f").is_err());
        assert!(decode("S:1e,0").is_err());
    }
}
