// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests against a real MAX! Cube on the local network.
//!
//! These tests require a reachable gateway and are ignored by default.
//! Run with: `cargo test --test real_cube -- --ignored --test-threads=1`
//!
//! # Environment Variables
//!
//! - `MAXCUBE_HOST` - Gateway IP address (required)
//! - `MAXCUBE_PORT` - Gateway TCP port (default: 62910)
//!
//! # Example
//!
//! ```bash
//! export MAXCUBE_HOST=192.168.0.16
//! cargo test --test real_cube -- --ignored --test-threads=1
//! ```
//!
//! The tests are read-only: they never issue a write to the gateway.

use std::env;

use maxcube_lib::{Cube, CubeConfig};

fn cube_config() -> CubeConfig {
    let host = env::var("MAXCUBE_HOST").expect("MAXCUBE_HOST not set");
    let mut config = CubeConfig::new(host);
    if let Ok(port) = env::var("MAXCUBE_PORT") {
        config = config.with_port(port.parse().expect("MAXCUBE_PORT must be a port number"));
    }
    config
}

#[test]
#[ignore = "requires a real cube on the network"]
fn connect_and_list_devices() {
    let mut cube = Cube::connect(cube_config()).expect("connect to cube");

    assert!(cube.rf_address().is_some());
    assert!(cube.firmware_version().is_some());

    for room in cube.rooms() {
        println!("room {}: {}", room.id(), room.name());
        for device in cube.devices_in_room(room.id()) {
            println!(
                "  {} {} ({:?})",
                device.rf_address(),
                device.name(),
                device.device_type()
            );
        }
    }

    cube.disconnect();
}

#[test]
#[ignore = "requires a real cube on the network"]
fn refresh_keeps_the_model_consistent() {
    let mut cube = Cube::connect(cube_config()).expect("connect to cube");
    let device_count = cube.devices().count();

    cube.refresh().expect("refresh");

    // A refresh only updates known devices, never invents new ones.
    assert_eq!(cube.devices().count(), device_count);
    for device in cube.devices() {
        if let Some(heating) = device.heating() {
            if let Some(target) = heating.target_temperature() {
                assert!(target.to_celsius() <= 63.5);
            }
        }
    }

    cube.disconnect();
}

#[test]
#[ignore = "requires a real cube on the network"]
fn export_produces_valid_json() {
    let cube = Cube::connect(cube_config()).expect("connect to cube");
    let json = cube.devices_as_json().expect("export");
    let parsed: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
    assert!(parsed.is_array());
}
