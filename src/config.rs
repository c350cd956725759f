// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection configuration.

use std::time::Duration;

/// The gateway's default TCP port.
pub const DEFAULT_PORT: u16 = 62910;

/// Default socket timeout; also the protocol's idle-detection window.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Configuration for the TCP connection to a Cube.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use maxcube_lib::CubeConfig;
///
/// let config = CubeConfig::new("192.168.0.16")
///     .with_timeout(Duration::from_secs(5));
/// assert_eq!(config.port(), 62910);
/// ```
#[derive(Debug, Clone)]
pub struct CubeConfig {
    host: String,
    port: u16,
    timeout: Duration,
}

impl CubeConfig {
    /// Creates a configuration for the given host with default port and
    /// timeout.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the TCP port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Overrides the socket timeout.
    ///
    /// The timeout doubles as the response-framing mechanism: the
    /// protocol has no length prefix, so a response ends when the socket
    /// goes idle for this long.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the gateway host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the gateway TCP port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns the socket timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}
