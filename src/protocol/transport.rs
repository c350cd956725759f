// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Blocking TCP transport with one-shot reconnect on send failure.

use std::io::{self, Read as _, Write as _};
use std::net::{Shutdown, TcpStream, ToSocketAddrs as _};

use crate::config::CubeConfig;
use crate::error::TransportError;

/// Read chunk size for the receive loop.
const RECV_BUFFER: usize = 4096;

/// The polite goodbye the gateway expects before the socket closes.
const QUIT_FRAME: &[u8] = b"q:\r\n";

/// Owns the single TCP connection to the gateway.
///
/// The receive loop accumulates chunks until a zero-length read or the
/// socket timeout; that timeout IS the protocol's end-of-response marker.
/// There is no length prefix, so a slow or fragmented delivery can be
/// misread as end-of-message. That fragility is part of the real
/// protocol and is deliberately not papered over here.
#[derive(Debug)]
pub struct Transport {
    config: CubeConfig,
    stream: Option<TcpStream>,
}

impl Transport {
    /// Creates a transport; no connection is opened yet.
    #[must_use]
    pub fn new(config: CubeConfig) -> Self {
        Self {
            config,
            stream: None,
        }
    }

    /// Opens a fresh connection, discarding any previous one.
    ///
    /// Returns the gateway's unsolicited greeting burst (Hello, Metadata
    /// and per-device Configuration frames).
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when the address does not resolve or
    /// the connection cannot be established.
    pub fn connect(&mut self) -> Result<String, TransportError> {
        tracing::debug!(
            host = %self.config.host(),
            port = self.config.port(),
            "connecting to cube"
        );
        if let Some(stale) = self.stream.take() {
            // A stale socket may already be dead; nothing to do about it.
            let _ = stale.shutdown(Shutdown::Both);
        }

        let address = (self.config.host(), self.config.port())
            .to_socket_addrs()
            .map_err(|_| TransportError::InvalidAddress(self.config.host().to_string()))?
            .next()
            .ok_or_else(|| TransportError::InvalidAddress(self.config.host().to_string()))?;

        let stream = TcpStream::connect_timeout(&address, self.config.timeout())
            .map_err(TransportError::Connect)?;
        stream.set_read_timeout(Some(self.config.timeout()))?;
        self.stream = Some(stream);

        Ok(self.read_until_idle()?)
    }

    /// Sends one CRLF-terminated frame and returns the response burst.
    ///
    /// On any I/O failure this reconnects and resends exactly once; a
    /// second failure is the final outcome. The greeting burst consumed
    /// by the reconnect is dropped - the caller gets only the response
    /// to its own frame.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when the retry also fails.
    pub fn send(&mut self, frame: &str) -> Result<String, TransportError> {
        if self.stream.is_none() {
            self.connect()?;
        }
        match self.write_and_read(frame) {
            Ok(response) => Ok(response),
            Err(error) => {
                tracing::warn!(%error, "cube connection failed, reconnecting once");
                self.connect()?;
                let response = self.write_and_read(frame)?;
                tracing::info!("resend succeeded");
                Ok(response)
            }
        }
    }

    /// Sends the quit frame best-effort and closes the socket.
    pub fn disconnect(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.write_all(QUIT_FRAME);
            let _ = stream.shutdown(Shutdown::Both);
            tracing::debug!("disconnected from cube");
        }
    }

    /// Returns `true` while a socket is held open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn write_and_read(&mut self, frame: &str) -> io::Result<String> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotConnected))?;
        stream.write_all(frame.as_bytes())?;
        self.read_until_idle()
    }

    /// Reads until a zero-length read or the socket timeout.
    fn read_until_idle(&mut self) -> io::Result<String> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotConnected))?;
        let mut buffer = Vec::new();
        let mut chunk = [0u8; RECV_BUFFER];
        loop {
            match stream.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => buffer.extend_from_slice(&chunk[..n]),
                // Timeout kinds differ per platform; both mean "idle".
                Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read as _, Write as _};
    use std::net::TcpListener;
    use std::thread;
    use std::time::Duration;

    fn short_config(port: u16) -> CubeConfig {
        CubeConfig::new("127.0.0.1")
            .with_port(port)
            .with_timeout(Duration::from_millis(200))
    }

    #[test]
    fn connect_reads_the_greeting() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            socket.write_all(b"H:KEQ0523864,0a1b2c,0113\r\n").unwrap();
        });

        let mut transport = Transport::new(short_config(port));
        let greeting = transport.connect().unwrap();
        assert!(greeting.starts_with("H:"));
        assert!(transport.is_connected());
    }

    #[test]
    fn connect_to_unreachable_port_fails() {
        // Port 1 on localhost is almost certainly closed.
        let mut transport = Transport::new(short_config(1));
        assert!(matches!(
            transport.connect(),
            Err(TransportError::Connect(_))
        ));
    }

    #[test]
    fn send_round_trips_one_frame() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            socket.write_all(b"H:KEQ0523864,0a1b2c,0113\r\n").unwrap();
            let mut buf = [0u8; 64];
            let n = socket.read(&mut buf).unwrap();
            assert_eq!(&buf[..n], b"l:\r\n");
            socket.write_all(b"L:Cw==\r\n").unwrap();
        });

        let mut transport = Transport::new(short_config(port));
        transport.connect().unwrap();
        let response = transport.send("l:\r\n").unwrap();
        assert!(response.starts_with("L:"));
    }

    #[test]
    fn send_reconnects_once_after_a_dead_socket() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        thread::spawn(move || {
            // First connection: greet, then drop immediately.
            let (mut socket, _) = listener.accept().unwrap();
            socket.write_all(b"H:KEQ0523864,0a1b2c,0113\r\n").unwrap();
            drop(socket);

            // Second connection: greet and answer the resent frame.
            let (mut socket, _) = listener.accept().unwrap();
            socket.write_all(b"H:KEQ0523864,0a1b2c,0113\r\n").unwrap();
            let mut buf = [0u8; 64];
            let n = socket.read(&mut buf).unwrap();
            assert_eq!(&buf[..n], b"l:\r\n");
            socket.write_all(b"S:00,0,1f\r\n").unwrap();
        });

        let mut transport = Transport::new(short_config(port));
        transport.connect().unwrap();
        // Give the server a moment to close the first socket.
        thread::sleep(Duration::from_millis(50));

        // Depending on whether the dead socket surfaces as a reset or as
        // a clean EOF, the reconnect happens on the first or the second
        // send. Either way the frame ends up answered.
        let mut response = transport.send("l:\r\n").unwrap();
        if !response.contains("S:00,0,1f") {
            response = transport.send("l:\r\n").unwrap();
        }
        assert!(response.contains("S:00,0,1f"));
    }
}
