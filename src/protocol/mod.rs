// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! TCP transport to the Cube gateway.
//!
//! One blocking connection, one in-flight request at a time. The
//! protocol has no framing beyond CRLF-separated lines and silence:
//! a response is complete when the socket goes idle for the configured
//! timeout. [`Transport`] preserves that behavior as-is.

mod transport;

pub use transport::Transport;
