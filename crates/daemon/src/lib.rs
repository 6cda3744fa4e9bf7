// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mPlane component daemon
//!
//! Serves wire messages from a Unix socket to a scheduler populated with
//! the configured services.

pub mod config;
pub mod lifecycle;
pub mod protocol;
pub mod server;
pub mod services;

pub use config::{Config, ConfigError, DEFAULT_CONFIG_PATH};
pub use lifecycle::{startup, DaemonState, LifecycleError};
pub use protocol::ProtocolError;
pub use server::ServerError;
