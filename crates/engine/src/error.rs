// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the scheduling engine

use mplane_core::ValidationError;
use thiserror::Error;

/// Failures raised by a service while running a specification
///
/// The job turns these into an `Exception` reply; they never reach the
/// scheduler's caller as local errors.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("specification does not match capability {0}")]
    Mismatch(String),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("measurement failed: {0}")]
    Failed(String),
    #[error("service panicked: {0}")]
    Panicked(String),
}

/// Local configuration errors on the scheduler
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("capability {token} is already registered")]
    DuplicateCapability { token: String },
    #[error("invalid capability: {0}")]
    InvalidCapability(#[from] ValidationError),
}
