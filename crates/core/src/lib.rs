// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mplane-core: information model for the mPlane measurement protocol
//!
//! This crate provides:
//! - Primitives, elements and the process-wide registry store
//! - Temporal scopes (`When`) with durations, crontabs and occurrences
//! - Capabilities, specifications, results and notifications
//! - The JSON wire codec

pub mod clock;
pub mod constraint;
pub mod error;
pub mod message;
pub mod primitive;
pub mod registry;
pub mod statement;
pub mod when;
pub mod wire;

pub use clock::{Clock, FakeClock, SystemClock};
pub use constraint::Constraint;
pub use error::{Error, ParseError, ValidationError};
pub use message::{
    Envelope, EnvelopeKind, Exception, Interrupt, Message, Receipt, Redemption, Withdrawal,
};
pub use primitive::{Primitive, Value};
pub use registry::{Element, Registries, Registry, CORE_REGISTRY_URI};
pub use statement::{
    Capability, Metavalue, Parameter, ResultColumn, ResultStatement, Specification, Statement,
    MAX_RESULT_ROWS, VERB_MEASURE, VERB_QUERY,
};
pub use when::{Crontab, Occurrences, TimeRef, When};
