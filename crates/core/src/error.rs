// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the information model

use thiserror::Error;

/// Errors raised while parsing textual or wire representations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid {primitive} value: {text:?}")]
    InvalidValue { primitive: String, text: String },
    #[error("unknown primitive: {0}")]
    UnknownPrimitive(String),
    #[error("invalid time: {0:?}")]
    InvalidTime(String),
    #[error("invalid duration: {0:?}")]
    InvalidDuration(String),
    #[error("invalid temporal scope {text:?}: {reason}")]
    InvalidWhen { text: String, reason: String },
    #[error("invalid crontab {text:?}: {reason}")]
    InvalidCrontab { text: String, reason: String },
    #[error("invalid constraint: {0:?}")]
    InvalidConstraint(String),
    #[error("unknown element {name} in registry {registry}")]
    UnknownElement { name: String, registry: String },
    #[error("unknown registry: {0}")]
    UnknownRegistry(String),
    #[error("invalid registry document: {0}")]
    InvalidRegistry(String),
    #[error("unsupported protocol version {found} (highest understood: {supported})")]
    UnsupportedVersion { found: u64, supported: u64 },
    #[error("missing field: {0}")]
    MissingField(String),
    #[error("invalid message: {0}")]
    InvalidMessage(String),
    #[error("JSON error: {0}")]
    Json(String),
}

impl From<serde_json::Error> for ParseError {
    fn from(e: serde_json::Error) -> Self {
        ParseError::Json(e.to_string())
    }
}

/// Errors raised when a statement violates the rules of its kind
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("value {value} does not satisfy constraint {constraint} on parameter {name}")]
    ConstraintViolation {
        name: String,
        value: String,
        constraint: String,
    },
    #[error("value {value} is not a {primitive} as required by {name}")]
    PrimitiveMismatch {
        name: String,
        value: String,
        primitive: String,
    },
    #[error("no parameter named {0}")]
    UnknownParameter(String),
    #[error("row {row} of result column {name} is beyond the limit of {max} rows")]
    RowOutOfRange { name: String, row: usize, max: usize },
    #[error("no result column named {0}")]
    UnknownResultColumn(String),
    #[error("capability parameter {0} must not carry a value")]
    CapabilityValue(String),
    #[error("capability must not carry result rows")]
    CapabilityRows,
    #[error("parameter {0} has no value")]
    MissingValue(String),
    #[error("result temporal scope {0} is not definite")]
    IndefiniteScope(String),
}

/// Any error raised by the information model
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
