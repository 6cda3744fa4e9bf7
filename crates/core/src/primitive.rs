// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Primitive scalar codecs and the values they produce
//!
//! Every element in a registry names one [`Primitive`]. The primitive
//! converts between the textual form used on the wire and a native
//! [`Value`]. The text `*` is the universal "no value" sentinel and maps to
//! `None` on the native side.

use crate::error::ParseError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::cmp::Ordering;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// Text form of an absent value
pub const UNCONSTRAINED: &str = "*";

const TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// A named scalar type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    String,
    Natural,
    Real,
    Boolean,
    Time,
    Address,
    Url,
}

impl Primitive {
    pub fn name(&self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Natural => "natural",
            Primitive::Real => "real",
            Primitive::Boolean => "boolean",
            Primitive::Time => "time",
            Primitive::Address => "address",
            Primitive::Url => "url",
        }
    }

    /// Parse text, mapping `*` to `None`
    pub fn parse(&self, text: &str) -> Result<Option<Value>, ParseError> {
        let text = text.trim();
        if text == UNCONSTRAINED {
            return Ok(None);
        }
        self.parse_value(text).map(Some)
    }

    /// Parse text that must denote a concrete value
    pub fn parse_value(&self, text: &str) -> Result<Value, ParseError> {
        let text = text.trim();
        let invalid = || ParseError::InvalidValue {
            primitive: self.name().to_string(),
            text: text.to_string(),
        };
        match self {
            Primitive::String => Ok(Value::String(text.to_string())),
            Primitive::Natural => text.parse().map(Value::Natural).map_err(|_| invalid()),
            Primitive::Real => text
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Value::Real)
                .ok_or_else(invalid),
            Primitive::Boolean => match text.to_ascii_lowercase().as_str() {
                "true" => Ok(Value::Boolean(true)),
                "false" => Ok(Value::Boolean(false)),
                _ => Err(invalid()),
            },
            Primitive::Time => parse_time(text)
                .map(Value::Time)
                .map_err(|_| invalid()),
            Primitive::Address => text.parse().map(Value::Address).map_err(|_| invalid()),
            Primitive::Url => {
                if text.contains(':') && !text.contains(char::is_whitespace) {
                    Ok(Value::Url(text.to_string()))
                } else {
                    Err(invalid())
                }
            }
        }
    }

    /// Unparse an optional value, writing `*` for `None`
    pub fn unparse(value: Option<&Value>) -> String {
        match value {
            Some(v) => v.to_string(),
            None => UNCONSTRAINED.to_string(),
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Primitive {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(Primitive::String),
            "natural" => Ok(Primitive::Natural),
            "real" => Ok(Primitive::Real),
            "boolean" => Ok(Primitive::Boolean),
            "time" => Ok(Primitive::Time),
            "address" => Ok(Primitive::Address),
            "url" => Ok(Primitive::Url),
            other => Err(ParseError::UnknownPrimitive(other.to_string())),
        }
    }
}

/// A native value of some primitive
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Natural(u64),
    Real(f64),
    Boolean(bool),
    Time(DateTime<Utc>),
    Address(IpAddr),
    Url(String),
}

impl Value {
    pub fn primitive(&self) -> Primitive {
        match self {
            Value::String(_) => Primitive::String,
            Value::Natural(_) => Primitive::Natural,
            Value::Real(_) => Primitive::Real,
            Value::Boolean(_) => Primitive::Boolean,
            Value::Time(_) => Primitive::Time,
            Value::Address(_) => Primitive::Address,
            Value::Url(_) => Primitive::Url,
        }
    }
}

impl PartialOrd for Value {
    /// Values of different primitives are incomparable
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a.partial_cmp(b),
            (Value::Natural(a), Value::Natural(b)) => a.partial_cmp(b),
            (Value::Real(a), Value::Real(b)) => a.partial_cmp(b),
            (Value::Boolean(a), Value::Boolean(b)) => a.partial_cmp(b),
            (Value::Time(a), Value::Time(b)) => a.partial_cmp(b),
            (Value::Address(a), Value::Address(b)) => a.partial_cmp(b),
            (Value::Url(a), Value::Url(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) | Value::Url(s) => f.write_str(s),
            Value::Natural(n) => write!(f, "{}", n),
            Value::Real(r) => write!(f, "{}", r),
            Value::Boolean(true) => f.write_str("True"),
            Value::Boolean(false) => f.write_str("False"),
            Value::Time(t) => f.write_str(&format_time(t)),
            Value::Address(a) => write!(f, "{}", a),
        }
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Natural(n)
    }
}

impl From<f64> for Value {
    fn from(r: f64) -> Self {
        Value::Real(r)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Time(t)
    }
}

impl From<IpAddr> for Value {
    fn from(a: IpAddr) -> Self {
        Value::Address(a)
    }
}

/// Parse an absolute UTC time
///
/// Accepts `YYYY-MM-DD HH:MM:SS[.ffffff]` with either a space or `T`
/// separator, minute precision, or a bare date (midnight). A trailing `Z`
/// is ignored.
pub fn parse_time(text: &str) -> Result<DateTime<Utc>, ParseError> {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_suffix('Z').unwrap_or(trimmed);
    for format in TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ParseError::InvalidTime(text.to_string()))
}

/// Format a UTC time, with microseconds only when they are non-zero
pub fn format_time(t: &DateTime<Utc>) -> String {
    if t.timestamp_subsec_micros() == 0 {
        t.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        t.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
    }
}

#[cfg(test)]
#[path = "primitive_tests.rs"]
mod tests;
