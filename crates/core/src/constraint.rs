// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parameter constraints
//!
//! Text forms: `*` (anything), `a ... b` (inclusive range), `a,b,c` (set).
//! A lone value is a singleton set.

use crate::error::ParseError;
use crate::primitive::{Primitive, Value, UNCONSTRAINED};
use std::cmp::Ordering;
use std::fmt;

const RANGE_SEP: &str = " ... ";
const SET_SEP: char = ',';

/// The set of values a capability accepts for a parameter
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Constraint {
    #[default]
    Unconstrained,
    Range(Value, Value),
    Set(Vec<Value>),
}

impl Constraint {
    /// Inclusive range, swapped so the lower bound comes first
    pub fn range(a: Value, b: Value) -> Self {
        if a.partial_cmp(&b) == Some(Ordering::Greater) {
            Constraint::Range(b, a)
        } else {
            Constraint::Range(a, b)
        }
    }

    pub fn set(values: impl IntoIterator<Item = Value>) -> Self {
        Constraint::Set(values.into_iter().collect())
    }

    pub fn parse(primitive: Primitive, text: &str) -> Result<Self, ParseError> {
        let text = text.trim();
        if text == UNCONSTRAINED {
            return Ok(Constraint::Unconstrained);
        }
        if let Some((a, b)) = text.split_once(RANGE_SEP) {
            let a = primitive.parse_value(a)?;
            let b = primitive.parse_value(b)?;
            if a.partial_cmp(&b).is_none() {
                return Err(ParseError::InvalidConstraint(text.to_string()));
            }
            return Ok(Constraint::range(a, b));
        }
        let values = text
            .split(SET_SEP)
            .map(|v| primitive.parse_value(v))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Constraint::Set(values))
    }

    /// Whether `value` is admissible
    pub fn met_by(&self, value: &Value) -> bool {
        match self {
            Constraint::Unconstrained => true,
            Constraint::Range(a, b) => {
                matches!(
                    a.partial_cmp(value),
                    Some(Ordering::Less | Ordering::Equal)
                ) && matches!(
                    value.partial_cmp(b),
                    Some(Ordering::Less | Ordering::Equal)
                )
            }
            Constraint::Set(values) => values.contains(value),
        }
    }

    /// The sole admissible value, if the constraint leaves no choice
    pub fn single_value(&self) -> Option<&Value> {
        match self {
            Constraint::Range(a, b) if a == b => Some(a),
            Constraint::Set(values) if values.len() == 1 => values.first(),
            _ => None,
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        matches!(self, Constraint::Unconstrained)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Unconstrained => f.write_str(UNCONSTRAINED),
            Constraint::Range(a, b) => write!(f, "{}{}{}", a, RANGE_SEP, b),
            Constraint::Set(values) => {
                let mut first = true;
                for v in values {
                    if !first {
                        write!(f, "{}", SET_SEP)?;
                    }
                    first = false;
                    write!(f, "{}", v)?;
                }
                Ok(())
            }
        }
    }
}
