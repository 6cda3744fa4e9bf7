// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parameters, metadata and result columns

use crate::constraint::Constraint;
use crate::error::{Error, ValidationError};
use crate::primitive::{Primitive, Value};
use crate::registry::Element;
use std::sync::Arc;

/// Highest number of rows a result column accepts
pub const MAX_RESULT_ROWS: usize = 1 << 20;

/// A constrained, optionally valued element
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    element: Arc<Element>,
    constraint: Constraint,
    value: Option<Value>,
}

impl Parameter {
    pub fn new(element: Arc<Element>, constraint: Constraint) -> Self {
        Self {
            element,
            constraint,
            value: None,
        }
    }

    pub fn element(&self) -> &Arc<Element> {
        &self.element
    }

    pub fn name(&self) -> &str {
        self.element.name()
    }

    pub fn primitive(&self) -> Primitive {
        self.element.primitive()
    }

    pub fn constraint(&self) -> &Constraint {
        &self.constraint
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// Assign a value, which must be of the element's primitive and meet
    /// the constraint
    pub fn set_value(&mut self, value: Value) -> Result<(), ValidationError> {
        if value.primitive() != self.primitive() {
            return Err(ValidationError::PrimitiveMismatch {
                name: self.name().to_string(),
                value: value.to_string(),
                primitive: self.primitive().to_string(),
            });
        }
        if !self.constraint.met_by(&value) {
            return Err(ValidationError::ConstraintViolation {
                name: self.name().to_string(),
                value: value.to_string(),
                constraint: self.constraint.to_string(),
            });
        }
        self.value = Some(value);
        Ok(())
    }

    /// Assign from text; `*` clears the value
    pub fn set_value_text(&mut self, text: &str) -> Result<(), Error> {
        match self.primitive().parse(text)? {
            Some(value) => self.set_value(value)?,
            None => self.value = None,
        }
        Ok(())
    }

    pub fn clear_value(&mut self) {
        self.value = None;
    }

    /// Fill in the value if the constraint admits exactly one
    pub fn set_single_value(&mut self) {
        if self.value.is_none() {
            self.value = self.constraint.single_value().cloned();
        }
    }

    pub(crate) fn clear_constraint(&mut self) {
        self.constraint = Constraint::Unconstrained;
    }
}

/// An unconstrained name/value pair
#[derive(Debug, Clone, PartialEq)]
pub struct Metavalue {
    element: Arc<Element>,
    value: Value,
}

impl Metavalue {
    pub fn new(element: Arc<Element>, value: Value) -> Result<Self, ValidationError> {
        if value.primitive() != element.primitive() {
            return Err(ValidationError::PrimitiveMismatch {
                name: element.name().to_string(),
                value: value.to_string(),
                primitive: element.primitive().to_string(),
            });
        }
        Ok(Self { element, value })
    }

    pub fn element(&self) -> &Arc<Element> {
        &self.element
    }

    pub fn name(&self) -> &str {
        self.element.name()
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// One column of a tabular result
///
/// Writing past the end pads the column with absent values.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultColumn {
    element: Arc<Element>,
    values: Vec<Option<Value>>,
}

impl ResultColumn {
    pub fn new(element: Arc<Element>) -> Self {
        Self {
            element,
            values: Vec::new(),
        }
    }

    pub fn element(&self) -> &Arc<Element> {
        &self.element
    }

    pub fn name(&self) -> &str {
        self.element.name()
    }

    pub fn primitive(&self) -> Primitive {
        self.element.primitive()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, row: usize) -> Option<&Value> {
        self.values.get(row).and_then(Option::as_ref)
    }

    pub fn set(&mut self, row: usize, value: Value) -> Result<(), ValidationError> {
        if value.primitive() != self.primitive() {
            return Err(ValidationError::PrimitiveMismatch {
                name: self.name().to_string(),
                value: value.to_string(),
                primitive: self.primitive().to_string(),
            });
        }
        if row >= MAX_RESULT_ROWS {
            return Err(ValidationError::RowOutOfRange {
                name: self.name().to_string(),
                row,
                max: MAX_RESULT_ROWS,
            });
        }
        if row >= self.values.len() {
            self.values.resize(row + 1, None);
        }
        self.values[row] = Some(value);
        Ok(())
    }

    pub fn push(&mut self, value: Option<Value>) {
        self.values.push(value);
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}
