// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Statements: capabilities, specifications and results
//!
//! All three share the [`Statement`] body. The kind wrappers add the
//! validation rules and derivations that are specific to each.

mod hash;
mod kinds;
mod parameter;

pub use kinds::{Capability, ResultStatement, Specification};
pub use parameter::{Metavalue, Parameter, ResultColumn, MAX_RESULT_ROWS};

use crate::constraint::Constraint;
use crate::error::{Error, ParseError, ValidationError};
use crate::primitive::Value;
use crate::registry::Registry;
use crate::when::When;
use indexmap::IndexMap;
use std::sync::Arc;

/// Verb of statements that answer immediately rather than measure over time
pub const VERB_QUERY: &str = "query";
/// Verb of timed measurements
pub const VERB_MEASURE: &str = "measure";

/// The body shared by every statement kind
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    verb: String,
    label: Option<String>,
    token: Option<String>,
    registry: Arc<Registry>,
    when: When,
    parameters: IndexMap<String, Parameter>,
    metadata: IndexMap<String, Metavalue>,
    result_columns: IndexMap<String, ResultColumn>,
    link: Option<String>,
    export: Option<String>,
}

impl Statement {
    pub fn new(verb: impl Into<String>, registry: Arc<Registry>) -> Self {
        Self {
            verb: verb.into(),
            label: None,
            token: None,
            registry,
            when: When::default(),
            parameters: IndexMap::new(),
            metadata: IndexMap::new(),
            result_columns: IndexMap::new(),
            link: None,
            export: None,
        }
    }

    pub fn verb(&self) -> &str {
        &self.verb
    }

    pub fn is_query(&self) -> bool {
        self.verb == VERB_QUERY
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = Some(label.into());
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn when(&self) -> &When {
        &self.when
    }

    pub fn set_when(&mut self, when: When) {
        self.when = when;
    }

    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    pub fn set_link(&mut self, link: impl Into<String>) {
        self.link = Some(link.into());
    }

    pub fn export(&self) -> Option<&str> {
        self.export.as_deref()
    }

    pub fn set_export(&mut self, export: impl Into<String>) {
        self.export = Some(export.into());
    }

    /// Explicit token, or the content hash when none was set
    pub fn token(&self) -> String {
        match &self.token {
            Some(token) => token.clone(),
            None => self.mpcv_hash(),
        }
    }

    pub fn explicit_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    // --- parameters ---

    pub fn add_parameter(
        &mut self,
        name: &str,
        constraint: Constraint,
    ) -> Result<&mut Parameter, ParseError> {
        let element = self.registry.element(name)?;
        let (index, _) = self
            .parameters
            .insert_full(name.to_string(), Parameter::new(element, constraint));
        Ok(&mut self.parameters[index])
    }

    /// Add a parameter whose constraint is given in text form
    pub fn add_parameter_text(
        &mut self,
        name: &str,
        constraint: &str,
    ) -> Result<&mut Parameter, ParseError> {
        let element = self.registry.element(name)?;
        let constraint = Constraint::parse(element.primitive(), constraint)?;
        self.add_parameter(name, constraint)
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.get(name)
    }

    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.values()
    }

    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.parameters.keys().map(String::as_str)
    }

    pub fn count_parameters(&self) -> usize {
        self.parameters.len()
    }

    pub fn parameter_value(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name).and_then(Parameter::value)
    }

    pub fn set_parameter_value(&mut self, name: &str, value: Value) -> Result<(), ValidationError> {
        self.parameters
            .get_mut(name)
            .ok_or_else(|| ValidationError::UnknownParameter(name.to_string()))?
            .set_value(value)
    }

    pub fn set_parameter_text(&mut self, name: &str, text: &str) -> Result<(), Error> {
        self.parameters
            .get_mut(name)
            .ok_or_else(|| ValidationError::UnknownParameter(name.to_string()))?
            .set_value_text(text)
    }

    /// Fill every unset parameter whose constraint admits exactly one value
    pub fn set_single_values(&mut self) {
        for parameter in self.parameters.values_mut() {
            parameter.set_single_value();
        }
    }

    pub(crate) fn clear_parameter_values(&mut self) {
        for parameter in self.parameters.values_mut() {
            parameter.clear_value();
        }
    }

    pub(crate) fn clear_constraints(&mut self) {
        for parameter in self.parameters.values_mut() {
            parameter.clear_constraint();
        }
    }

    // --- metadata ---

    pub fn add_metadata(&mut self, name: &str, value: Value) -> Result<(), Error> {
        let element = self.registry.element(name)?;
        let metavalue = Metavalue::new(element, value)?;
        self.metadata.insert(name.to_string(), metavalue);
        Ok(())
    }

    /// Add metadata whose value is given in text form
    pub fn add_metadata_text(&mut self, name: &str, text: &str) -> Result<(), Error> {
        let element = self.registry.element(name)?;
        let value = element.primitive().parse_value(text)?;
        self.add_metadata(name, value)
    }

    pub fn metadata(&self) -> impl Iterator<Item = &Metavalue> {
        self.metadata.values()
    }

    pub fn metadata_value(&self, name: &str) -> Option<&Value> {
        self.metadata.get(name).map(Metavalue::value)
    }

    // --- result columns ---

    pub fn add_result_column(&mut self, name: &str) -> Result<(), ParseError> {
        let element = self.registry.element(name)?;
        self.result_columns
            .entry(name.to_string())
            .or_insert_with(|| ResultColumn::new(element));
        Ok(())
    }

    pub fn result_columns(&self) -> impl Iterator<Item = &ResultColumn> {
        self.result_columns.values()
    }

    pub fn result_column_names(&self) -> impl Iterator<Item = &str> {
        self.result_columns.keys().map(String::as_str)
    }

    pub fn result_column(&self, name: &str) -> Option<&ResultColumn> {
        self.result_columns.get(name)
    }

    pub fn count_result_columns(&self) -> usize {
        self.result_columns.len()
    }

    /// Row count: the longest column
    pub fn count_result_rows(&self) -> usize {
        self.result_columns.values().map(ResultColumn::len).max().unwrap_or(0)
    }

    pub fn result_value(&self, name: &str, row: usize) -> Option<&Value> {
        self.result_columns.get(name).and_then(|c| c.get(row))
    }

    pub fn set_result_value(
        &mut self,
        name: &str,
        row: usize,
        value: Value,
    ) -> Result<(), ValidationError> {
        self.result_columns
            .get_mut(name)
            .ok_or_else(|| ValidationError::UnknownResultColumn(name.to_string()))?
            .set(row, value)
    }

    /// Values of one row in column order, absent where a column is short
    pub fn result_row(&self, row: usize) -> Vec<Option<&Value>> {
        self.result_columns.values().map(|c| c.get(row)).collect()
    }

    pub(crate) fn result_columns_mut(&mut self) -> impl Iterator<Item = &mut ResultColumn> {
        self.result_columns.values_mut()
    }

    pub(crate) fn clear_result_rows(&mut self) {
        for column in self.result_columns.values_mut() {
            column.clear();
        }
    }

    // --- identity ---

    /// Hash of the statement's shape: registry, parameter and column names
    pub fn schema_hash(&self) -> String {
        hash::schema_hash(self)
    }

    /// Hash of the statement's full content, excluding label and token
    pub fn mpcv_hash(&self) -> String {
        hash::mpcv_hash(self)
    }
}

#[cfg(test)]
#[path = "statement_tests.rs"]
mod tests;
