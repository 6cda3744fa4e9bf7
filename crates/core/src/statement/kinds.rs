// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Statement kinds
//!
//! Each kind derefs to its [`Statement`] body. Derivation always copies
//! the body, so filling in a specification never touches the capability
//! it came from.

use super::{hash, Statement};
use crate::error::ValidationError;
use crate::primitive::format_time;
use crate::registry::Registry;
use crate::when::When;
use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

macro_rules! statement_kind {
    ($name:ident) => {
        impl $name {
            pub fn new(verb: impl Into<String>, registry: Arc<Registry>) -> Self {
                Self(Statement::new(verb, registry))
            }

            pub fn from_statement(statement: Statement) -> Self {
                Self(statement)
            }

            pub fn statement(&self) -> &Statement {
                &self.0
            }

            pub fn into_statement(self) -> Statement {
                self.0
            }
        }

        impl Deref for $name {
            type Target = Statement;

            fn deref(&self) -> &Statement {
                &self.0
            }
        }

        impl DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Statement {
                &mut self.0
            }
        }
    };
}

/// Something a component can measure
#[derive(Debug, Clone, PartialEq)]
pub struct Capability(Statement);

/// A request to run a capability with every parameter filled in
#[derive(Debug, Clone, PartialEq)]
pub struct Specification(Statement);

/// The outcome of running a specification
#[derive(Debug, Clone, PartialEq)]
pub struct ResultStatement(Statement);

statement_kind!(Capability);
statement_kind!(Specification);
statement_kind!(ResultStatement);

impl Capability {
    /// Parameters must be unvalued and there must be no result rows
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(parameter) = self.parameters().find(|p| p.has_value()) {
            return Err(ValidationError::CapabilityValue(parameter.name().to_string()));
        }
        if self.count_result_rows() > 0 {
            return Err(ValidationError::CapabilityRows);
        }
        Ok(())
    }
}

impl Specification {
    /// Copy a capability's body, filling parameters that have no choice
    pub fn from_capability(capability: &Capability) -> Self {
        let mut statement = capability.statement().clone();
        statement.token = None;
        statement.clear_parameter_values();
        statement.clear_result_rows();
        statement.set_single_values();
        Self(statement)
    }

    /// Every parameter must have a value
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(parameter) = self.parameters().find(|p| !p.has_value()) {
            return Err(ValidationError::MissingValue(parameter.name().to_string()));
        }
        Ok(())
    }

    /// Whether `capability` can serve this specification at `tzero`
    pub fn fulfills(&self, capability: &Capability, tzero: DateTime<Utc>) -> bool {
        self.schema_hash() == capability.schema_hash()
            && self.when().follows(capability.when(), tzero)
    }

    /// Pin the token to the instant a relative scope was evaluated
    ///
    /// `now + 30s` names a different interval every time it is evaluated,
    /// so identical text submitted at different seconds gets different
    /// tokens.
    pub fn retoken(&mut self, tzero: DateTime<Utc>) {
        let tzero = tzero
            .duration_trunc(TimeDelta::seconds(1))
            .unwrap_or(tzero);
        let token = hash::retoken(&self.0, &format_time(&tzero));
        self.0.token = Some(token);
    }

    /// A copy carrying one concrete occurrence of a repeated scope
    pub fn for_occurrence(&self, when: When) -> Self {
        let mut statement = self.0.clone();
        statement.set_when(when);
        Self(statement)
    }
}

impl ResultStatement {
    /// Copy a specification's body, keeping its token and dropping
    /// constraints so observed values need not meet them
    pub fn from_specification(specification: &Specification) -> Self {
        let mut statement = specification.statement().clone();
        statement.token = Some(specification.token());
        statement.clear_constraints();
        statement.clear_result_rows();
        Self(statement)
    }

    /// Every parameter must have a value and the scope must be definite
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(parameter) = self.parameters().find(|p| !p.has_value()) {
            return Err(ValidationError::MissingValue(parameter.name().to_string()));
        }
        if !self.when().is_definite() {
            return Err(ValidationError::IndefiniteScope(self.when().to_string()));
        }
        Ok(())
    }
}
