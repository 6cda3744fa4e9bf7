// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake service and authorizer for testing

use crate::authz::Authorizer;
use crate::error::ServiceError;
use crate::service::{InterruptFlag, Service};
use async_trait::async_trait;
use mplane_core::{Capability, ResultStatement, Specification, Value};
use std::sync::{Arc, Mutex};

/// What a [`FakeService`] does when run
#[derive(Debug, Clone)]
pub enum Behaviour {
    /// Return a result carrying these rows of `(column, value)` cells
    Succeed(Vec<Vec<(String, Value)>>),
    /// Return a service failure with this message
    Fail(String),
    /// Panic with this message
    Panic(String),
    /// Block until interrupted, then return the rows so far
    WaitForInterrupt(Vec<Vec<(String, Value)>>),
}

/// Fake service that records every specification it runs
#[derive(Clone)]
pub struct FakeService {
    capability: Capability,
    behaviour: Behaviour,
    calls: Arc<Mutex<Vec<Specification>>>,
}

impl FakeService {
    /// A service that succeeds with an empty result
    pub fn new(capability: Capability) -> Self {
        Self {
            capability,
            behaviour: Behaviour::Succeed(Vec::new()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_behaviour(mut self, behaviour: Behaviour) -> Self {
        self.behaviour = behaviour;
        self
    }

    /// Append one result row to a succeeding or waiting service
    pub fn with_row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        let row = cells.into_iter().map(|(k, v)| (k.into(), v)).collect();
        match &mut self.behaviour {
            Behaviour::Succeed(rows) | Behaviour::WaitForInterrupt(rows) => rows.push(row),
            Behaviour::Fail(_) | Behaviour::Panic(_) => {}
        }
        self
    }

    pub fn run_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn calls(&self) -> Vec<Specification> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn result(
        specification: &Specification,
        rows: &[Vec<(String, Value)>],
    ) -> Result<ResultStatement, ServiceError> {
        let mut result = ResultStatement::from_specification(specification);
        for (index, row) in rows.iter().enumerate() {
            for (column, value) in row {
                result.set_result_value(column, index, value.clone())?;
            }
        }
        Ok(result)
    }
}

#[async_trait]
impl Service for FakeService {
    fn capability(&self) -> &Capability {
        &self.capability
    }

    #[allow(clippy::panic)]
    async fn run(
        &self,
        specification: Specification,
        interrupt: InterruptFlag,
    ) -> Result<ResultStatement, ServiceError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(specification.clone());

        match &self.behaviour {
            Behaviour::Succeed(rows) => Self::result(&specification, rows),
            Behaviour::Fail(message) => Err(ServiceError::Failed(message.clone())),
            Behaviour::Panic(message) => panic!("{}", message),
            Behaviour::WaitForInterrupt(rows) => {
                interrupt.raised().await;
                Self::result(&specification, rows)
            }
        }
    }
}

/// Fake authorizer with a fixed answer that records its calls
#[derive(Clone)]
pub struct FakeAuthorizer {
    allow: bool,
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl FakeAuthorizer {
    pub fn allowing() -> Self {
        Self::new(true)
    }

    pub fn denying() -> Self {
        Self::new(false)
    }

    fn new(allow: bool) -> Self {
        Self {
            allow,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// `(capability_label, identity)` pairs seen so far
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Authorizer for FakeAuthorizer {
    fn authorize(&self, capability_label: &str, identity: &str) -> bool {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((capability_label.to_string(), identity.to_string()));
        self.allow
    }
}
