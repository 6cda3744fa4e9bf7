// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Answers queries with the component's current time

use std::sync::Arc;

use async_trait::async_trait;
use mplane_core::{
    Capability, Clock, ParseError, Registry, ResultStatement, Specification, Value, When,
    VERB_QUERY,
};
use mplane_engine::{InterruptFlag, Service, ServiceError};

pub struct ClockService<C: Clock> {
    capability: Capability,
    clock: C,
}

impl<C: Clock> ClockService<C> {
    pub fn new(registry: Arc<Registry>, label: &str, clock: C) -> Result<Self, ParseError> {
        let mut capability = Capability::new(VERB_QUERY, registry);
        capability.set_label(label);
        capability.add_result_column("time")?;
        Ok(Self { capability, clock })
    }
}

#[async_trait]
impl<C: Clock> Service for ClockService<C> {
    fn capability(&self) -> &Capability {
        &self.capability
    }

    async fn run(
        &self,
        specification: Specification,
        _interrupt: InterruptFlag,
    ) -> Result<ResultStatement, ServiceError> {
        let now = self.clock.now();
        let mut result = ResultStatement::from_specification(&specification);
        result.set_result_value("time", 0, Value::Time(now))?;
        result.set_when(When::instant(now));
        Ok(result)
    }
}
