// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Counts period ticks until interrupted

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::TimeDelta;
use mplane_core::{
    Capability, Clock, ParseError, Registry, ResultStatement, Specification, Value, When,
    VERB_MEASURE,
};
use mplane_engine::{InterruptFlag, Service, ServiceError};

const DEFAULT_PERIOD: Duration = Duration::from_secs(1);

/// Appends one `(time, packets)` row per period
///
/// Runs until the job interrupts it, which happens when the scope ends or
/// an interrupt message arrives.
pub struct TickService<C: Clock> {
    capability: Capability,
    clock: C,
}

impl<C: Clock> TickService<C> {
    pub fn new(registry: Arc<Registry>, label: &str, clock: C) -> Result<Self, ParseError> {
        let mut capability = Capability::new(VERB_MEASURE, registry);
        capability.set_label(label);
        capability.set_when(When::now_to_future().with_period(TimeDelta::seconds(1)));
        capability.add_result_column("time")?;
        capability.add_result_column("packets")?;
        Ok(Self { capability, clock })
    }
}

#[async_trait]
impl<C: Clock> Service for TickService<C> {
    fn capability(&self) -> &Capability {
        &self.capability
    }

    async fn run(
        &self,
        specification: Specification,
        interrupt: InterruptFlag,
    ) -> Result<ResultStatement, ServiceError> {
        let period = specification
            .when()
            .period()
            .and_then(|p| p.to_std().ok())
            .filter(|p| !p.is_zero())
            .unwrap_or(DEFAULT_PERIOD);
        let step = TimeDelta::from_std(period)
            .map_err(|e| ServiceError::Failed(e.to_string()))?;

        let started = self.clock.now();
        let mut result = ResultStatement::from_specification(&specification);
        let mut tick = started;
        let mut row = 0;
        loop {
            result.set_result_value("time", row, Value::Time(tick))?;
            result.set_result_value("packets", row, Value::Natural(row as u64 + 1))?;
            row += 1;
            if interrupt.sleep(period).await {
                break;
            }
            tick += step;
        }

        result.set_when(When::range(started, tick));
        Ok(result)
    }
}
