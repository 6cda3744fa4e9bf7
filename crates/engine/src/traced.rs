// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced service wrapper for consistent observability

use crate::error::ServiceError;
use crate::service::{InterruptFlag, Service};
use async_trait::async_trait;
use mplane_core::{Capability, ResultStatement, Specification};
use tracing::Instrument;

/// Wrapper that adds tracing to any Service
#[derive(Clone)]
pub struct TracedService<S> {
    inner: S,
}

impl<S> TracedService<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: Service> Service for TracedService<S> {
    fn capability(&self) -> &Capability {
        self.inner.capability()
    }

    async fn run(
        &self,
        specification: Specification,
        interrupt: InterruptFlag,
    ) -> Result<ResultStatement, ServiceError> {
        let capability = self.inner.capability();
        let span = tracing::info_span!(
            "service.run",
            capability = capability.label().unwrap_or_default(),
            verb = capability.verb(),
        );

        async move {
            tracing::info!(when = %specification.when(), "starting");

            let start = std::time::Instant::now();
            let result = self.inner.run(specification, interrupt.clone()).await;
            let elapsed = start.elapsed();

            match &result {
                Ok(statement) => tracing::info!(
                    rows = statement.count_result_rows(),
                    interrupted = interrupt.is_raised(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "finished"
                ),
                Err(e) => tracing::error!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "run failed"
                ),
            }

            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
