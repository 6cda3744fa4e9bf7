// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service contract and cooperative interruption

use crate::error::ServiceError;
use async_trait::async_trait;
use mplane_core::{Capability, ResultStatement, Specification};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

/// Executes specifications against one fixed capability
///
/// `run` is invoked by one job at a time on its own task. Loops that could
/// run indefinitely must consult the interrupt flag and return whatever
/// partial result they have once it is raised.
#[async_trait]
pub trait Service: Send + Sync + 'static {
    fn capability(&self) -> &Capability;

    async fn run(
        &self,
        specification: Specification,
        interrupt: InterruptFlag,
    ) -> Result<ResultStatement, ServiceError>;
}

/// Fail fast if `specification` is not something `capability` can run
pub fn check_specification(
    capability: &Capability,
    specification: &Specification,
) -> Result<(), ServiceError> {
    if specification.schema_hash() != capability.schema_hash() {
        return Err(ServiceError::Mismatch(
            capability.label().map_or_else(|| capability.token(), str::to_string),
        ));
    }
    specification.validate()?;
    for parameter in specification.parameters() {
        let (Some(value), Some(offered)) = (
            parameter.value(),
            capability.parameter(parameter.name()),
        ) else {
            continue;
        };
        if !offered.constraint().met_by(value) {
            return Err(mplane_core::ValidationError::ConstraintViolation {
                name: parameter.name().to_string(),
                value: value.to_string(),
                constraint: offered.constraint().to_string(),
            }
            .into());
        }
    }
    Ok(())
}

#[derive(Debug, Default)]
struct Signal {
    raised: AtomicBool,
    notify: Notify,
}

/// Cancellation flag shared between a job, its timers and its service
///
/// Raising is sticky. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag {
    signal: Arc<Signal>,
}

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.signal.raised.store(true, Ordering::SeqCst);
        self.signal.notify.notify_waiters();
    }

    pub fn is_raised(&self) -> bool {
        self.signal.raised.load(Ordering::SeqCst)
    }

    /// Resolves once the flag is raised
    pub async fn raised(&self) {
        loop {
            // Register before checking so a concurrent raise is not missed
            let notified = self.signal.notify.notified();
            if self.is_raised() {
                return;
            }
            notified.await;
        }
    }

    /// Sleep unless interrupted; returns true if the flag was raised
    pub async fn sleep(&self, duration: Duration) -> bool {
        self.sleep_until(Instant::now() + duration).await
    }

    pub async fn sleep_until(&self, deadline: Instant) -> bool {
        tokio::select! {
            _ = tokio::time::sleep_until(deadline) => self.is_raised(),
            _ = self.raised() => true,
        }
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
