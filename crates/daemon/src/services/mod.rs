// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Built-in reference services

mod clock;
mod tick;

pub use clock::ClockService;
pub use tick::TickService;

use std::sync::Arc;

use mplane_core::{Clock, ParseError, Registry};
use mplane_engine::{Service, TracedService};

use crate::config::{ServiceConfig, ServiceKind};

/// Build the configured service, wrapped with tracing
pub fn build<C: Clock>(
    config: &ServiceConfig,
    registry: Arc<Registry>,
    clock: C,
) -> Result<Arc<dyn Service>, ParseError> {
    let service: Arc<dyn Service> = match config.kind {
        ServiceKind::Clock => {
            let label = config.label.as_deref().unwrap_or("clock");
            Arc::new(TracedService::new(ClockService::new(registry, label, clock)?))
        }
        ServiceKind::Tick => {
            let label = config.label.as_deref().unwrap_or("tick");
            Arc::new(TracedService::new(TickService::new(registry, label, clock)?))
        }
    };
    Ok(service)
}
