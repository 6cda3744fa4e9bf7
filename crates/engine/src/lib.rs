// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mPlane component engine: services, jobs and the scheduler

mod authz;
mod error;
mod job;
mod scheduler;
mod service;
mod traced;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use authz::{AllowAll, Authorizer, RoleAuthorizer};
pub use error::{SchedulerError, ServiceError};
pub use job::{Job, JobState, EXPIRED};
pub use scheduler::{Scheduler, NOT_AUTHORIZED, NO_SERVICE, UNEXPECTED_MESSAGE, UNKNOWN_JOB};
pub use service::{check_specification, InterruptFlag, Service};
pub use traced::TracedService;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{Behaviour, FakeAuthorizer, FakeService};
