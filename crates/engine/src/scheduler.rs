// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Routes inbound messages to services and tracks in-flight jobs

use crate::authz::Authorizer;
use crate::error::SchedulerError;
use crate::job::{Job, EXPIRED};
use crate::service::{check_specification, Service};
use indexmap::IndexMap;
use mplane_core::{Capability, Clock, Exception, Message, Specification, Withdrawal};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

pub const UNKNOWN_JOB: &str = "unknown job";
pub const UNEXPECTED_MESSAGE: &str = "unexpected message type";
pub const NO_SERVICE: &str = "no service registered for specification";
pub const NOT_AUTHORIZED: &str = "not authorized";

#[derive(Default)]
struct Services {
    list: Vec<Arc<dyn Service>>,
    catalog: IndexMap<String, Capability>,
}

/// Component-side scheduler
///
/// Holds the registered services and the in-flight job table. Jobs are
/// keyed by specification token so identical requests share one job.
pub struct Scheduler<C: Clock> {
    clock: C,
    authorizer: Arc<dyn Authorizer>,
    services: Mutex<Services>,
    jobs: Mutex<HashMap<String, Arc<Job>>>,
}

impl<C: Clock> Scheduler<C> {
    pub fn new(clock: C, authorizer: Arc<dyn Authorizer>) -> Self {
        Self {
            clock,
            authorizer,
            services: Mutex::new(Services::default()),
            jobs: Mutex::new(HashMap::new()),
        }
    }

    /// Register a service and add its capability to the catalog
    pub fn add_service(&self, service: Arc<dyn Service>) -> Result<(), SchedulerError> {
        let capability = service.capability().clone();
        capability.validate()?;
        let token = capability.token();

        let mut services = self.services();
        if services.catalog.contains_key(&token) {
            return Err(SchedulerError::DuplicateCapability { token });
        }
        tracing::info!(
            %token,
            label = capability.label().unwrap_or_default(),
            verb = capability.verb(),
            "service registered"
        );
        services.catalog.insert(token, capability);
        services.list.push(service);
        Ok(())
    }

    /// Catalog of capabilities in registration order
    pub fn capabilities(&self) -> Vec<Capability> {
        self.services().catalog.values().cloned().collect()
    }

    pub fn capability(&self, token: &str) -> Option<Capability> {
        self.services().catalog.get(token).cloned()
    }

    /// Remove a service, returning the withdrawal to announce
    pub fn withdraw(&self, token: &str) -> Option<Withdrawal> {
        let mut services = self.services();
        let capability = services.catalog.shift_remove(token)?;
        services
            .list
            .retain(|service| service.capability().token() != token);
        tracing::info!(%token, "service withdrawn");
        Some(Withdrawal::new(&capability))
    }

    pub fn job(&self, token: &str) -> Option<Arc<Job>> {
        self.jobs().get(token).cloned()
    }

    pub fn job_count(&self) -> usize {
        self.jobs().len()
    }

    /// Drop finished jobs whose reply has been collected
    pub fn prune_finished(&self) -> usize {
        let mut jobs = self.jobs();
        let before = jobs.len();
        jobs.retain(|_, job| !(job.is_finished() && job.was_collected()));
        let pruned = before - jobs.len();
        if pruned > 0 {
            tracing::debug!(pruned, remaining = jobs.len(), "pruned finished jobs");
        }
        pruned
    }

    /// Raise the interrupt on every unfinished job
    pub fn interrupt_all(&self) -> usize {
        let jobs = self.jobs();
        let mut interrupted = 0;
        for job in jobs.values().filter(|job| !job.is_finished()) {
            job.interrupt().raise();
            interrupted += 1;
        }
        interrupted
    }

    /// Handle one message from `identity` and produce the reply
    pub fn receive_message(&self, identity: &str, message: Message) -> Message {
        match message {
            Message::Specification(specification) => self.submit_job(identity, specification),
            Message::Redemption(redemption) => match self.job(redemption.token()) {
                Some(job) => job.get_reply(),
                None => unknown_job(redemption.token()),
            },
            Message::Interrupt(interrupt) => match self.job(interrupt.token()) {
                Some(job) => {
                    tracing::info!(token = interrupt.token(), %identity, "interrupt requested");
                    job.interrupt().raise();
                    job.get_reply()
                }
                None => unknown_job(interrupt.token()),
            },
            other => {
                tracing::warn!(kind = other.kind(), %identity, "unexpected message");
                Message::Exception(Exception::new(other.token(), UNEXPECTED_MESSAGE))
            }
        }
    }

    /// Admit a specification, returning a receipt or an exception
    pub fn submit_job(&self, identity: &str, mut specification: Specification) -> Message {
        let tzero = self.clock.now();

        let Some(service) = self.route(&specification, tzero) else {
            tracing::warn!(token = %specification.token(), %identity, "no matching service");
            return reject(&specification, NO_SERVICE);
        };

        let capability = service.capability();
        let label = capability
            .label()
            .map_or_else(|| capability.token(), str::to_string);
        if !self.authorizer.authorize(&label, identity) {
            tracing::warn!(capability = %label, %identity, "not authorized");
            return reject(&specification, NOT_AUTHORIZED);
        }

        if let Err(e) = check_specification(capability, &specification) {
            tracing::warn!(error = %e, "invalid specification");
            return reject(&specification, e.to_string());
        }
        if !specification.is_query() && specification.when().is_expired(tzero) {
            tracing::warn!(when = %specification.when(), "scope already ended");
            return reject(&specification, EXPIRED);
        }

        if !specification.when().is_definite() {
            specification.retoken(tzero);
        }
        let token = specification.token();

        let mut jobs = self.jobs();
        if let Some(existing) = jobs.get(&token) {
            tracing::info!(%token, %identity, "joined existing job");
            return Message::Receipt(existing.receipt().clone());
        }

        let job = Job::new(service, specification);
        job.schedule(&self.clock);
        let receipt = job.receipt().clone();
        tracing::info!(%token, capability = %label, %identity, "job submitted");
        jobs.insert(token, job);
        Message::Receipt(receipt)
    }

    /// First registered service whose capability the specification fulfills
    fn route(
        &self,
        specification: &Specification,
        tzero: chrono::DateTime<chrono::Utc>,
    ) -> Option<Arc<dyn Service>> {
        self.services()
            .list
            .iter()
            .find(|service| specification.fulfills(service.capability(), tzero))
            .cloned()
    }

    fn services(&self) -> MutexGuard<'_, Services> {
        self.services.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn jobs(&self) -> MutexGuard<'_, HashMap<String, Arc<Job>>> {
        self.jobs.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn reject(specification: &Specification, message: impl Into<String>) -> Message {
    Message::Exception(Exception::for_token(specification.token(), message))
}

fn unknown_job(token: &str) -> Message {
    tracing::warn!(%token, "unknown job");
    Message::Exception(Exception::for_token(token, UNKNOWN_JOB))
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
