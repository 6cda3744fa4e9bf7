// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job state machine
//!
//! A job is one execution of a specification against a service:
//!
//! ```text
//! Pending → Scheduled → Running → Completed
//!                    ↘          ↘ Failed
//! ```
//!
//! Terminal states are final. The reply seen by callers only ever moves
//! forward, from the receipt to the result (or exception).

use crate::error::ServiceError;
use crate::service::{check_specification, InterruptFlag, Service};
use chrono::{DateTime, Utc};
use mplane_core::{
    Clock, Envelope, EnvelopeKind, Exception, Message, Receipt, ResultStatement, Specification,
    When,
};
use std::any::Any;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::Instrument;

/// Exception text for specifications whose scope ended before they ran
pub const EXPIRED: &str = "specification temporal scope has already ended";

/// Lifecycle state of a job
#[derive(Debug, Clone, PartialEq)]
pub enum JobState {
    Pending,
    Scheduled,
    Running,
    Completed,
    Failed(Exception),
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed(_))
    }
}

struct Progress {
    state: JobState,
    results: Vec<ResultStatement>,
    last_polled: Option<Instant>,
    collected: bool,
}

/// One in-flight execution of a specification
pub struct Job {
    token: String,
    service: Arc<dyn Service>,
    specification: Specification,
    receipt: Receipt,
    interrupt: InterruptFlag,
    progress: Mutex<Progress>,
    changed: Notify,
}

impl Job {
    /// Create a pending job keyed by the specification's token
    pub fn new(service: Arc<dyn Service>, specification: Specification) -> Arc<Self> {
        let receipt = Receipt::new(&specification);
        Arc::new(Self {
            token: specification.token(),
            service,
            specification,
            receipt,
            interrupt: InterruptFlag::new(),
            progress: Mutex::new(Progress {
                state: JobState::Pending,
                results: Vec::new(),
                last_polled: None,
                collected: false,
            }),
            changed: Notify::new(),
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn specification(&self) -> &Specification {
        &self.specification
    }

    pub fn receipt(&self) -> &Receipt {
        &self.receipt
    }

    pub fn interrupt(&self) -> &InterruptFlag {
        &self.interrupt
    }

    pub fn state(&self) -> JobState {
        self.lock().state.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.lock().state.is_terminal()
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.lock().state, JobState::Failed(_))
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupt.is_raised()
    }

    pub fn results(&self) -> Vec<ResultStatement> {
        self.lock().results.clone()
    }

    /// Whether a terminal reply has been handed out
    ///
    /// Polls answered with the receipt, or with a partial envelope of a
    /// running series, do not count.
    pub fn was_collected(&self) -> bool {
        self.lock().collected
    }

    pub fn last_polled(&self) -> Option<Instant> {
        self.lock().last_polled
    }

    /// Resolves once the job reaches a terminal state
    pub async fn finished(&self) {
        loop {
            let notified = self.changed.notified();
            if self.is_finished() {
                return;
            }
            notified.await;
        }
    }

    /// Current reply for this job
    ///
    /// The exception if it failed, the result if it completed, otherwise
    /// the receipt. A repeated job answers with an envelope of the results
    /// gathered so far once there is at least one.
    pub fn get_reply(&self) -> Message {
        let mut progress = self.lock();
        progress.last_polled = Some(Instant::now());
        if progress.state.is_terminal() {
            progress.collected = true;
        }
        match &progress.state {
            JobState::Failed(exception) => Message::Exception(exception.clone()),
            state
                if self.specification.when().is_repeated()
                    && (state.is_terminal() || !progress.results.is_empty()) =>
            {
                let contents = progress
                    .results
                    .iter()
                    .cloned()
                    .map(Message::Result)
                    .collect();
                Message::Envelope(Envelope::with_contents(EnvelopeKind::Message, contents))
            }
            JobState::Completed => match progress.results.first() {
                Some(result) => Message::Result(result.clone()),
                None => Message::Receipt(self.receipt.clone()),
            },
            _ => Message::Receipt(self.receipt.clone()),
        }
    }

    /// Arm the job's timers and start it when its scope begins
    ///
    /// Queries run at once. A scope that has already ended fails the job.
    /// Must be called from within a Tokio runtime.
    pub fn schedule<C: Clock>(self: &Arc<Self>, clock: &C) {
        if self.lock().state != JobState::Pending {
            return;
        }

        if self.specification.is_query() {
            self.transition(JobState::Scheduled);
            tracing::info!(token = %self.token, "running query");
            let job = Arc::clone(self);
            let clock = clock.clone();
            tokio::spawn(async move { job.run_single(clock).await });
            return;
        }

        let tzero = clock.now();
        let when = self.specification.when();
        let (start_delay, end_delay) = when.timer_delays(tzero);
        let Some(start_delay) = start_delay else {
            tracing::warn!(token = %self.token, %when, "temporal scope already ended");
            self.fail(EXPIRED.to_string());
            return;
        };

        self.transition(JobState::Scheduled);
        tracing::info!(
            token = %self.token,
            %when,
            start_delay_ms = start_delay.as_millis() as u64,
            end_delay_ms = end_delay.map(|d| d.as_millis() as u64),
            "job scheduled"
        );

        if let Some(end_delay) = end_delay {
            let job = Arc::clone(self);
            tokio::spawn(async move {
                tokio::select! {
                    _ = tokio::time::sleep(end_delay) => {
                        tracing::debug!(token = %job.token, "end of scope, interrupting");
                        job.interrupt.raise();
                    }
                    _ = job.finished() => {}
                }
            });
        }

        let job = Arc::clone(self);
        let clock = clock.clone();
        if when.is_repeated() {
            tokio::spawn(async move { job.run_series(clock, tzero).await });
        } else {
            tokio::spawn(async move {
                tokio::time::sleep(start_delay).await;
                job.run_single(clock).await;
            });
        }
    }

    async fn run_single<C: Clock>(self: Arc<Self>, clock: C) {
        let outcome = self
            .execute(self.specification.clone(), self.interrupt.clone(), &clock)
            .await;
        match outcome {
            Ok(result) => self.complete(result),
            Err(message) => self.fail(message),
        }
    }

    /// Walk the occurrences of a repeated scope, one run per occurrence
    async fn run_series<C: Clock>(self: Arc<Self>, clock: C, tzero: DateTime<Utc>) {
        let base = tokio::time::Instant::now();
        for occurrence in self.specification.when().occurrences(tzero) {
            let (start, _) = occurrence.datetimes(tzero);
            let offset = start
                .and_then(|s| (s - tzero).to_std().ok())
                .unwrap_or_default();
            if self.interrupt.sleep_until(base + offset).await {
                break;
            }

            let (_, end_delay) = occurrence.timer_delays(start.unwrap_or(tzero));
            let flag = InterruptFlag::new();
            let timer = self.occurrence_timer(flag.clone(), end_delay);
            tracing::debug!(token = %self.token, %occurrence, "starting occurrence");
            let specification = self.specification.for_occurrence(occurrence);
            let outcome = self.execute(specification, flag, &clock).await;
            timer.abort();

            match outcome {
                Ok(result) => self.push_result(result),
                Err(message) => {
                    self.fail(message);
                    return;
                }
            }
            if self.interrupt.is_raised() {
                break;
            }
        }
        self.transition(JobState::Completed);
        tracing::info!(token = %self.token, runs = self.lock().results.len(), "series completed");
    }

    /// Interrupts one occurrence when the job is interrupted or the
    /// occurrence's own scope ends
    fn occurrence_timer(
        &self,
        flag: InterruptFlag,
        end_delay: Option<Duration>,
    ) -> JoinHandle<()> {
        let parent = self.interrupt.clone();
        tokio::spawn(async move {
            match end_delay {
                Some(delay) => {
                    tokio::select! {
                        _ = parent.raised() => {}
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                None => parent.raised().await,
            }
            flag.raise();
        })
    }

    async fn execute<C: Clock>(
        &self,
        specification: Specification,
        interrupt: InterruptFlag,
        clock: &C,
    ) -> Result<ResultStatement, String> {
        check_specification(self.service.capability(), &specification)
            .map_err(|e| e.to_string())?;
        self.transition(JobState::Running);

        let started = clock.now();
        let service = Arc::clone(&self.service);
        let span = tracing::info_span!("job", token = %self.token);
        let run = async move { service.run(specification, interrupt).await }.instrument(span);

        // Run on its own task so a panicking service only fails this job
        let outcome = match tokio::spawn(run).await {
            Ok(outcome) => outcome.map_err(|e| e.to_string()),
            Err(e) if e.is_panic() => {
                Err(ServiceError::Panicked(panic_message(e.into_panic())).to_string())
            }
            Err(e) => Err(e.to_string()),
        };

        let mut result = outcome?;
        result.set_token(self.token.clone());
        if !result.when().is_definite() {
            result.set_when(When::range(started, clock.now()));
        }
        Ok(result)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Progress> {
        self.progress.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn transition(&self, state: JobState) {
        let terminal = state.is_terminal();
        {
            let mut progress = self.lock();
            if progress.state.is_terminal() {
                return;
            }
            progress.state = state;
        }
        if terminal {
            self.changed.notify_waiters();
        }
    }

    fn push_result(&self, result: ResultStatement) {
        let mut progress = self.lock();
        if !progress.state.is_terminal() {
            progress.results.push(result);
        }
    }

    fn complete(&self, result: ResultStatement) {
        let rows = result.count_result_rows();
        {
            let mut progress = self.lock();
            if progress.state.is_terminal() {
                return;
            }
            progress.results.push(result);
            progress.state = JobState::Completed;
        }
        tracing::info!(token = %self.token, rows, "job completed");
        self.changed.notify_waiters();
    }

    fn fail(&self, message: String) {
        {
            let mut progress = self.lock();
            if progress.state.is_terminal() {
                return;
            }
            let exception = Exception::for_token(self.token.clone(), message.clone());
            progress.state = JobState::Failed(exception);
        }
        tracing::error!(token = %self.token, error = %message, "job failed");
        self.changed.notify_waiters();
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        return (*s).to_string();
    }
    if let Some(s) = payload.downcast_ref::<String>() {
        return s.clone();
    }
    "unknown panic".to_string()
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
