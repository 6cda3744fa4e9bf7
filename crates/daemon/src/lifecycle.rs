// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup and shutdown.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use fs2::FileExt;
use mplane_core::{ParseError, Registries, SystemClock};
use mplane_engine::{Scheduler, SchedulerError};
use thiserror::Error;
use tokio::net::UnixListener;
use tracing::{info, warn};

use crate::config::{Config, ConfigError};
use crate::services;

/// Scheduler driven by the wall clock
pub type DaemonScheduler = Scheduler<SystemClock>;

/// Daemon state during operation
pub struct DaemonState {
    /// Configuration
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    /// Unix socket listener
    pub listener: UnixListener,
    /// Registries used to decode inbound messages
    pub registries: Registries,
    pub scheduler: Arc<DaemonScheduler>,
    /// When daemon started
    pub start_time: Instant,
}

impl DaemonState {
    /// Shutdown the daemon gracefully
    ///
    /// Running jobs are interrupted so cooperative services can return.
    pub async fn shutdown(&mut self) -> Result<(), LifecycleError> {
        info!("Shutting down daemon...");

        let interrupted = self.scheduler.interrupt_all();
        if interrupted > 0 {
            info!(interrupted, "Interrupted running jobs");
        }

        let socket_path = self.config.socket_path();
        if socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&socket_path) {
                warn!("Failed to remove socket file: {}", e);
            }
        }

        let lock_path = self.config.lock_path();
        if lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&lock_path) {
                warn!("Failed to remove PID file: {}", e);
            }
        }

        info!(
            uptime_secs = self.start_time.elapsed().as_secs(),
            "Daemon shutdown complete"
        );
        Ok(())
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Could not determine log directory")]
    NoLogDir,

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Registry error: {0}")]
    Registry(#[from] ParseError),

    #[error("Service error: {0}")]
    Service(#[from] SchedulerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start the daemon
pub async fn startup(config: &Config) -> Result<DaemonState, LifecycleError> {
    match startup_inner(config).await {
        Ok(state) => Ok(state),
        Err(e) => {
            // Clean up any resources created before failure, unless they
            // belong to a daemon that is already running
            if !matches!(e, LifecycleError::LockFailed(_)) {
                cleanup_on_failure(config);
            }
            Err(e)
        }
    }
}

/// Inner startup logic - cleanup_on_failure called if this fails
async fn startup_inner(config: &Config) -> Result<DaemonState, LifecycleError> {
    // 1. Create state directory (needed for socket, lock, etc.)
    std::fs::create_dir_all(&config.component.state_dir)?;

    // 2. Acquire lock file FIRST - prevents races
    let lock_file = File::create(config.lock_path())?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;

    // Write PID to lock file
    use std::io::Write;
    let mut lock_file = lock_file;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    // 3. Load registries and build services BEFORE binding the socket
    let registries = Registries::new()?;
    if let Some(file) = &config.registry.file {
        let extra = registries.load_file(file)?;
        info!(uri = extra.uri(), elements = extra.len(), "Loaded registry");
    }
    let registry = registries.get(&config.registry.uri)?;

    let authorizer = Arc::new(config.authorization.authorizer());
    let scheduler = Arc::new(Scheduler::new(SystemClock, authorizer));
    for service in &config.services {
        scheduler.add_service(services::build(service, Arc::clone(&registry), SystemClock)?)?;
    }

    info!(
        "Loaded {} services from registry {}",
        config.services.len(),
        registry.uri()
    );

    // 4. Remove stale socket and bind (LAST - only after all validation passes)
    let socket_path = config.socket_path();
    if let Some(parent) = socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if socket_path.exists() {
        std::fs::remove_file(&socket_path)?;
    }
    let listener = UnixListener::bind(&socket_path)
        .map_err(|e| LifecycleError::BindFailed(socket_path.clone(), e))?;

    info!("Daemon started in {}", config.component.state_dir.display());

    Ok(DaemonState {
        config: config.clone(),
        lock_file,
        listener,
        registries,
        scheduler,
        start_time: Instant::now(),
    })
}

/// Clean up resources on startup failure
fn cleanup_on_failure(config: &Config) {
    let socket_path = config.socket_path();
    if socket_path.exists() {
        let _ = std::fs::remove_file(&socket_path);
    }

    let lock_path = config.lock_path();
    if lock_path.exists() {
        let _ = std::fs::remove_file(&lock_path);
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
