// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Component configuration file

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use mplane_core::CORE_REGISTRY_URI;
use mplane_engine::RoleAuthorizer;
use serde::Deserialize;
use thiserror::Error;

/// Default configuration file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "mplane.toml";

/// Top-level `mplane.toml`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub component: ComponentConfig,
    pub registry: RegistryConfig,
    pub authorization: AuthorizationConfig,
    #[serde(rename = "service")]
    pub services: Vec<ServiceConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComponentConfig {
    /// Directory holding the lock, socket and log files
    pub state_dir: PathBuf,
    pub socket: PathBuf,
    pub log: PathBuf,
    /// How long a client may take to send its request or read the reply
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for ComponentConfig {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from("."),
            socket: PathBuf::from("mplane.sock"),
            log: PathBuf::from("mplaned.log"),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Registry used for the built-in services' capabilities
    pub uri: String,
    /// Extra registry document loaded at startup
    pub file: Option<PathBuf>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            uri: CORE_REGISTRY_URI.to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultDecision {
    #[default]
    Allow,
    Deny,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthorizationConfig {
    pub default: DefaultDecision,
    /// Role name to member identities
    pub roles: BTreeMap<String, Vec<String>>,
    /// Capability label to the roles allowed to use it
    pub capabilities: BTreeMap<String, Vec<String>>,
}

impl AuthorizationConfig {
    pub fn authorizer(&self) -> RoleAuthorizer {
        let mut authz = RoleAuthorizer::new(self.default == DefaultDecision::Allow);
        for (role, members) in &self.roles {
            authz.add_role(role, members.iter().cloned());
        }
        for (label, roles) in &self.capabilities {
            authz.restrict(label, roles.iter().cloned());
        }
        authz
    }
}

/// Built-in reference services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    Clock,
    Tick,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    pub kind: ServiceKind,
    pub label: Option<String>,
}

impl Config {
    /// Read and parse a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn socket_path(&self) -> PathBuf {
        self.in_state_dir(&self.component.socket)
    }

    pub fn log_path(&self) -> PathBuf {
        self.in_state_dir(&self.component.log)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.component.state_dir.join("mplaned.pid")
    }

    fn in_state_dir(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.component.state_dir.join(path)
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {0}: {1}")]
    Read(PathBuf, std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
