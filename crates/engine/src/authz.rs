// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authorization of callers against capabilities

use std::collections::{HashMap, HashSet};

/// Decides whether `identity` may use the capability labelled
/// `capability_label`
pub trait Authorizer: Send + Sync + 'static {
    fn authorize(&self, capability_label: &str, identity: &str) -> bool;
}

/// Lets everyone use everything
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn authorize(&self, _capability_label: &str, _identity: &str) -> bool {
        true
    }
}

/// Role-based policy
///
/// Identities belong to roles; a capability label lists the roles allowed
/// to use it. Labels with no rule fall back to the default decision.
#[derive(Debug, Clone, Default)]
pub struct RoleAuthorizer {
    default_allow: bool,
    roles: HashMap<String, HashSet<String>>,
    capabilities: HashMap<String, HashSet<String>>,
}

impl RoleAuthorizer {
    pub fn new(default_allow: bool) -> Self {
        Self {
            default_allow,
            ..Self::default()
        }
    }

    /// Add identities to a role
    pub fn add_role<I, S>(&mut self, role: &str, identities: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles
            .entry(role.to_string())
            .or_default()
            .extend(identities.into_iter().map(Into::into));
    }

    /// Restrict a capability label to the given roles
    pub fn restrict<I, S>(&mut self, capability_label: &str, roles: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities
            .entry(capability_label.to_string())
            .or_default()
            .extend(roles.into_iter().map(Into::into));
    }
}

impl Authorizer for RoleAuthorizer {
    fn authorize(&self, capability_label: &str, identity: &str) -> bool {
        let Some(allowed) = self.capabilities.get(capability_label) else {
            return self.default_allow;
        };
        allowed.iter().any(|role| {
            self.roles
                .get(role)
                .is_some_and(|members| members.contains(identity))
        })
    }
}
