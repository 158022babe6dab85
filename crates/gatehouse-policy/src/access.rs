//! Privilege decisions.
//!
//! The decision is derived per request from the session identity; nothing is
//! stored.

use gatehouse_core::config::AccessConfig;
use gatehouse_core::Identity;
use serde::Serialize;
use std::collections::HashSet;

/// What an identity may do with the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    /// Schema discovery and read-only queries.
    ReadOnly,
    /// Everything in `ReadOnly` plus write-capable execution.
    ReadWrite,
}

/// Allow-list of privileged login handles, injected at construction time.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    privileged: HashSet<String>,
}

impl AccessPolicy {
    pub fn new<I, S>(privileged: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            privileged: privileged.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &AccessConfig) -> Self {
        Self::new(config.privileged_users.iter().cloned())
    }

    /// Exact match on the upstream login handle.
    pub fn is_privileged(&self, identity: &Identity) -> bool {
        self.privileged.contains(&identity.login)
    }

    pub fn decide(&self, identity: &Identity) -> AccessLevel {
        if self.is_privileged(identity) {
            AccessLevel::ReadWrite
        } else {
            AccessLevel::ReadOnly
        }
    }
}
