//! Configuration types for Gatehouse.
//!
//! Configuration is read from a single TOML file. Every section has defaults so
//! a minimal file only needs the secrets, and the secrets themselves may come
//! from the environment instead:
//!
//! | Setting | Environment variable |
//! |---------|----------------------|
//! | `upstream.client_id` | `GITHUB_CLIENT_ID` |
//! | `upstream.client_secret` | `GITHUB_CLIENT_SECRET` |
//! | `cookie.secret` | `COOKIE_ENCRYPTION_KEY` |
//! | `database.url` | `DATABASE_URL` |

pub mod access;
pub mod clients;
pub mod database;
pub mod server;
pub mod upstream;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use access::AccessConfig;
pub use clients::RegisteredClient;
pub use database::DatabaseConfig;
pub use server::{CookieConfig, GrantConfig, ServerConfig};
pub use upstream::UpstreamConfig;

/// Complete Gatehouse configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatehouseConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream OAuth identity provider.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Approval cookie signing.
    #[serde(default)]
    pub cookie: CookieConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    /// Which identities get the write-capable tool.
    #[serde(default)]
    pub access: AccessConfig,

    /// Lifetimes of minted authorization codes and bearer tokens.
    #[serde(default)]
    pub grants: GrantConfig,

    /// Relying parties allowed to start an authorization flow.
    #[serde(default)]
    pub clients: Vec<RegisteredClient>,
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A required setting is empty. Fatal at startup.
    #[error("missing required setting `{setting}` (set it in the config file or via {env})")]
    Missing {
        setting: &'static str,
        env: &'static str,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl GatehouseConfig {
    /// Load configuration from a TOML file, then apply environment overrides.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        let mut config = Self::from_toml(&content)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse configuration from TOML content.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }

    /// Overlay secrets from the environment. Non-empty values win over the file.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let set = |target: &mut String, key: &str| {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                *target = value;
            }
        };
        set(&mut self.upstream.client_id, "GITHUB_CLIENT_ID");
        set(&mut self.upstream.client_secret, "GITHUB_CLIENT_SECRET");
        set(&mut self.cookie.secret, "COOKIE_ENCRYPTION_KEY");
        set(&mut self.database.url, "DATABASE_URL");
    }

    /// Reject configurations the server must not start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cookie.secret.trim().is_empty() {
            return Err(ConfigError::Missing {
                setting: "cookie.secret",
                env: "COOKIE_ENCRYPTION_KEY",
            });
        }
        if self.upstream.client_id.trim().is_empty() {
            return Err(ConfigError::Missing {
                setting: "upstream.client_id",
                env: "GITHUB_CLIENT_ID",
            });
        }
        if self.upstream.client_secret.trim().is_empty() {
            return Err(ConfigError::Missing {
                setting: "upstream.client_secret",
                env: "GITHUB_CLIENT_SECRET",
            });
        }
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Missing {
                setting: "database.url",
                env: "DATABASE_URL",
            });
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Config(
                "database.max_connections must be at least 1".to_string(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for client in &self.clients {
            if client.client_id.trim().is_empty() {
                return Err(ConfigError::Config("client with empty client_id".to_string()));
            }
            if !seen.insert(client.client_id.as_str()) {
                return Err(ConfigError::Config(format!(
                    "client '{}' is registered twice",
                    client.client_id
                )));
            }
            if client.redirect_uris.is_empty() {
                return Err(ConfigError::Config(format!(
                    "client '{}' has no redirect_uris",
                    client.client_id
                )));
            }
        }

        Ok(())
    }
}
