//! Upstream identity provider configuration.
//!
//! Defaults point at GitHub's OAuth app endpoints. The URLs are configurable so
//! GitHub Enterprise (or a local stub) can stand in.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// OAuth app client id. Prefer `GITHUB_CLIENT_ID`.
    #[serde(default)]
    pub client_id: String,

    /// OAuth app client secret. Prefer `GITHUB_CLIENT_SECRET`.
    #[serde(default)]
    pub client_secret: String,

    #[serde(default = "default_authorize_url")]
    pub authorize_url: String,

    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// Endpoint returning the authenticated user.
    #[serde(default = "default_user_url")]
    pub user_url: String,

    #[serde(default = "default_scope")]
    pub scope: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            authorize_url: default_authorize_url(),
            token_url: default_token_url(),
            user_url: default_user_url(),
            scope: default_scope(),
        }
    }
}

fn default_authorize_url() -> String {
    "https://github.com/login/oauth/authorize".to_string()
}

fn default_token_url() -> String {
    "https://github.com/login/oauth/access_token".to_string()
}

fn default_user_url() -> String {
    "https://api.github.com/user".to_string()
}

fn default_scope() -> String {
    "read:user".to_string()
}
