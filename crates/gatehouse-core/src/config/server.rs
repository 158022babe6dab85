//! HTTP server, cookie and grant settings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address, e.g. "0.0.0.0:8788".
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Externally visible base URL. The upstream redirect URI is `<base_url>/callback`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Name shown in the approval dialog.
    #[serde(default = "default_server_name")]
    pub server_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_description: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            base_url: default_base_url(),
            server_name: default_server_name(),
            server_description: None,
        }
    }
}

impl ServerConfig {
    /// Redirect URI registered with the upstream provider.
    pub fn callback_url(&self) -> String {
        format!("{}/callback", self.base_url.trim_end_matches('/'))
    }
}

fn default_bind() -> String {
    "0.0.0.0:8788".to_string()
}

fn default_base_url() -> String {
    "http://localhost:8788".to_string()
}

fn default_server_name() -> String {
    "Gatehouse".to_string()
}

/// Approval cookie settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CookieConfig {
    /// HMAC key for the approval cookie. Prefer `COOKIE_ENCRYPTION_KEY`.
    #[serde(default)]
    pub secret: String,
}

/// Lifetimes for grants minted after a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantConfig {
    #[serde(default = "default_code_ttl")]
    pub code_ttl_secs: u64,

    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
}

impl Default for GrantConfig {
    fn default() -> Self {
        Self {
            code_ttl_secs: default_code_ttl(),
            token_ttl_secs: default_token_ttl(),
        }
    }
}

fn default_code_ttl() -> u64 {
    600
}

fn default_token_ttl() -> u64 {
    3600
}
