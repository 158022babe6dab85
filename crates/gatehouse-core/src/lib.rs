//! # gatehouse-core
//!
//! Types shared by every Gatehouse crate:
//!
//! - [`Identity`]: the upstream user attached to an MCP session
//! - [`AuthorizationRequest`]: the relying party's request, carried opaquely
//!   through the approval dialog and the upstream `state` parameter
//! - [`DataAdapter`]: the seam between the tool dispatcher and the database
//! - [`config`]: the TOML configuration loaded by the server binary

pub mod adapter;
pub mod config;

use serde::{Deserialize, Serialize};

pub use adapter::{ColumnInfo, DataAdapter, ExecuteOutcome, TableInfo};
pub use config::{ConfigError, GatehouseConfig, RegisteredClient};

/// User resolved from the upstream identity provider after code exchange.
///
/// Owned by the session; every tool invocation sees it read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Upstream login handle (e.g. GitHub `login`). Used for privilege decisions.
    pub login: String,
    /// Display name, falling back to the login when the upstream has none.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Upstream access token. Never serialized back to clients.
    #[serde(skip_serializing, default)]
    pub access_token: String,
}

/// The relying party's authorization request.
///
/// Created on `GET /authorize`, round-tripped base64-encoded through the
/// approval form and the upstream provider, consumed on `/callback`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationRequest {
    pub client_id: String,
    pub redirect_uri: String,
    #[serde(default)]
    pub scope: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_challenge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_challenge_method: Option<String>,
    #[serde(default = "default_response_type")]
    pub response_type: String,
}

fn default_response_type() -> String {
    "code".to_string()
}

impl AuthorizationRequest {
    /// Scope as the space-separated string used on the wire.
    pub fn scope_string(&self) -> String {
        self.scope.join(" ")
    }
}
