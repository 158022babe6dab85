//! Registered relying parties.

use serde::{Deserialize, Serialize};

/// A relying party allowed to request authorization.
///
/// The display fields are client-supplied text and are HTML-escaped wherever
/// they are rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredClient {
    pub client_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_uri: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_uri: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tos_uri: Option<String>,

    #[serde(default)]
    pub redirect_uris: Vec<String>,

    #[serde(default)]
    pub contacts: Vec<String>,
}

impl RegisteredClient {
    /// Name to show a user, falling back to the client id.
    pub fn display_name(&self) -> &str {
        self.client_name.as_deref().unwrap_or(&self.client_id)
    }

    /// Exact-match check against the registered redirect URIs.
    pub fn allows_redirect(&self, redirect_uri: &str) -> bool {
        self.redirect_uris.iter().any(|u| u == redirect_uri)
    }
}
