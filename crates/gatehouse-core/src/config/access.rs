//! Privileged identity allow-list.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Upstream login handles allowed to run write-capable tools.
    #[serde(default)]
    pub privileged_users: Vec<String>,
}
