//! Per-session tool set.
//!
//! Exposure is the first privilege gate: a tool missing from a session's set
//! cannot be listed or called through that session.

use crate::protocol::ToolDefinition;
use std::collections::BTreeMap;

/// Tools one session exposes, keyed and listed by name.
#[derive(Clone, Debug, Default)]
pub struct ToolRegistry {
    by_name: BTreeMap<String, ToolDefinition>,
}

impl ToolRegistry {
    /// Later definitions with a repeated name replace earlier ones.
    pub fn with_tools(tools: impl IntoIterator<Item = ToolDefinition>) -> Self {
        Self {
            by_name: tools.into_iter().map(|t| (t.name.clone(), t)).collect(),
        }
    }

    pub fn exposes(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn definition(&self, name: &str) -> Option<&ToolDefinition> {
        self.by_name.get(name)
    }

    /// Definitions in name order, as returned by `tools/list`.
    pub fn definitions(&self) -> Vec<&ToolDefinition> {
        self.by_name.values().collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.by_name.keys().map(String::as_str).collect()
    }

    pub fn count(&self) -> usize {
        self.by_name.len()
    }
}
