//! Errors that end a `tools/call` at the protocol level.
//!
//! Anything that happens once a tool runs is reported inside its result
//! instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum McpError {
    /// The tool does not exist or is not exposed to this identity.
    #[error("Tool not found: {name}")]
    UnknownTool { name: String },

    #[error("Invalid arguments for {tool}: missing string argument '{argument}'")]
    MissingArgument {
        tool: String,
        argument: &'static str,
    },
}

impl McpError {
    /// JSON-RPC "invalid params" for both cases.
    pub fn code(&self) -> i32 {
        match self {
            McpError::UnknownTool { .. } | McpError::MissingArgument { .. } => -32602,
        }
    }
}
