//! # gatehouse-mcp
//!
//! MCP (Model Context Protocol) surface of Gatehouse: three database tools
//! exposed to an authenticated identity.
//!
//! | Tool | Exposed to | Behaviour |
//! |------|------------|-----------|
//! | `listTables` | every identity | Schema discovery (tables, columns, types) |
//! | `queryDatabase` | every identity | Read-only statements; writes are refused |
//! | `executeDatabase` | privileged identities | Reads and writes |
//!
//! Every statement passes the `gatehouse-policy` gate before it reaches the
//! [`DataAdapter`](gatehouse_core::DataAdapter). Failures never escape a tool
//! call: they come back as results with `isError: true`.
//!
//! ```text
//! POST /mcp (JSON-RPC)
//!       │  Identity attached by the server's bearer middleware
//!       ▼
//! ┌──────────────────┐
//! │ McpSession       │  initialize / tools/list / tools/call
//! │  ToolDispatcher  │  ← AccessPolicy decides the tool set
//! │   1. gate SQL    │  ← gatehouse-policy
//! │   2. run         │  ← DataAdapter
//! │   3. sanitize    │  ← format_database_error
//! └──────────────────┘
//! ```

pub mod dispatcher;
pub mod error;
pub mod http_transport;
pub mod protocol;
pub mod server;
pub mod tools;

pub use dispatcher::{ToolDispatcher, EXECUTE_DATABASE, LIST_TABLES, QUERY_DATABASE};
pub use error::McpError;
pub use http_transport::{create_router, McpState};
pub use protocol::{
    CallToolParams, CallToolResult, JsonRpcRequest, JsonRpcResponse, ToolAnnotations,
    ToolContent, ToolDefinition,
};
pub use server::McpSession;
pub use tools::ToolRegistry;
