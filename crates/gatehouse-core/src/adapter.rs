//! Data adapter seam.
//!
//! The MCP tool dispatcher talks to the database only through [`DataAdapter`],
//! so tests can swap in a double and the Postgres adapter owns pooling.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One column as reported by schema discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

/// One table and its columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    pub name: String,
    pub schema: String,
    pub columns: Vec<ColumnInfo>,
}

/// Outcome of a statement run through the privileged execute path.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecuteOutcome {
    /// The statement returned rows.
    Rows(Vec<serde_json::Value>),
    /// The statement modified data and returned no rows.
    Affected(u64),
}

#[async_trait]
pub trait DataAdapter: Send + Sync {
    /// List tables and columns visible to the gateway.
    async fn list_tables(&self) -> anyhow::Result<Vec<TableInfo>>;

    /// Run a single read-only statement and return its rows as JSON objects.
    ///
    /// Implementations must refuse stacked statements and writes.
    async fn query(&self, sql: &str) -> anyhow::Result<Vec<serde_json::Value>>;

    /// Run a single statement that may modify data. Rows it returns (e.g. via
    /// `RETURNING`) are kept.
    async fn execute(&self, sql: &str) -> anyhow::Result<ExecuteOutcome>;

    /// Release pooled resources. Called once on shutdown.
    async fn close(&self) {}
}
