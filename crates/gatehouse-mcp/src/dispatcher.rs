//! Privilege-gated tool dispatcher.
//!
//! A dispatcher is built per request from the session [`Identity`]. Its
//! registry always carries `listTables` and `queryDatabase`; `executeDatabase`
//! is registered only for privileged identities. The execute path re-checks
//! the privilege decision so a direct call cannot bypass registration.

use crate::error::McpError;
use crate::protocol::{CallToolResult, ToolAnnotations, ToolDefinition};
use crate::tools::ToolRegistry;
use gatehouse_core::{DataAdapter, ExecuteOutcome, Identity};
use gatehouse_policy::{
    format_database_error, is_write_operation, validate_sql_query, AccessLevel, AccessPolicy,
    ValidationError,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;

pub const LIST_TABLES: &str = "listTables";
pub const QUERY_DATABASE: &str = "queryDatabase";
pub const EXECUTE_DATABASE: &str = "executeDatabase";

/// Runs database tools on behalf of one identity.
pub struct ToolDispatcher {
    identity: Identity,
    level: AccessLevel,
    adapter: Arc<dyn DataAdapter>,
    registry: ToolRegistry,
}

impl ToolDispatcher {
    pub fn new(identity: Identity, policy: &AccessPolicy, adapter: Arc<dyn DataAdapter>) -> Self {
        let level = policy.decide(&identity);
        let mut tools = vec![list_tables_tool(), query_database_tool()];
        if level == AccessLevel::ReadWrite {
            tools.push(execute_database_tool());
        }
        let registry = ToolRegistry::with_tools(tools);

        tracing::debug!(
            login = %identity.login,
            access = ?level,
            tools = registry.count(),
            "Built tool registry"
        );

        Self {
            identity,
            level,
            adapter,
            registry,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn access_level(&self) -> AccessLevel {
        self.level
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Dispatch a `tools/call`. Only unknown tools and malformed arguments are
    /// errors; everything else is reported inside the returned result.
    pub async fn call(&self, name: &str, arguments: &Value) -> Result<CallToolResult, McpError> {
        if !self.registry.exposes(name) {
            return Err(McpError::UnknownTool {
                name: name.to_string(),
            });
        }

        match name {
            LIST_TABLES => Ok(self.list_tables().await),
            QUERY_DATABASE => {
                let sql = sql_argument(name, arguments)?;
                Ok(self.query_database(sql).await)
            }
            EXECUTE_DATABASE => {
                let sql = sql_argument(name, arguments)?;
                Ok(self.execute_database(sql).await)
            }
            _ => Err(McpError::UnknownTool {
                name: name.to_string(),
            }),
        }
    }

    /// Schema discovery.
    pub async fn list_tables(&self) -> CallToolResult {
        let started = Instant::now();
        match self.adapter.list_tables().await {
            Ok(tables) => {
                tracing::info!(
                    login = %self.identity.login,
                    tool = LIST_TABLES,
                    tables = tables.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Listed tables"
                );
                let count = tables.len();
                CallToolResult::success(
                    format!("Found {count} tables in the database."),
                    Some(json!({ "tables": tables, "tableCount": count })),
                )
            }
            Err(err) => self.data_error(LIST_TABLES, &err),
        }
    }

    /// Read-only query. Write statements are refused before reaching the adapter.
    pub async fn query_database(&self, sql: &str) -> CallToolResult {
        if let Err(err) = validate_sql_query(sql) {
            return self.rejected(QUERY_DATABASE, &err);
        }
        if is_write_operation(sql) {
            return self.rejected(QUERY_DATABASE, &ValidationError::write_not_allowed(QUERY_DATABASE));
        }

        let started = Instant::now();
        match self.adapter.query(sql).await {
            Ok(rows) => {
                tracing::info!(
                    login = %self.identity.login,
                    tool = QUERY_DATABASE,
                    rows = rows.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Query executed"
                );
                rows_result("Query executed successfully.", rows)
            }
            Err(err) => self.data_error(QUERY_DATABASE, &err),
        }
    }

    /// Privileged execution of reads and writes.
    pub async fn execute_database(&self, sql: &str) -> CallToolResult {
        if self.level != AccessLevel::ReadWrite {
            return self.rejected(
                EXECUTE_DATABASE,
                &ValidationError::not_privileged(&self.identity.login),
            );
        }
        if let Err(err) = validate_sql_query(sql) {
            return self.rejected(EXECUTE_DATABASE, &err);
        }

        let write = is_write_operation(sql);
        let started = Instant::now();
        match self.adapter.execute(sql).await {
            Ok(outcome) => {
                tracing::info!(
                    login = %self.identity.login,
                    tool = EXECUTE_DATABASE,
                    write,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Statement executed"
                );
                match outcome {
                    ExecuteOutcome::Rows(rows) => {
                        rows_result("Statement executed successfully.", rows)
                    }
                    ExecuteOutcome::Affected(affected) => CallToolResult::success(
                        format!("Statement executed successfully. {affected} rows affected."),
                        Some(json!({ "rowsAffected": affected })),
                    ),
                }
            }
            Err(err) => self.data_error(EXECUTE_DATABASE, &err),
        }
    }

    fn rejected(&self, tool: &str, err: &ValidationError) -> CallToolResult {
        tracing::info!(
            login = %self.identity.login,
            tool,
            kind = ?err.kind,
            "Statement rejected"
        );
        CallToolResult::error(&err.message, None)
    }

    fn data_error(&self, tool: &str, err: &anyhow::Error) -> CallToolResult {
        // Raw driver text stays in the server log.
        tracing::warn!(login = %self.identity.login, tool, error = %err, "Database call failed");
        CallToolResult::error(format_database_error(err), None)
    }
}

fn rows_result(message: &str, rows: Vec<Value>) -> CallToolResult {
    let count = rows.len();
    CallToolResult::success(
        format!("{message} {count} rows returned."),
        Some(json!({ "rows": rows, "rowCount": count })),
    )
}

fn sql_argument<'a>(tool: &str, arguments: &'a Value) -> Result<&'a str, McpError> {
    arguments
        .get("sql")
        .and_then(Value::as_str)
        .ok_or_else(|| McpError::MissingArgument {
            tool: tool.to_string(),
            argument: "sql",
        })
}

fn sql_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "sql": {
                "type": "string",
                "description": description,
            }
        },
        "required": ["sql"],
    })
}

fn list_tables_tool() -> ToolDefinition {
    ToolDefinition {
        name: LIST_TABLES.to_string(),
        description: Some(
            "Get a list of all tables in the database along with their column information."
                .to_string(),
        ),
        input_schema: json!({ "type": "object", "properties": {} }),
        annotations: Some(ToolAnnotations {
            read_only_hint: Some(true),
            destructive_hint: Some(false),
        }),
    }
}

fn query_database_tool() -> ToolDefinition {
    ToolDefinition {
        name: QUERY_DATABASE.to_string(),
        description: Some(
            "Execute a read-only SQL query against the PostgreSQL database. \
             Write statements are rejected."
                .to_string(),
        ),
        input_schema: sql_schema("The SQL query to execute (SELECT statements only)"),
        annotations: Some(ToolAnnotations {
            read_only_hint: Some(true),
            destructive_hint: Some(false),
        }),
    }
}

fn execute_database_tool() -> ToolDefinition {
    ToolDefinition {
        name: EXECUTE_DATABASE.to_string(),
        description: Some(
            "Execute any SQL statement against the PostgreSQL database, including writes. \
             Only available to privileged users."
                .to_string(),
        ),
        input_schema: sql_schema("The SQL statement to execute"),
        annotations: Some(ToolAnnotations {
            read_only_hint: Some(false),
            destructive_hint: Some(true),
        }),
    }
}
