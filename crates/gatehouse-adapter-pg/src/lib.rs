use async_trait::async_trait;
use gatehouse_core::config::DatabaseConfig;
use gatehouse_core::{DataAdapter, ExecuteOutcome, TableInfo};
use serde_json::{json, Value};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{Column, PgPool, Row};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;

pub mod introspect;

/// Shared, lazily-created connection pool.
///
/// The first caller of [`PoolHandle::get`] connects; concurrent first callers
/// wait on the same initialisation and every later caller reuses the pool.
/// [`PoolHandle::close`] is the single teardown point.
pub struct PoolHandle {
    config: DatabaseConfig,
    pool: OnceCell<PgPool>,
}

impl PoolHandle {
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            pool: OnceCell::new(),
        }
    }

    /// Get the pool, creating it on first use.
    pub async fn get(&self) -> Result<&PgPool, sqlx::Error> {
        self.pool
            .get_or_try_init(|| async {
                tracing::info!(
                    max_connections = self.config.max_connections,
                    "creating Postgres connection pool"
                );
                PgPoolOptions::new()
                    .max_connections(self.config.max_connections)
                    .acquire_timeout(self.config.connect_timeout())
                    .idle_timeout(self.config.idle_timeout())
                    .connect(&self.config.url)
                    .await
            })
            .await
    }

    pub fn is_initialized(&self) -> bool {
        self.pool.initialized()
    }

    /// Close the pool if it was ever created.
    pub async fn close(&self) {
        if let Some(pool) = self.pool.get() {
            pool.close().await;
            tracing::info!("Postgres connection pool closed");
        }
    }
}

/// [`DataAdapter`] over a shared [`PoolHandle`].
pub struct PostgresAdapter {
    pool: Arc<PoolHandle>,
}

impl PostgresAdapter {
    pub fn new(pool: Arc<PoolHandle>) -> Self {
        Self { pool }
    }

    pub fn from_config(config: DatabaseConfig) -> Self {
        Self::new(Arc::new(PoolHandle::new(config)))
    }
}

#[async_trait]
impl DataAdapter for PostgresAdapter {
    async fn list_tables(&self) -> anyhow::Result<Vec<TableInfo>> {
        let started = Instant::now();
        let pool = self.pool.get().await?;
        let tables = introspect::list_public_tables(pool).await?;
        tracing::info!(
            tables = tables.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "schema discovery completed"
        );
        Ok(tables)
    }

    async fn query(&self, sql: &str) -> anyhow::Result<Vec<Value>> {
        let started = Instant::now();
        let pool = self.pool.get().await?;
        // Extended protocol: Postgres refuses more than one command per statement.
        // The read-only transaction turns any write that slipped past the gate
        // into a database error.
        let mut tx = pool.begin().await?;
        sqlx::query("SET TRANSACTION READ ONLY")
            .execute(&mut *tx)
            .await?;
        let rows = sqlx::query(sql).fetch_all(&mut *tx).await?;
        tx.commit().await?;
        let data: Vec<Value> = rows.iter().map(row_to_json).collect();
        tracing::info!(
            rows = data.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "query completed"
        );
        Ok(data)
    }

    async fn execute(&self, sql: &str) -> anyhow::Result<ExecuteOutcome> {
        let started = Instant::now();
        let pool = self.pool.get().await?;

        // Writes report affected rows unless they return rows themselves.
        let outcome = if is_data_modifying(sql) && !has_returning_clause(sql) {
            let done = sqlx::query(sql).execute(pool).await?;
            ExecuteOutcome::Affected(done.rows_affected())
        } else {
            let rows = sqlx::query(sql).fetch_all(pool).await?;
            ExecuteOutcome::Rows(rows.iter().map(row_to_json).collect())
        };

        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "execute completed"
        );
        Ok(outcome)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Leading-keyword check used to choose between `execute` and `fetch_all`.
fn is_data_modifying(sql: &str) -> bool {
    let first = sql
        .trim_start()
        .split(|c: char| c.is_whitespace() || c == '(' || c == ';')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    !matches!(first.as_str(), "select" | "with" | "show" | "explain" | "values" | "table")
}

fn has_returning_clause(sql: &str) -> bool {
    sql.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .any(|word| word.eq_ignore_ascii_case("returning"))
}

/// Convert a row to a JSON object, best-effort per column type.
fn row_to_json(row: &PgRow) -> Value {
    let mut obj = serde_json::Map::new();

    for col in row.columns() {
        let name = col.name();
        let idx = col.ordinal();

        let value: Value = if let Ok(v) = row.try_get::<Option<i64>, _>(idx) {
            json!(v)
        } else if let Ok(v) = row.try_get::<Option<i32>, _>(idx) {
            json!(v)
        } else if let Ok(v) = row.try_get::<Option<i16>, _>(idx) {
            json!(v)
        } else if let Ok(v) = row.try_get::<Option<f64>, _>(idx) {
            json!(v)
        } else if let Ok(v) = row.try_get::<Option<f32>, _>(idx) {
            json!(v)
        } else if let Ok(v) = row.try_get::<Option<bool>, _>(idx) {
            json!(v)
        } else if let Ok(v) = row.try_get::<Option<String>, _>(idx) {
            json!(v)
        } else if let Ok(v) = row.try_get::<Option<Value>, _>(idx) {
            v.unwrap_or(Value::Null)
        } else if let Ok(v) = row.try_get::<Option<uuid::Uuid>, _>(idx) {
            json!(v.map(|u| u.to_string()))
        } else if let Ok(v) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(idx) {
            json!(v.map(|t| t.to_rfc3339()))
        } else if let Ok(v) = row.try_get::<Option<chrono::NaiveDateTime>, _>(idx) {
            json!(v.map(|t| t.to_string()))
        } else if let Ok(v) = row.try_get::<Option<chrono::NaiveDate>, _>(idx) {
            json!(v.map(|d| d.to_string()))
        } else {
            Value::Null
        };

        obj.insert(name.to_string(), value);
    }

    Value::Object(obj)
}
