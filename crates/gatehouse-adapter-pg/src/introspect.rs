use gatehouse_core::{ColumnInfo, TableInfo};
use sqlx::{PgPool, Row};
use std::collections::BTreeMap;

/// List every table in the `public` schema with its columns, in ordinal order.
pub async fn list_public_tables(pool: &PgPool) -> anyhow::Result<Vec<TableInfo>> {
    let rows = sqlx::query(
        r#"
        select c.table_schema, c.table_name, c.column_name, c.data_type,
               c.is_nullable, c.column_default
        from information_schema.columns c
        join information_schema.tables t
          on t.table_schema = c.table_schema
         and t.table_name = c.table_name
        where c.table_schema = 'public'
          and t.table_type = 'BASE TABLE'
        order by c.table_name, c.ordinal_position
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut tables: BTreeMap<String, TableInfo> = BTreeMap::new();
    for row in rows {
        let table_schema: String = row.get("table_schema");
        let table_name: String = row.get("table_name");
        let is_nullable: String = row.get("is_nullable");

        tables
            .entry(table_name.clone())
            .or_insert_with(|| TableInfo {
                name: table_name,
                schema: table_schema,
                columns: Vec::new(),
            })
            .columns
            .push(ColumnInfo {
                name: row.get("column_name"),
                data_type: row.get("data_type"),
                nullable: is_nullable == "YES",
                default: row.get("column_default"),
            });
    }

    Ok(tables.into_values().collect())
}
