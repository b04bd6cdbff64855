//! Database initialization and migration runner.
//!
//! SYSTEM CONTEXT
//! ==============
//! The auth and style services both call [`init_pool`] at startup. They point
//! at the same database, so migrations cover every table either service uses;
//! `sqlx` serializes concurrent runs with an advisory lock.

use std::collections::BTreeMap;

use serde::Serialize;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::DbConfig;

/// Initialize the `PostgreSQL` connection pool and run migrations.
///
/// # Errors
///
/// Returns an error if the connection or migrations fail.
pub async fn init_pool(config: &DbConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(config.connect_options()?)
        .await?;

    sqlx::migrate!("src/db/migrations").run(&pool).await?;

    Ok(pool)
}

/// One column of a table in the connected schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct ColumnInfo {
    #[serde(skip)]
    pub table_name: String,
    pub column_name: String,
    pub data_type: String,
    pub nullable: bool,
    pub default_value: Option<String>,
}

/// Columns of every table in the current schema, keyed by table name, in
/// declaration order.
///
/// # Errors
///
/// Returns an error if the catalog query fails.
pub async fn describe_tables(pool: &PgPool) -> Result<BTreeMap<String, Vec<ColumnInfo>>, sqlx::Error> {
    let columns = sqlx::query_as::<_, ColumnInfo>(
        r"SELECT table_name::text AS table_name,
                 column_name::text AS column_name,
                 data_type::text AS data_type,
                 is_nullable = 'YES' AS nullable,
                 column_default::text AS default_value
          FROM information_schema.columns
          WHERE table_schema = current_schema()
          ORDER BY table_name, ordinal_position",
    )
    .fetch_all(pool)
    .await?;

    Ok(group_by_table(columns))
}

fn group_by_table(columns: Vec<ColumnInfo>) -> BTreeMap<String, Vec<ColumnInfo>> {
    let mut tables: BTreeMap<String, Vec<ColumnInfo>> = BTreeMap::new();
    for column in columns {
        tables.entry(column.table_name.clone()).or_default().push(column);
    }
    tables
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
