// Database module: runs compiled templates against SQLite

use anyhow::{Context, Result};
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqlitePool, SqlitePoolOptions, SqliteQueryResult, SqliteRow};
use sqlx::Sqlite;

use crate::domain::template::ArgSource;
use crate::domain::{Template, Value};

const MEMORY_DB: &str = ":memory:";

type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

// Open (creating if needed) the database file, or a private in-memory database
pub async fn connect(db_path: &str) -> Result<SqlitePool> {
    if db_path == MEMORY_DB {
        // every pooled connection would otherwise see its own empty database
        return SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database");
    }

    if !std::path::Path::new(db_path).exists() {
        std::fs::File::create(db_path)
            .with_context(|| format!("Failed to create database file {}", db_path))?;
    }

    SqlitePool::connect(&format!("sqlite:{}", db_path))
        .await
        .context("Failed to connect to database")
}

/// Bind the named arguments and execute the statement
pub async fn execute<I, S>(pool: &SqlitePool, template: &Template, sources: I) -> Result<SqliteQueryResult>
where
    I: IntoIterator<Item = S>,
    S: Into<ArgSource>,
{
    let query = prepare(template, template.bind(sources)?);
    query
        .execute(pool)
        .await
        .context("Failed to execute statement")
}

/// Bind the named arguments and fetch every row
pub async fn fetch_all<I, S>(pool: &SqlitePool, template: &Template, sources: I) -> Result<Vec<SqliteRow>>
where
    I: IntoIterator<Item = S>,
    S: Into<ArgSource>,
{
    let query = prepare(template, template.bind(sources)?);
    query
        .fetch_all(pool)
        .await
        .context("Failed to run query")
}

/// Bind the named arguments and fetch at most one row
pub async fn fetch_optional<I, S>(
    pool: &SqlitePool,
    template: &Template,
    sources: I,
) -> Result<Option<SqliteRow>>
where
    I: IntoIterator<Item = S>,
    S: Into<ArgSource>,
{
    let query = prepare(template, template.bind(sources)?);
    query
        .fetch_optional(pool)
        .await
        .context("Failed to run query")
}

fn prepare(template: &Template, values: Vec<Value>) -> SqliteQuery<'_> {
    tracing::debug!(
        statement = template.statement(),
        args = values.len(),
        "running template"
    );
    values
        .into_iter()
        .fold(sqlx::query(template.statement()), bind_value)
}

fn bind_value(query: SqliteQuery<'_>, value: Value) -> SqliteQuery<'_> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(v) => query.bind(v),
        Value::Int(v) => query.bind(v),
        Value::Float(v) => query.bind(v),
        Value::Text(v) => query.bind(v),
        Value::Bytes(v) => query.bind(v),
        Value::Uuid(v) => query.bind(v),
        Value::Timestamp(v) => query.bind(v),
        // SQLite keeps JSON as text
        Value::Json(v) => query.bind(v.to_string()),
    }
}
