// Common test utilities shared across test files

use sqlx::SqlitePool;

/// Set up an in-memory SQLite database with a `people` table
#[allow(dead_code)]
pub async fn setup_test_db() -> SqlitePool {
    let pool = named_template::db::connect(":memory:")
        .await
        .expect("Failed to create in-memory database");

    sqlx::query(
        "CREATE TABLE people (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT,
            nickname TEXT,
            created_by TEXT
        )",
    )
    .execute(&pool)
    .await
    .expect("Failed to create people table");

    pool
}

/// Write `contents` to a temporary YAML file
#[allow(dead_code)]
pub fn write_yaml(contents: &str) -> tempfile::NamedTempFile {
    use std::io::Write;

    let mut file = tempfile::Builder::new()
        .suffix(".yml")
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write temp file");
    file
}
