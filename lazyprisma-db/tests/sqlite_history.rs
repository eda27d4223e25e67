//! End-to-end check of the sqlite driver against a real history table

use lazyprisma_db::{register_builtin_drivers, Client};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use std::str::FromStr;

const HISTORY_QUERY: &str = "SELECT migration_name, checksum, started_at, finished_at, \
     rolled_back_at, logs FROM _prisma_migrations ORDER BY started_at ASC";

async fn seed_database(path: &std::path::Path) {
    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", path.display()))
        .unwrap()
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(options).await.unwrap();

    sqlx::query(
        "CREATE TABLE _prisma_migrations (
            id TEXT PRIMARY KEY,
            migration_name TEXT NOT NULL,
            checksum TEXT NOT NULL,
            started_at DATETIME NOT NULL,
            finished_at DATETIME,
            rolled_back_at DATETIME,
            logs TEXT
        )",
    )
    .execute(&pool)
    .await
    .unwrap();

    sqlx::query(
        "INSERT INTO _prisma_migrations VALUES
            ('1', '20240101000000_init', 'aaaa', '2024-01-01 00:00:00',
             '2024-01-01 00:00:05', NULL, NULL),
            ('2', '20240201000000_add_users', 'bbbb', '2024-02-01 00:00:00',
             NULL, NULL, 'constraint violation')",
    )
    .execute(&pool)
    .await
    .unwrap();

    pool.close().await;
}

#[tokio::test]
async fn reads_history_rows_through_the_driver() {
    register_builtin_drivers().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("dev.db");
    seed_database(&db_path).await;

    let url = format!("file:{}", db_path.display());
    let client = Client::from_schema_url("sqlite", &url).await.unwrap();
    let rows = client.query_history(HISTORY_QUERY).await.unwrap();
    client.close().await;

    assert_eq!(rows.len(), 2);

    let applied = &rows[0];
    assert_eq!(applied.name, "20240101000000_init");
    assert_eq!(applied.checksum, "aaaa");
    assert!(applied.started_at.is_some());
    assert!(applied.finished_at.is_some());
    assert!(applied.rolled_back_at.is_none());
    assert!(applied.logs.is_none());

    let failed = &rows[1];
    assert_eq!(failed.name, "20240201000000_add_users");
    assert!(failed.finished_at.is_none());
    assert!(failed.rolled_back_at.is_none());
    assert_eq!(failed.logs.as_deref(), Some("constraint violation"));
}

#[tokio::test]
async fn missing_table_surfaces_as_query_error() {
    register_builtin_drivers().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("empty.db");

    // Create an empty database file
    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.display()))
        .unwrap()
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(options).await.unwrap();
    sqlx::query("SELECT 1").execute(&pool).await.unwrap();
    pool.close().await;

    let url = format!("file:{}", db_path.display());
    let client = Client::from_schema_url("sqlite", &url).await.unwrap();
    let err = client.query_history(HISTORY_QUERY).await.unwrap_err();
    client.close().await;

    assert!(err.to_string().contains("no such table"));
}
