//! Engine runs against a real sqlite database, covering the end-to-end
//! refresh path: scan, connect, read history, classify.

use lazyprisma_core::{categorize, mask_password, resolve_datasource};
use lazyprisma_db::{register_builtin_drivers, Client};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;

fn write_workspace(dir: &Path, db_file: &Path) {
    std::fs::create_dir_all(dir.join("prisma/migrations")).unwrap();
    std::fs::write(
        dir.join("prisma/schema.prisma"),
        format!(
            "datasource db {{\n  provider = \"sqlite\"\n  url = \"file:{}\"\n}}\n",
            db_file.display()
        ),
    )
    .unwrap();
}

fn write_migration(dir: &Path, name: &str, sql: &str) {
    let path = dir.join("prisma/migrations").join(name);
    std::fs::create_dir_all(&path).unwrap();
    std::fs::write(path.join("migration.sql"), sql).unwrap();
}

async fn create_database(path: &Path, with_table: bool) {
    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", path.display()))
        .unwrap()
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(options).await.unwrap();
    if with_table {
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
    } else {
        sqlx::query("SELECT 1").execute(&pool).await.unwrap();
    }
    pool.close().await;
}

async fn insert_row(
    path: &Path,
    name: &str,
    checksum: &str,
    finished: Option<&str>,
    logs: Option<&str>,
) {
    let pool = SqlitePool::connect(&format!("sqlite://{}", path.display()))
        .await
        .unwrap();
    sqlx::query(
        "INSERT INTO _prisma_migrations
         (id, migration_name, checksum, started_at, finished_at, rolled_back_at, logs)
         VALUES (?, ?, ?, '2024-01-01 00:00:00', ?, NULL, ?)",
    )
    .bind(name)
    .bind(name)
    .bind(checksum)
    .bind(finished)
    .bind(logs)
    .execute(&pool)
    .await
    .unwrap();
    pool.close().await;
}

async fn open_client(dir: &Path) -> Client {
    let ds = resolve_datasource(dir).unwrap();
    Client::from_schema_url(&ds.provider, &ds.url).await.unwrap()
}

#[tokio::test]
async fn missing_history_table_means_everything_pending() {
    register_builtin_drivers().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let db_file = dir.path().join("dev.db");
    write_workspace(dir.path(), &db_file);
    write_migration(dir.path(), "20240101000000_init", "CREATE TABLE t (id INT);");
    create_database(&db_file, false).await;

    let client = open_client(dir.path()).await;
    let outcome = categorize(dir.path(), Some(&client)).await.unwrap();
    client.close().await;

    assert!(outcome.db_connected);
    assert!(!outcome.table_exists);
    assert_eq!(outcome.category.local.len(), 1);
    assert_eq!(outcome.category.pending.len(), 1);
    assert!(outcome.category.db_only.is_empty());
}

#[tokio::test]
async fn applied_and_failed_rows_are_classified() {
    register_builtin_drivers().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let db_file = dir.path().join("dev.db");
    write_workspace(dir.path(), &db_file);

    let init_sql = "CREATE TABLE users (id INT);\n";
    write_migration(dir.path(), "20240101000000_init", init_sql);
    write_migration(dir.path(), "20240201000000_broken", "ALTER TABLE nope;");

    create_database(&db_file, true).await;

    // Record init as applied with the real checksum of the local file
    let init_checksum = {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(init_sql.as_bytes());
        hex::encode(hasher.finalize())
    };
    insert_row(
        &db_file,
        "20240101000000_init",
        &init_checksum,
        Some("2024-01-01 00:00:05"),
        None,
    )
    .await;
    insert_row(
        &db_file,
        "20240201000000_broken",
        "cccc",
        None,
        Some("syntax error at nope"),
    )
    .await;
    insert_row(
        &db_file,
        "20240301000000_ghost",
        "dddd",
        Some("2024-03-01 00:00:05"),
        None,
    )
    .await;

    let client = open_client(dir.path()).await;
    let outcome = categorize(dir.path(), Some(&client)).await.unwrap();
    client.close().await;

    assert!(outcome.db_connected);
    assert!(outcome.table_exists);

    let init = &outcome.category.local[0];
    assert!(init.applied_at.is_some());
    assert!(!init.checksum_mismatch);

    let broken = &outcome.category.local[1];
    assert!(broken.is_failed);
    assert_eq!(broken.logs.as_deref(), Some("syntax error at nope"));
    assert!(broken.started_at.is_some());

    assert!(outcome.category.pending.is_empty());
    assert_eq!(outcome.category.db_only.len(), 1);
    assert_eq!(outcome.category.db_only[0].name, "20240301000000_ghost");
}

#[tokio::test]
async fn checksum_mismatch_detected_against_real_rows() {
    register_builtin_drivers().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let db_file = dir.path().join("dev.db");
    write_workspace(dir.path(), &db_file);
    write_migration(dir.path(), "20240101000000_init", "CREATE TABLE edited (id INT);");
    create_database(&db_file, true).await;
    insert_row(
        &db_file,
        "20240101000000_init",
        "checksum-from-before-the-edit",
        Some("2024-01-01 00:00:05"),
        None,
    )
    .await;

    let client = open_client(dir.path()).await;
    let outcome = categorize(dir.path(), Some(&client)).await.unwrap();
    client.close().await;

    let init = &outcome.category.local[0];
    assert!(init.checksum_mismatch);
    assert!(init.applied_at.is_some());
    assert_ne!(init.checksum, init.db_checksum);
}

#[tokio::test]
async fn datasource_round_trip_resolves_and_masks() {
    let dir = tempfile::tempdir().unwrap();
    let db_file = dir.path().join("dev.db");
    write_workspace(dir.path(), &db_file);

    let ds = resolve_datasource(dir.path()).unwrap();
    assert_eq!(ds.provider, "sqlite");
    assert!(ds.is_hardcoded);
    // sqlite urls carry no credentials; masking must be a no-op
    assert_eq!(mask_password(&ds.url), ds.url);
}
