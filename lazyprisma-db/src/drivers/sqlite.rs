//! SQLite driver

use crate::config::Config;
use crate::driver::{DbDriver, HistoryRow};
use crate::error::DbError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;

/// Registry factory for the sqlite driver
pub fn new_driver() -> Box<dyn DbDriver> {
    Box::new(SqliteDriver::default())
}

#[derive(Default, Debug)]
pub struct SqliteDriver {
    pool: Option<SqlitePool>,
}

impl SqliteDriver {
    fn pool(&self) -> Result<&SqlitePool, DbError> {
        self.pool.as_ref().ok_or(DbError::NotConnected)
    }

    async fn open(&mut self, options: SqliteConnectOptions) -> Result<(), DbError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(2)
            .connect_with(options)
            .await
            .map_err(|e| DbError::Open(e.to_string()))?;
        self.pool = Some(pool);
        Ok(())
    }
}

// History timestamps are stored as zone-less text; they are written in UTC
fn utc(value: Option<NaiveDateTime>) -> Option<DateTime<Utc>> {
    value.map(|naive| naive.and_utc())
}

fn decode_row(row: &SqliteRow) -> Result<HistoryRow, DbError> {
    Ok(HistoryRow {
        name: row
            .try_get("migration_name")
            .map_err(|e| DbError::Query(e.to_string()))?,
        checksum: row
            .try_get("checksum")
            .map_err(|e| DbError::Query(e.to_string()))?,
        started_at: utc(row
            .try_get::<Option<NaiveDateTime>, _>("started_at")
            .map_err(|e| DbError::Query(e.to_string()))?),
        finished_at: utc(row
            .try_get::<Option<NaiveDateTime>, _>("finished_at")
            .map_err(|e| DbError::Query(e.to_string()))?),
        rolled_back_at: utc(row
            .try_get::<Option<NaiveDateTime>, _>("rolled_back_at")
            .map_err(|e| DbError::Query(e.to_string()))?),
        logs: row
            .try_get::<Option<String>, _>("logs")
            .map_err(|e| DbError::Query(e.to_string()))?,
    })
}

#[async_trait]
impl DbDriver for SqliteDriver {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn connect(&mut self, cfg: &Config) -> Result<(), DbError> {
        let options = SqliteConnectOptions::new().filename(&cfg.database);
        self.open(options).await?;
        self.ping().await
    }

    async fn connect_url(&mut self, url: &str) -> Result<(), DbError> {
        // Accepts either a bare path (the translated schema-URL form) or a
        // sqlite: URL
        let options = if url.starts_with("sqlite:") {
            SqliteConnectOptions::from_str(url).map_err(|e| DbError::UrlParse(e.to_string()))?
        } else {
            SqliteConnectOptions::new().filename(url)
        };
        self.open(options).await
    }

    async fn ping(&self) -> Result<(), DbError> {
        sqlx::query("SELECT 1")
            .execute(self.pool()?)
            .await
            .map(|_| ())
            .map_err(|e| DbError::Ping(e.to_string()))
    }

    async fn query_history(&self, sql: &str) -> Result<Vec<HistoryRow>, DbError> {
        let rows = sqlx::query(sql)
            .fetch_all(self.pool()?)
            .await
            .map_err(|e| DbError::Query(e.to_string()))?;
        rows.iter().map(decode_row).collect()
    }

    async fn execute(&self, sql: &str) -> Result<u64, DbError> {
        sqlx::query(sql)
            .execute(self.pool()?)
            .await
            .map(|done| done.rows_affected())
            .map_err(|e| DbError::Query(e.to_string()))
    }

    async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_name() {
        assert_eq!(new_driver().name(), "sqlite");
    }

    #[tokio::test]
    async fn unconnected_driver_reports_not_connected() {
        let driver = SqliteDriver::default();
        assert!(matches!(driver.ping().await, Err(DbError::NotConnected)));
    }

    #[tokio::test]
    async fn connecting_to_a_missing_file_is_an_open_error() {
        let mut driver = SqliteDriver::default();
        let err = driver
            .connect_url("/definitely/not/there.db")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Open(_)));
    }
}
