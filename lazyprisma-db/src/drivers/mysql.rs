//! MySQL / MariaDB driver

use crate::config::Config;
use crate::driver::{DbDriver, HistoryRow};
use crate::error::DbError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow, MySqlSslMode};
use sqlx::Row;

const DEFAULT_PORT: u16 = 3306;

/// Registry factory for the mysql driver
pub fn new_driver() -> Box<dyn DbDriver> {
    Box::new(MySqlDriver::default())
}

#[derive(Default, Debug)]
pub struct MySqlDriver {
    pool: Option<MySqlPool>,
}

impl MySqlDriver {
    fn pool(&self) -> Result<&MySqlPool, DbError> {
        self.pool.as_ref().ok_or(DbError::NotConnected)
    }
}

fn ssl_mode(mode: &str) -> MySqlSslMode {
    match mode {
        "disable" => MySqlSslMode::Disabled,
        "require" => MySqlSslMode::Required,
        "verify-ca" => MySqlSslMode::VerifyCa,
        "verify-full" => MySqlSslMode::VerifyIdentity,
        _ => MySqlSslMode::Preferred,
    }
}

// MySQL DATETIME columns carry no zone; history timestamps are written in UTC
fn utc(value: Option<NaiveDateTime>) -> Option<DateTime<Utc>> {
    value.map(|naive| naive.and_utc())
}

fn decode_row(row: &MySqlRow) -> Result<HistoryRow, DbError> {
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
impl DbDriver for MySqlDriver {
    fn name(&self) -> &'static str {
        "mysql"
    }

    async fn connect(&mut self, cfg: &Config) -> Result<(), DbError> {
        let mut options = MySqlConnectOptions::new()
            .host(&cfg.host)
            .port(cfg.port_or(DEFAULT_PORT))
            .username(&cfg.user)
            .database(&cfg.database)
            .ssl_mode(ssl_mode(&cfg.ssl_mode));
        if !cfg.password.is_empty() {
            options = options.password(&cfg.password);
        }

        let pool = MySqlPoolOptions::new()
            .max_connections(2)
            .connect_with(options)
            .await
            .map_err(|e| DbError::Open(e.to_string()))?;
        self.pool = Some(pool);
        self.ping().await
    }

    async fn connect_url(&mut self, url: &str) -> Result<(), DbError> {
        let pool = MySqlPoolOptions::new()
            .max_connections(2)
            .connect(url)
            .await
            .map_err(|e| DbError::Open(e.to_string()))?;
        self.pool = Some(pool);
        Ok(())
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
        assert_eq!(new_driver().name(), "mysql");
    }

    #[tokio::test]
    async fn unconnected_driver_reports_not_connected() {
        let driver = MySqlDriver::default();
        assert!(matches!(driver.ping().await, Err(DbError::NotConnected)));
    }
}
