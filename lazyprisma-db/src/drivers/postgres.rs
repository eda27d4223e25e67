//! PostgreSQL driver (also used for CockroachDB)

use crate::config::Config;
use crate::driver::{DbDriver, HistoryRow};
use crate::error::DbError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgRow, PgSslMode};
use sqlx::Row;

const DEFAULT_PORT: u16 = 5432;

/// Registry factory for the postgres driver
pub fn new_driver() -> Box<dyn DbDriver> {
    Box::new(PostgresDriver::default())
}

#[derive(Default, Debug)]
pub struct PostgresDriver {
    pool: Option<PgPool>,
}

impl PostgresDriver {
    fn pool(&self) -> Result<&PgPool, DbError> {
        self.pool.as_ref().ok_or(DbError::NotConnected)
    }
}

fn ssl_mode(mode: &str) -> PgSslMode {
    match mode {
        "disable" => PgSslMode::Disable,
        "allow" => PgSslMode::Allow,
        "require" => PgSslMode::Require,
        "verify-ca" => PgSslMode::VerifyCa,
        "verify-full" => PgSslMode::VerifyFull,
        _ => PgSslMode::Prefer,
    }
}

fn decode_row(row: &PgRow) -> Result<HistoryRow, DbError> {
    Ok(HistoryRow {
        name: row
            .try_get("migration_name")
            .map_err(|e| DbError::Query(e.to_string()))?,
        checksum: row
            .try_get("checksum")
            .map_err(|e| DbError::Query(e.to_string()))?,
        started_at: row
            .try_get::<Option<DateTime<Utc>>, _>("started_at")
            .map_err(|e| DbError::Query(e.to_string()))?,
        finished_at: row
            .try_get::<Option<DateTime<Utc>>, _>("finished_at")
            .map_err(|e| DbError::Query(e.to_string()))?,
        rolled_back_at: row
            .try_get::<Option<DateTime<Utc>>, _>("rolled_back_at")
            .map_err(|e| DbError::Query(e.to_string()))?,
        logs: row
            .try_get::<Option<String>, _>("logs")
            .map_err(|e| DbError::Query(e.to_string()))?,
    })
}

#[async_trait]
impl DbDriver for PostgresDriver {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn connect(&mut self, cfg: &Config) -> Result<(), DbError> {
        let mut options = PgConnectOptions::new()
            .host(&cfg.host)
            .port(cfg.port_or(DEFAULT_PORT))
            .username(&cfg.user)
            .database(&cfg.database)
            .ssl_mode(ssl_mode(&cfg.ssl_mode));
        if !cfg.password.is_empty() {
            options = options.password(&cfg.password);
        }

        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect_with(options)
            .await
            .map_err(|e| DbError::Open(e.to_string()))?;
        self.pool = Some(pool);
        self.ping().await
    }

    async fn connect_url(&mut self, url: &str) -> Result<(), DbError> {
        let pool = PgPoolOptions::new()
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
        assert_eq!(new_driver().name(), "postgres");
    }

    #[tokio::test]
    async fn unconnected_driver_reports_not_connected() {
        let driver = PostgresDriver::default();
        assert!(matches!(driver.ping().await, Err(DbError::NotConnected)));
    }
}
