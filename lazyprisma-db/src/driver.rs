//! Driver strategy interface

use crate::config::Config;
use crate::error::DbError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// One row of a migration-history table, as stored by the Prisma engines.
///
/// `finished_at` and `rolled_back_at` are both null while a migration is
/// in-transaction; `logs` carries engine output for failed attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    pub name: String,
    pub checksum: String,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub rolled_back_at: Option<DateTime<Utc>>,
    pub logs: Option<String>,
}

/// Interface every database backend implements.
///
/// The application reads exactly one table shape (the migration history), so
/// the read surface is typed as [`HistoryRow`] rather than a generic row
/// abstraction. `execute` keeps a write surface for completeness; nothing in
/// the application currently uses it.
#[async_trait]
pub trait DbDriver: Send + Sync + std::fmt::Debug {
    /// The registered driver name (e.g. "postgres")
    fn name(&self) -> &'static str;

    /// Connect using a structured [`Config`]
    async fn connect(&mut self, cfg: &Config) -> Result<(), DbError>;

    /// Connect using a driver-native URL (already translated)
    async fn connect_url(&mut self, url: &str) -> Result<(), DbError>;

    /// Verify the connection is alive
    async fn ping(&self) -> Result<(), DbError>;

    /// Run a history query and decode the rows
    async fn query_history(&self, sql: &str) -> Result<Vec<HistoryRow>, DbError>;

    /// Execute a statement, returning the number of affected rows
    async fn execute(&self, sql: &str) -> Result<u64, DbError>;

    /// Close the underlying pool
    async fn close(&self);
}
